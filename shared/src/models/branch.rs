//! Branch Model

use serde::{Deserialize, Serialize};

/// Branch entity. Read-only from the console's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}
