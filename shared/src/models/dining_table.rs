//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity
///
/// `qr_code_token` is opaque and unique across every table of every branch.
/// It is replaced wholesale on regenerate; the previous value is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    pub branch_id: i64,
    pub table_number: String,
    pub qr_code_token: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub branch_id: i64,
    pub table_number: String,
}

/// Update dining table payload
///
/// Carries no branch field: a table is never moved between branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub table_number: String,
}

/// Query string for `GET /tables`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TableListQuery {
    pub branch_id: i64,
}
