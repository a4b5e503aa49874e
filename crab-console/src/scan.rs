//! Customer scan links

/// Builds the URL a customer's phone opens after scanning a table's QR code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanUrl {
    origin: String,
}

impl ScanUrl {
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `{origin}/menu/scan/{token}`
    pub fn for_token(&self, token: &str) -> String {
        format!("{}/menu/scan/{}", self.origin, token)
    }
}
