//! Client configuration

use std::path::PathBuf;

/// Default debounce window for the table search box
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Client configuration for connecting to the admin API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Admin API base URL, including the `/admin` prefix
    /// (e.g., "http://localhost:8080/admin")
    pub base_url: String,

    /// Public origin of the ordering app; scan links are built from it
    pub app_origin: String,

    /// Bearer token for the admin API
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Where exported PNG/PDF files are written
    pub export_dir: PathBuf,

    /// Search input debounce window in milliseconds
    pub search_debounce_ms: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>, app_origin: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            app_origin: app_origin.into(),
            token: None,
            timeout: 30,
            export_dir: PathBuf::from("."),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
        }
    }

    /// Read configuration from `CRAB_*` environment variables, falling back
    /// to local development defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("CRAB_ADMIN_URL").unwrap_or(defaults.base_url),
            app_origin: std::env::var("CRAB_APP_ORIGIN").unwrap_or(defaults.app_origin),
            token: std::env::var("CRAB_ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout: std::env::var("CRAB_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
            export_dir: std::env::var("CRAB_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            search_debounce_ms: std::env::var("CRAB_SEARCH_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.search_debounce_ms),
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the export directory
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Set the search debounce window
    pub fn with_search_debounce_ms(mut self, ms: u64) -> Self {
        self.search_debounce_ms = ms;
        self
    }

    /// Create an HTTP admin API client from this configuration
    pub fn build_api(&self) -> crate::ClientResult<crate::HttpAdminApi> {
        crate::HttpAdminApi::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/admin", "http://localhost:5173")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://api/admin", "https://shop.example")
            .with_token("t")
            .with_timeout(5)
            .with_export_dir("/tmp/qr")
            .with_search_debounce_ms(150);
        assert_eq!(config.token.as_deref(), Some("t"));
        assert_eq!(config.timeout, 5);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/qr"));
        assert_eq!(config.search_debounce_ms, 150);
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.search_debounce_ms, 300);
        assert!(config.token.is_none());
        assert!(config.base_url.ends_with("/admin"));
    }
}
