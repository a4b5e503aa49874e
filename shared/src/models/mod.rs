//! Data models
//!
//! Shared between the console client and the admin backend (via API).
//! All IDs are `i64`; timestamps are Unix milliseconds.

pub mod branch;
pub mod dining_table;

// Re-exports
pub use branch::*;
pub use dining_table::*;
