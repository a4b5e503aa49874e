//! Shared types for the Crab admin console
//!
//! Wire models and error bodies used by both the console client and the
//! admin backend, plus token utilities.

pub mod error;
pub mod models;
pub mod util;

pub use error::{AppError, AppResult, ErrorBody, ErrorCode};
