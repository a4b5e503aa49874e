//! Error codes and wire error bodies shared by the console and the backend
//!
//! Every failed `/admin` request answers with an [`ErrorBody`]:
//!
//! ```json
//! {"code": 7001, "message": "Table 7 not found", "details": {"table_id": 7}}
//! ```
//!
//! Code ranges: 0xxx general, 1xxx auth, 70xx tables, 71xx branches,
//! 72xx QR tokens, 9xxx system.
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::TableNumberRequired).with_detail("field", "table_number");
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, Some(7005));
//! assert_eq!(body.message, "Table number is required");
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, UnknownErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
