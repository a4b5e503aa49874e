//! Numeric error codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code carried in [`ErrorBody::code`](super::ErrorBody)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // 0xxx
    ValidationFailed = 2,

    // 1xxx
    /// No bearer token presented
    NotAuthenticated = 1001,
    /// Bearer token presented but not accepted
    TokenInvalid = 1004,

    // 70xx tables
    TableNotFound = 7001,
    TableNumberRequired = 7005,

    // 71xx branches
    BranchNotFound = 7101,

    // 72xx QR tokens
    /// Token never issued, regenerated away, or its table deleted
    QrTokenNotFound = 7201,
    QrTokenConflict = 7202,

    // 9xxx
    InternalError = 9001,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 9] = [
        ErrorCode::ValidationFailed,
        ErrorCode::NotAuthenticated,
        ErrorCode::TokenInvalid,
        ErrorCode::TableNotFound,
        ErrorCode::TableNumberRequired,
        ErrorCode::BranchNotFound,
        ErrorCode::QrTokenNotFound,
        ErrorCode::QrTokenConflict,
        ErrorCode::InternalError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default English message, used when no more specific text is given
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNumberRequired => "Table number is required",
            ErrorCode::BranchNotFound => "Branch not found",
            ErrorCode::QrTokenNotFound => "QR code is no longer valid",
            ErrorCode::QrTokenConflict => "QR token already in use",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownErrorCode(pub u16);

impl fmt::Display for UnknownErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code: {}", self.0)
    }
}

impl std::error::Error for UnknownErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(UnknownErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
