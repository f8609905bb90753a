use thiserror::Error;

use crate::domain::session::errors::SessionError;
use crate::user::errors::UserError;

/// Password recovery errors.
#[derive(Debug, Clone, Error)]
pub enum OtpError {
    // Validation errors
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Code must be exactly six digits")]
    InvalidCodeFormat,

    #[error("Password error: {0}")]
    WeakPassword(#[from] auth::PasswordError),

    // Domain-level errors
    #[error("Too many code requests, try again later")]
    RateLimited,

    /// Wrong, expired, exhausted or unknown. The reason is logged, never returned.
    #[error("Invalid or expired code")]
    CodeRejected,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<UserError> for OtpError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidEmail(e) => OtpError::InvalidEmail(e.to_string()),
            UserError::Password(e) => OtpError::WeakPassword(e),
            UserError::DatabaseError(msg) => OtpError::DatabaseError(msg),
            other => OtpError::Unknown(other.to_string()),
        }
    }
}

impl From<SessionError> for OtpError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::DatabaseError(msg) => OtpError::DatabaseError(msg),
            other => OtpError::Unknown(other.to_string()),
        }
    }
}
