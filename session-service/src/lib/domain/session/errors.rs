use thiserror::Error;

use crate::user::errors::UserError;

/// Session lifecycle errors.
///
/// Variants stay specific for branching and logging; the HTTP layer collapses
/// every rejection into a generic unauthorized response.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Refresh token is missing")]
    MissingRefreshToken,

    /// Unknown, expired, revoked or already rotated.
    #[error("Refresh token is not active")]
    InactiveRefreshToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    /// A refresh token resolved to a user the credential store no longer has.
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<UserError> for SessionError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DatabaseError(msg) => SessionError::DatabaseError(msg),
            other => SessionError::Unknown(other.to_string()),
        }
    }
}

impl From<auth::JwtError> for SessionError {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::TokenExpired => SessionError::TokenExpired,
            auth::JwtError::InvalidToken(_) => SessionError::InvalidToken,
            auth::JwtError::EncodingFailed(msg) => SessionError::TokenIssuance(msg),
        }
    }
}
