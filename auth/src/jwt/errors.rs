use thiserror::Error;

/// Error type for JWT operations.
///
/// Callers retry with a refresh token on [`JwtError::TokenExpired`] and tear
/// the session down on [`JwtError::InvalidToken`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),
}
