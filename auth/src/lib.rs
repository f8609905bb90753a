//! Authentication utilities library
//!
//! Provides the token and credential primitives of the session service:
//! - Password hashing (Argon2id)
//! - Typed JWT access and password-reset tokens (HS256)
//! - Opaque bearer secrets and six-digit codes, stored only as SHA-256 digests
//! - Lenient duration strings for token lifetimes
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{AccessClaims, Authenticator, JwtError};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! let claims = AccessClaims::for_user("user123", "member", "Alice", None, chrono::Utc::now(), 900);
//! let token = auth.generate_token(&claims).unwrap();
//!
//! let decoded: AccessClaims = auth.validate_token(&token).unwrap();
//! assert_eq!(decoded.sub, "user123");
//!
//! let garbage = auth.validate_token::<AccessClaims>("not.a.token");
//! assert!(matches!(garbage, Err(JwtError::InvalidToken(_))));
//! ```
//!
//! ## Token Lifetimes
//! ```
//! use auth::duration::{parse_duration_secs, DEFAULT_ACCESS_TTL_SECS};
//!
//! assert_eq!(parse_duration_secs(Some("2h"), DEFAULT_ACCESS_TTL_SECS), 7200);
//! assert_eq!(parse_duration_secs(Some("soon"), DEFAULT_ACCESS_TTL_SECS), 900);
//! ```

pub mod authenticator;
pub mod duration;
pub mod jwt;
pub mod password;
pub mod secret;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::PasswordResetClaims;
pub use jwt::TokenType;
pub use password::PasswordError;
pub use password::PasswordHasher;
