pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::AccessClaims;
pub use claims::PasswordResetClaims;
pub use claims::TokenType;
pub use claims::TypedClaims;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use handler::MIN_SECRET_BYTES;
