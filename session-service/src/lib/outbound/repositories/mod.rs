pub mod memory;
pub mod otp;
pub mod refresh_token;
pub mod user;

pub use memory::InMemoryOtpRepository;
pub use memory::InMemoryRefreshTokenRepository;
pub use memory::InMemoryUserRepository;
pub use otp::PostgresOtpRepository;
pub use refresh_token::PostgresRefreshTokenRepository;
pub use user::PostgresUserRepository;
