pub mod clock;
pub mod otp;
pub mod session;
pub mod user;
