pub mod log;

pub use log::LogOtpDelivery;
