pub mod errors;
pub mod models;
pub mod ports;
pub mod recovery;
pub mod service;
