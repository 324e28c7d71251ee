//! Tracing setup shared by every binary embedding the session layer

pub mod config;
pub mod init;

pub use config::InstrumentationConfig;
pub use init::init_tracing;
