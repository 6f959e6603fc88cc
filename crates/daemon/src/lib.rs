//! Warden daemon: runnable ACL service over the SQLx backends.

pub mod config;
pub mod server;

pub use config::Settings;
