//! Shared types for the sidescroll runtime crates.
//!
//! Configuration arrives as plain values from whatever host loads it; nothing
//! in this crate touches the file system.

mod config;

pub use config::{ConfigError, DiagnosticsConfig, RuntimeConfig};

pub fn crate_info() -> &'static str {
    "sidescroll-common v0.1.0"
}
