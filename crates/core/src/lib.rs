//! Climate API Core Library
//!
//! Shared utilities for the climate API service:
//! - Configuration file discovery and loading (XDG-compliant)
//! - File system checks
//! - Common defaults

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::is_file;

/// Application name used for XDG paths
pub const APP_NAME: &str = "climate-api";

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Default location of the observation database
pub const DEFAULT_DATABASE: &str = "./Resources/hawaii.sqlite";

/// Default upper bound on pooled database connections
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Region named in temperature summaries
pub const DEFAULT_REGION: &str = "Hawaii";
