//! Configuration module for dashboard client settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `ApiSettings`, `CacheSettings`, `SessionSettings`)
//! - YAML loading functionality (`load_config`)
//! - Logging initialization (`init_logging`)
//! - Shared state wrapper (`SharedConfig`)

mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{ApiSettings, AppConfig, CacheSettings, SessionSettings, SharedConfig};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};

// Re-export logging init
pub use logging::init_logging;
