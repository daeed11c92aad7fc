//! Configuration types for the dashboard client
//!
//! This module defines all configuration structs that are loaded from YAML
//! and shared across the application via `Arc<RwLock<AppConfig>>`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::AppError;

// ============================================================================
// Type Aliases
// ============================================================================

/// Type alias for shared configuration access across async tasks
pub type SharedConfig = Arc<RwLock<AppConfig>>;

// ============================================================================
// Configuration Structs
// ============================================================================

/// Backend API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Backend base URL (e.g., "https://dash.example.com")
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Query cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds before a cached query result counts as stale
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

/// Session persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// File holding the persisted bearer token; absent file = logged out
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend API settings
    pub api: ApiSettings,
    /// Query cache settings
    #[serde(default)]
    pub cache: CacheSettings,
    /// Session persistence settings
    #[serde(default)]
    pub session: SessionSettings,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".stockdash/token")
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            cache: CacheSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: base URL must be set and carry an HTTP scheme
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(AppError::Config(
                "api.base_url cannot be empty".to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "api.base_url must start with http:// or https:// (got '{}')",
                base_url
            )));
        }

        // Rule: request timeout in a sane range
        if self.api.timeout_secs == 0 || self.api.timeout_secs > 120 {
            return Err(AppError::Config(format!(
                "api.timeout_secs must be 1-120, got {}",
                self.api.timeout_secs
            )));
        }

        // Rule: cache TTL must be non-zero (zero would make every read a miss)
        if self.cache.ttl_secs == 0 {
            return Err(AppError::Config(
                "cache.ttl_secs must be > 0".to_string(),
            ));
        }

        // Rule: token path must name a file
        if self.session.token_path.as_os_str().is_empty() {
            return Err(AppError::Config(
                "session.token_path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Convert to shared state wrapper for async access
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

// ============================================================================
// Tests
// ============================================================================
