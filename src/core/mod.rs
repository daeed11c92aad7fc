//! Core module - session lifecycle, query cache, token persistence, queries
//!
//! This module uses **explicit re-exports** instead of glob exports
//! (`pub use module::*`) to provide better API visibility and prevent
//! accidental public API changes.
//!
//! ## Usage
//! Prefer importing from `crate::core`:
//! ```ignore
//! use crate::core::{SessionManager, QueryCache, FileTokenStore};
//! ```

pub mod cache;
pub mod queries;
pub mod session;
pub mod token_store;

// Explicit re-exports for session module
pub use session::{Session, SessionHandle, SessionManager};

// Explicit re-exports for cache module
pub use cache::QueryCache;

// Explicit re-exports for token_store module
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

// Explicit re-exports for queries module
pub use queries::{MarketDataService, WebhookService};
