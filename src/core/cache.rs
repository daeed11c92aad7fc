//! Process-wide query result cache
//!
//! Stores query results as JSON values so one cache serves every query
//! shape. Entries expire after a TTL; the whole namespace is wiped on
//! every identity transition because cached data may belong to the
//! previous (or absent) identity. The wipe is deliberately coarse -
//! entries carry no identity scope to invalidate selectively.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;

/// One cached query result
#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    inserted_at: Instant,
}

/// Keyed cache of query results with per-entry TTL
#[derive(Debug)]
pub struct QueryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Fetch a cached value; expired or missing entries are a miss
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        if entry.inserted_at.elapsed() > self.ttl {
            debug!(key = %key, "Cache entry expired");
            return None;
        }

        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                // Shape mismatch means the key is being reused across types
                warn!(key = %key, error = %e, "Cached value failed to decode, treating as miss");
                None
            }
        }
    }

    /// Insert or replace a cached value under the given key
    pub async fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Drop a single entry (write-through invalidation)
    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Drop every entry - called on login/register/logout because the
    /// whole namespace may be scoped to the previous identity
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        debug!(dropped = dropped, "Query cache cleared");
    }

    /// Number of live entries (expired entries still count until evicted)
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
