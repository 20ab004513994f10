//! Process-wide quote cache keyed by symbol
//!
//! Entries hold the raw provider payload plus the fetch timestamp; staleness
//! is decided at read time against [`FRESHNESS_WINDOW`]. There is no capacity
//! bound and no eviction beyond overwrite-on-refresh, so memory grows with
//! the number of distinct symbols requested over the process lifetime.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maximum age, in seconds, at which a cached payload is served without a
/// provider call.
pub const FRESHNESS_WINDOW_SECS: i64 = 600;

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub payload: Value,
    pub fetched_at: DateTime<Utc>,
}

/// Shared map of symbol -> (payload, fetch timestamp).
///
/// Cloning is cheap and shares the underlying map. The read in the handler's
/// cache probe and the write after a successful fetch are not atomic with
/// respect to other requests for the same symbol; duplicate provider calls
/// under concurrent load are accepted behavior.
#[derive(Clone, Default)]
pub struct QuoteCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached payload and its age, or `None` when the symbol has
    /// never been cached. Freshness is the caller's decision.
    pub async fn get(&self, symbol: &str) -> Option<(Value, Duration)> {
        let entries = self.entries.read().await;
        entries
            .get(symbol)
            .map(|entry| (entry.payload.clone(), Utc::now() - entry.fetched_at))
    }

    /// Returns the cached payload only when its age is inside the freshness
    /// window.
    pub async fn get_fresh(&self, symbol: &str) -> Option<Value> {
        match self.get(symbol).await {
            Some((payload, age)) if age.num_seconds() < FRESHNESS_WINDOW_SECS => Some(payload),
            _ => None,
        }
    }

    /// Stores or overwrites the entry for `symbol`.
    pub async fn put(&self, symbol: &str, payload: Value, fetched_at: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        entries.insert(symbol.to_string(), CacheEntry { payload, fetched_at });
    }
}
