//! Time-bounded cache for resolved market metadata.
//!
//! Maps a market identifier to its YES/NO token ids. Entries stay fresh
//! for the configured TTL (24h by default, metadata is immutable-per-day)
//! and are persisted to a single JSON file so restarts do not refetch the
//! whole universe. A corrupt or unreadable file is treated as an empty
//! cache, never as a fatal error.
//!
//! Concurrent `resolve` calls for the same market may race on the fetch;
//! that is tolerated and the last writer wins.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use omx_common::Outcome;

use crate::error::ClientError;

/// Token ids for the two outcomes of a binary market, as returned by the
/// metadata collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub yes_token_id: String,
    pub no_token_id: String,
}

/// External metadata lookup. Idempotent; may fail transiently.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, market_id: u64) -> Result<TokenPair, ClientError>;
}

/// A resolved cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInfo {
    pub market_id: u64,
    pub yes_token_id: String,
    pub no_token_id: String,
    /// When this entry was resolved; freshness is judged against this.
    pub resolved_at: DateTime<Utc>,
}

impl MarketInfo {
    /// Token id for the requested outcome.
    pub fn token_for(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Yes => &self.yes_token_id,
            Outcome::No => &self.no_token_id,
        }
    }

    /// Whether the entry is still inside its TTL at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            // TTL too large to represent, entry never expires
            return true;
        };
        match self.resolved_at.checked_add_signed(ttl) {
            Some(deadline) => deadline >= now,
            None => true,
        }
    }
}

/// TTL cache over market metadata with file persistence.
pub struct MetadataCache {
    path: PathBuf,
    ttl: Duration,
    fetcher: Arc<dyn MetadataFetcher>,
    entries: RwLock<HashMap<u64, MarketInfo>>,
}

impl MetadataCache {
    /// Opens the cache, loading any persisted entries from `path`.
    pub async fn open(path: PathBuf, ttl: Duration, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<u64, MarketInfo>>(&bytes) {
                Ok(entries) => {
                    debug!(path = %path.display(), count = entries.len(), "loaded metadata cache");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt metadata cache, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            ttl,
            fetcher,
            entries: RwLock::new(entries),
        }
    }

    /// Returns the resolved metadata for a market, fetching through the
    /// collaborator when the entry is absent, stale, or a refresh is
    /// forced. A failed fetch leaves the cache unmodified.
    pub async fn resolve(
        &self,
        market_id: u64,
        force_refresh: bool,
    ) -> Result<MarketInfo, ClientError> {
        if !force_refresh {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&market_id) {
                if entry.is_fresh(Utc::now(), self.ttl) {
                    debug!(market_id, "metadata cache hit");
                    return Ok(entry.clone());
                }
                debug!(market_id, resolved_at = %entry.resolved_at, "metadata cache entry stale");
            }
        }

        info!(market_id, force_refresh, "resolving market metadata");
        let pair = self
            .fetcher
            .fetch(market_id)
            .await
            .map_err(|e| match e {
                err @ ClientError::MetadataUnavailable(_) => err,
                other => ClientError::MetadataUnavailable(other.to_string()),
            })?;

        let entry = MarketInfo {
            market_id,
            yes_token_id: pair.yes_token_id,
            no_token_id: pair.no_token_id,
            resolved_at: Utc::now(),
        };

        let mut entries = self.entries.write().await;
        entries.insert(market_id, entry.clone());
        self.persist(&entries).await;

        Ok(entry)
    }

    /// Removes a single entry.
    pub async fn invalidate(&self, market_id: u64) {
        let mut entries = self.entries.write().await;
        if entries.remove(&market_id).is_some() {
            debug!(market_id, "invalidated metadata entry");
            self.persist(&entries).await;
        }
    }

    /// Clears all entries.
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.persist(&entries).await;
    }

    /// Cached market identifiers. Never triggers a fetch.
    pub async fn keys(&self) -> Vec<u64> {
        self.entries.read().await.keys().copied().collect()
    }

    async fn persist(&self, entries: &HashMap<u64, MarketInfo>) {
        match serde_json::to_vec_pretty(entries) {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(&self.path, bytes).await {
                    warn!(path = %self.path.display(), error = %e, "failed to persist metadata cache");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode metadata cache"),
        }
    }
}
