//! Image Cache Module
//!
//! Two-tier cache engine: an in-process memory index in front of a durable
//! key-value store, with time-based expiry of durable records.
//!
//! The durable tier is the source of truth. The memory index only
//! accelerates repeat lookups within a process and may be cleared at any
//! time without losing data.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::entry::{cache_key, is_cache_key, source_url as url_from_key};
use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, DEFAULT_TTL_MS};
use crate::error::{CacheError, Result};
use crate::storage::KeyValueStore;

// == Resolution ==
/// How a resolution was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Empty source, nothing was looked up
    Skipped,
    /// Found in the memory index
    MemoryHit,
    /// Found a fresh record in the durable tier
    DurableHit,
    /// No usable record; a new one was written
    Populated,
    /// Durable tier failed; the source URL is returned as-is
    Fallback,
}

/// Result of resolving one source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// URI to display
    pub uri: String,
    pub outcome: Outcome,
}

impl Resolution {
    fn new(uri: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            uri: uri.into(),
            outcome,
        }
    }
}

// == Maintenance Reports ==
/// Summary of an expired-entry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Namespaced keys inspected before the sweep finished or aborted
    pub scanned: usize,
    /// Stale records removed
    pub removed: usize,
    /// Unparseable records removed
    pub malformed: usize,
    /// True if a storage failure stopped the sweep early
    pub aborted: bool,
}

/// Summary of a full cache clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    /// Durable records removed
    pub removed: usize,
    /// True once both tiers were emptied
    pub cleared: bool,
}

// == Image Cache ==
/// Two-tier image URI cache.
///
/// Share it between consumers with `Arc<ImageCache>`.
pub struct ImageCache {
    /// Source URL -> resolved URI
    memory: RwLock<HashMap<String, String>>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
    stats: RwLock<CacheStats>,
}

impl fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCache")
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    // == Constructor ==
    /// Creates a cache over `storage` with the default 7 day TTL.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            storage,
            clock: Arc::new(SystemClock),
            ttl_ms: DEFAULT_TTL_MS,
            stats: RwLock::new(CacheStats::new()),
        }
    }

    /// Replaces the record lifetime.
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    // == Resolve ==
    /// Resolves `source_url` to the URI to display.
    ///
    /// Never fails: any durable-tier problem falls back to the source URL.
    pub async fn resolve(&self, source_url: &str) -> Resolution {
        if source_url.is_empty() {
            return Resolution::new(String::new(), Outcome::Skipped);
        }

        if let Some(uri) = self.lookup_memory(source_url).await {
            return Resolution::new(uri, Outcome::MemoryHit);
        }

        self.resolve_durable(source_url).await
    }

    // == Memory Lookup ==
    /// Checks the memory index only. Never touches the durable tier.
    pub async fn lookup_memory(&self, source_url: &str) -> Option<String> {
        let uri = self.memory.read().await.get(source_url).cloned()?;
        self.stats.write().await.record_memory_hit();
        Some(uri)
    }

    // == Durable Resolve ==
    /// Resolves through the durable tier, bypassing the memory index check.
    ///
    /// A fresh record is promoted into the memory index. A stale or
    /// unparseable record is removed and replaced by a new one pointing at
    /// the source URL.
    pub async fn resolve_durable(&self, source_url: &str) -> Resolution {
        match self.try_resolve_durable(source_url).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!("Image cache error for {}: {}", source_url, e);
                self.stats.write().await.record_storage_failure();
                Resolution::new(source_url, Outcome::Fallback)
            }
        }
    }

    async fn try_resolve_durable(&self, source_url: &str) -> Result<Resolution> {
        let key = cache_key(source_url);

        if let Some(raw) = self.storage.get(&key).await? {
            match decode_record(&key, &raw) {
                Ok(entry) if !entry.is_expired(self.clock.now_ms(), self.ttl_ms) => {
                    self.remember(source_url, &entry.uri).await;
                    self.stats.write().await.record_durable_hit();
                    return Ok(Resolution::new(entry.uri, Outcome::DurableHit));
                }
                Ok(entry) => {
                    debug!(
                        "Cache record for {} expired ({} ms old)",
                        source_url,
                        entry.age_ms(self.clock.now_ms())
                    );
                    self.stats.write().await.record_expired();
                    self.storage.remove(&key).await?;
                }
                Err(e) => {
                    warn!("{}, removing it", e);
                    self.stats.write().await.record_malformed();
                    self.storage.remove(&key).await?;
                }
            }
        }

        self.populate(source_url, key).await
    }

    // == Populate ==
    async fn populate(&self, source_url: &str, key: String) -> Result<Resolution> {
        let entry = CacheEntry::new(source_url, self.clock.now_ms());
        let encoded = entry
            .encode()
            .map_err(|e| CacheError::Internal(format!("Failed to encode cache record: {e}")))?;

        self.storage.set(&key, &encoded).await?;
        self.remember(source_url, &entry.uri).await;
        self.stats.write().await.record_miss();

        Ok(Resolution::new(entry.uri, Outcome::Populated))
    }

    async fn remember(&self, source_url: &str, uri: &str) {
        let len = {
            let mut memory = self.memory.write().await;
            memory.insert(source_url.to_string(), uri.to_string());
            memory.len()
        };
        self.stats.write().await.set_memory_entries(len);
    }

    // == Evict ==
    /// Removes one source URL from both tiers.
    ///
    /// Returns true if a durable record was present.
    pub async fn evict(&self, source_url: &str) -> Result<bool> {
        let present = match self.remove_record(&cache_key(source_url)).await {
            Ok(present) => present,
            Err(e) => {
                self.stats.write().await.record_storage_failure();
                return Err(e);
            }
        };

        let len = {
            let mut memory = self.memory.write().await;
            memory.remove(source_url);
            memory.len()
        };

        let mut stats = self.stats.write().await;
        if present {
            stats.record_removed(1);
        }
        stats.set_memory_entries(len);
        debug!("Evicted {} from image cache (present: {})", source_url, present);
        Ok(present)
    }

    async fn remove_record(&self, key: &str) -> Result<bool> {
        let present = self.storage.get(key).await?.is_some();
        if present {
            self.storage.remove(key).await?;
        }
        Ok(present)
    }

    // == Sweep Expired ==
    /// Removes every stale durable record in the cache namespace.
    ///
    /// The memory index is left alone. A storage failure stops the sweep;
    /// records already removed stay removed. Unparseable records are removed
    /// and counted as malformed without stopping the sweep.
    pub async fn sweep_expired(&self) -> SweepReport {
        let mut report = SweepReport::default();

        if let Err(e) = self.try_sweep(&mut report).await {
            error!(
                "Error clearing expired cache after {} removals: {}",
                report.removed, e
            );
            report.aborted = true;
            self.stats.write().await.record_storage_failure();
        }

        self.stats
            .write()
            .await
            .record_removed(report.removed + report.malformed);

        if report.removed > 0 || report.malformed > 0 {
            info!(
                "Image cache sweep: removed {} expired and {} malformed of {} records",
                report.removed, report.malformed, report.scanned
            );
        } else {
            debug!("Image cache sweep: no expired records in {}", report.scanned);
        }

        report
    }

    async fn try_sweep(&self, report: &mut SweepReport) -> Result<()> {
        let keys = self.cache_keys().await?;
        let now = self.clock.now_ms();

        for key in keys {
            report.scanned += 1;

            let Some(raw) = self.storage.get(&key).await? else {
                continue;
            };

            match decode_record(&key, &raw) {
                Ok(entry) if entry.is_expired(now, self.ttl_ms) => {
                    self.storage.remove(&key).await?;
                    report.removed += 1;
                    debug!(
                        "Swept expired record for {}",
                        url_from_key(&key).unwrap_or(&key)
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        "Malformed cache record for {}: {}, removing it",
                        url_from_key(&key).unwrap_or(&key),
                        e
                    );
                    self.storage.remove(&key).await?;
                    report.malformed += 1;
                }
            }
        }

        Ok(())
    }

    // == Clear ==
    /// Removes every durable record in the cache namespace, then empties the
    /// memory index.
    ///
    /// On failure the memory index is kept as it was.
    pub async fn clear(&self) -> ClearReport {
        match self.try_clear().await {
            Ok(removed) => {
                self.memory.write().await.clear();
                let mut stats = self.stats.write().await;
                stats.record_removed(removed);
                stats.set_memory_entries(0);
                info!("Image cache cleared ({} records)", removed);
                ClearReport {
                    removed,
                    cleared: true,
                }
            }
            Err(e) => {
                error!("Error clearing all cache: {}", e);
                self.stats.write().await.record_storage_failure();
                ClearReport::default()
            }
        }
    }

    async fn try_clear(&self) -> Result<usize> {
        let keys = self.cache_keys().await?;
        if !keys.is_empty() {
            self.storage.remove_many(&keys).await?;
        }
        Ok(keys.len())
    }

    async fn cache_keys(&self) -> Result<Vec<String>> {
        let keys = self.storage.list_keys().await?;
        Ok(keys.into_iter().filter(|key| is_cache_key(key)).collect())
    }

    // == Introspection ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().await.clone();
        stats.set_memory_entries(self.memory_len().await);
        stats
    }

    /// Number of entries in the memory index.
    pub async fn memory_len(&self) -> usize {
        self.memory.read().await.len()
    }

    /// Returns true if `source_url` is held in the memory index.
    pub async fn in_memory(&self, source_url: &str) -> bool {
        self.memory.read().await.contains_key(source_url)
    }
}

fn decode_record(key: &str, raw: &str) -> Result<CacheEntry> {
    CacheEntry::decode(raw).map_err(|source| CacheError::Malformed {
        key: key.to_string(),
        source,
    })
}
