//! Cache Entry Module
//!
//! Defines the durable record stored per source URL and the namespaced key
//! it lives under.

use serde::{Deserialize, Serialize};

use crate::cache::CACHE_PREFIX;

// == Cache Entry ==
/// Durable record for one resolved source URL.
///
/// Encoded as `{"uri": "...", "timestamp": <epoch ms>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Resolved image location
    pub uri: String,
    /// Write time (Unix milliseconds)
    pub timestamp: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a record for `uri` written at `timestamp`.
    pub fn new(uri: impl Into<String>, timestamp: u64) -> Self {
        Self {
            uri: uri.into(),
            timestamp,
        }
    }

    // == Encode / Decode ==
    /// Serializes the record to its stored text form.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a stored text value back into a record.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    // == Age ==
    /// Milliseconds elapsed since the record was written.
    ///
    /// A timestamp ahead of `now` counts as age zero.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Is Expired ==
    /// Checks whether the record is stale at `now`.
    ///
    /// Boundary condition: a record is expired once its age is greater than
    /// or equal to the TTL, so it is still fresh at `timestamp + ttl - 1`.
    pub fn is_expired(&self, now: u64, ttl_ms: u64) -> bool {
        self.age_ms(now) >= ttl_ms
    }
}

// == Key Helpers ==
/// Returns the durable-tier key for a source URL.
pub fn cache_key(source_url: &str) -> String {
    format!("{CACHE_PREFIX}{source_url}")
}

/// Returns true if `key` belongs to the image cache namespace.
pub fn is_cache_key(key: &str) -> bool {
    key.starts_with(CACHE_PREFIX)
}

/// Recovers the source URL from a namespaced key.
pub fn source_url(key: &str) -> Option<&str> {
    key.strip_prefix(CACHE_PREFIX)
}
