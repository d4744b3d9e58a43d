//! Response DTOs for the resolver service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, ClearReport, Outcome, Resolution, SweepReport};

/// Response body for GET /resolve
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    /// URI to display
    pub uri: String,
    /// Which tier answered
    pub outcome: Outcome,
    /// Always false once a response is sent
    pub is_loading: bool,
}

impl From<Resolution> for ResolveResponse {
    fn from(resolution: Resolution) -> Self {
        Self {
            uri: resolution.uri,
            outcome: resolution.outcome,
            is_loading: false,
        }
    }
}

/// Response body for POST /sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub scanned: usize,
    pub removed: usize,
    pub malformed: usize,
    pub aborted: bool,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            scanned: report.scanned,
            removed: report.removed,
            malformed: report.malformed,
            aborted: report.aborted,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
    pub cleared: bool,
}

impl From<ClearReport> for ClearResponse {
    fn from(report: ClearReport) -> Self {
        Self {
            removed: report.removed,
            cleared: report.cleared,
        }
    }
}

/// Response body for DELETE /cache/entry
#[derive(Debug, Clone, Serialize)]
pub struct EvictResponse {
    /// Success message
    pub message: String,
    /// The evicted source URL
    pub url: String,
    /// True if a durable record was present
    pub removed: bool,
}

impl EvictResponse {
    pub fn new(url: impl Into<String>, removed: bool) -> Self {
        let url = url.into();
        let message = if removed {
            format!("'{}' evicted from image cache", url)
        } else {
            format!("'{}' was not cached", url)
        };
        Self {
            message,
            url,
            removed,
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate ((memory + durable hits) / lookups)
    pub hit_rate: f64,
    /// Configured record lifetime in milliseconds
    pub ttl_ms: u64,
}

impl StatsResponse {
    pub fn new(stats: CacheStats, ttl_ms: u64) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            ttl_ms,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
