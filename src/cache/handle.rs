//! Per-consumer image handle.
//!
//! A `CachedImage` is what an image-display element holds: the source it was
//! given, the URI it should currently show, and a loading flag observers can
//! watch while durable-tier work is in flight.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::cache::ImageCache;

/// Resolved state for a single displayed image.
#[derive(Debug)]
pub struct CachedImage {
    cache: Arc<ImageCache>,
    source: String,
    uri: String,
    loading: watch::Sender<bool>,
}

impl CachedImage {
    /// Creates a handle showing `source` until the first load completes.
    pub fn new(cache: Arc<ImageCache>, source: impl Into<String>) -> Self {
        let source = source.into();
        let (loading, _) = watch::channel(false);
        Self {
            cache,
            uri: source.clone(),
            source,
            loading,
        }
    }

    /// Creates a handle and resolves it once.
    pub async fn load_new(cache: Arc<ImageCache>, source: impl Into<String>) -> Self {
        let mut image = Self::new(cache, source);
        image.load().await;
        image
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// URI to display.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Returns a receiver that observes the loading flag.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Points the handle at a new source, resolving it if it changed.
    pub async fn set_source(&mut self, source: impl Into<String>) -> &str {
        let source = source.into();
        if source != self.source {
            self.source = source;
            self.load().await;
        }
        &self.uri
    }

    // == Load ==
    /// Resolves the current source through the cache.
    ///
    /// An empty source leaves the held URI unchanged. A memory hit never
    /// raises the loading flag.
    pub async fn load(&mut self) -> &str {
        if self.source.is_empty() {
            return &self.uri;
        }

        if let Some(uri) = self.cache.lookup_memory(&self.source).await {
            trace!("Memory hit for {}", self.source);
            self.uri = uri;
            return &self.uri;
        }

        self.loading.send_replace(true);
        let resolution = self.cache.resolve_durable(&self.source).await;
        self.uri = resolution.uri;
        self.loading.send_replace(false);

        &self.uri
    }
}
