//! Image Cache - A two-tier image URI cache
//!
//! Resolves image source URLs through an in-process memory index backed by a
//! durable key-value store, with 7 day expiry and maintenance sweeps.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CachedImage, ImageCache};
pub use config::Config;
pub use tasks::spawn_sweep_task;
