//! Background Tasks Module
//!
//! Maintenance scheduling owned by the service, not by the cache.
//!
//! # Tasks
//! - Expired-entry sweep: removes stale durable records at a configured interval

mod sweep;

pub use sweep::spawn_sweep_task;
