//! API Module
//!
//! HTTP handlers and routing for the image resolver service.
//!
//! # Endpoints
//! - `GET /resolve?url=` - Resolve a source URL through the cache
//! - `POST /sweep` - Remove expired records
//! - `DELETE /cache` - Clear the whole image cache
//! - `DELETE /cache/entry?url=` - Evict one source URL
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
