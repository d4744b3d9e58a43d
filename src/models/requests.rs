//! Request DTOs for the resolver service API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

/// Query string carrying a source URL (`?url=...`)
///
/// Used by `GET /resolve` and `DELETE /cache/entry`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlQuery {
    /// The image source URL
    #[serde(default)]
    pub url: Option<String>,
}

impl UrlQuery {
    /// Returns the source URL, or an error message if it is missing or empty.
    pub fn source_url(&self) -> Result<&str, String> {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err("url cannot be empty".to_string()),
        }
    }
}
