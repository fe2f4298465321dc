//! Collaborator seams: catalog resolution and content fetching
//!
//! The orchestration core treats both as black boxes behind trait objects.
//! A [`CatalogResolver`] turns an owner identifier into an ordered list of
//! [`Item`]s; a [`ContentFetcher`] turns one canonical locator into raw bytes.
//! Protocol details — scraping, format selection, retry/backoff — live inside
//! the implementations, never in the core.
//!
//! [`HttpContentFetcher`] is the bundled plain-HTTP implementation for
//! locators that are directly fetchable URLs.

use crate::error::{CatalogError, Error, FetchError, Result};
use crate::types::Item;
use async_trait::async_trait;
use std::time::Duration;

/// Raw payload returned by a content fetcher
#[derive(Clone, Debug)]
pub struct FetchedPayload {
    /// Payload bytes
    pub bytes: Vec<u8>,

    /// Container/extension hint (e.g. `mp4`), if the fetcher can infer one
    pub extension: Option<String>,
}

/// Resolves an owner identifier into an ordered catalog of items
#[async_trait]
pub trait CatalogResolver: Send + Sync {
    /// Resolve the owner's catalog with full per-item detail.
    ///
    /// `limit` caps the number of items resolved; implementations may perform
    /// one sub-request per item and should honor the cap to keep large
    /// catalogs affordable.
    async fn resolve(
        &self,
        owner: &str,
        limit: Option<usize>,
    ) -> std::result::Result<Vec<Item>, CatalogError>;

    /// Cheap flat listing: titles/thumbnails without full per-item resolution.
    ///
    /// The default implementation falls back to [`resolve`](Self::resolve);
    /// resolvers backed by expensive per-item lookups should override it.
    async fn resolve_flat(
        &self,
        owner: &str,
        limit: Option<usize>,
    ) -> std::result::Result<Vec<Item>, CatalogError> {
        self.resolve(owner, limit).await
    }
}

/// Fetches one canonical locator to raw bytes
///
/// Implementations own quality/format selection and any protocol-level
/// retry/backoff and timeout policy — the core imposes no timeout of its own.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the payload behind a canonical source locator
    async fn fetch(&self, locator: &str) -> std::result::Result<FetchedPayload, FetchError>;
}

/// Plain-HTTP content fetcher backed by `reqwest`
///
/// Suitable when canonical locators are directly downloadable URLs. Classifies
/// connect/timeout failures as [`FetchError::Unreachable`] and non-success
/// statuses as [`FetchError::Status`]; infers the extension hint from the
/// `Content-Type` header, falling back to the URL path.
pub struct HttpContentFetcher {
    client: reqwest::Client,
}

impl HttpContentFetcher {
    /// Create a fetcher with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, locator: &str) -> std::result::Result<FetchedPayload, FetchError> {
        tracing::debug!(locator, "fetching content over HTTP");

        let response = self.client.get(locator).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Unreachable(format!("timeout fetching '{locator}'"))
            } else if e.is_connect() {
                FetchError::Unreachable(format!("connection failed for '{locator}': {e}"))
            } else {
                FetchError::Internal(format!("request to '{locator}' failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                url: locator.to_string(),
            });
        }

        // Read the hint before the body consumes the response
        let extension = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(extension_from_content_type)
            .map(str::to_string)
            .or_else(|| extension_from_locator(locator));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Internal(format!("failed to read body from '{locator}': {e}")))?;

        tracing::debug!(locator, bytes = bytes.len(), ?extension, "HTTP fetch complete");

        Ok(FetchedPayload {
            bytes: bytes.to_vec(),
            extension,
        })
    }
}

/// Map a Content-Type header value to a file extension
fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "audio/mpeg" => Some("mp3"),
        "audio/mp4" => Some("m4a"),
        "application/zip" => Some("zip"),
        _ => None,
    }
}

/// Infer an extension from the path component of a locator
fn extension_from_locator(locator: &str) -> Option<String> {
    let url = url::Url::parse(locator).ok()?;
    let path = url.path();
    let (_, ext) = path.rsplit_once('/').unwrap_or(("", path)).1.rsplit_once('.')?;

    // Reject query-ish or implausible trailing segments
    if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
