//! Error types for creator-dl
//!
//! Two error families exist, mirroring the two collaborators:
//! - [`CatalogError`] — classified resolution failures; these abort a catalog
//!   load and surface to the caller as a single classified error.
//! - [`FetchError`] — per-item fetch failures; during batch assembly these are
//!   recovered locally into the failure ledger and never abort the batch.
//!
//! Everything else is wrapped by the top-level [`Error`].

use crate::types::ItemKey;
use thiserror::Error;

/// Result type alias for creator-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for creator-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent_fetches")
        key: Option<String>,
    },

    /// Catalog resolution failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Single-item fetch failed
    ///
    /// Only surfaced from direct single-item operations; batch assembly folds
    /// fetch failures into the failure ledger instead.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Archive write error
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Item key not present in the loaded catalog
    #[error("item not found in catalog: {0}")]
    UnknownItem(ItemKey),

    /// Batch assembly was abandoned by the caller before completion
    #[error("archive assembly cancelled")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Classified catalog resolution errors
///
/// Produced by [`CatalogResolver`](crate::source::CatalogResolver)
/// implementations. A resolution error aborts the entire catalog load — there
/// is no partial catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The owner identifier does not exist
    #[error("owner '{owner}' not found")]
    NotFound {
        /// The owner identifier that was looked up
        owner: String,
    },

    /// The owner's catalog is private or access is forbidden
    #[error("owner '{owner}' is private or forbidden")]
    Forbidden {
        /// The owner identifier that was looked up
        owner: String,
    },

    /// A transient resolution failure (network, rate limit, upstream hiccup)
    #[error("transient catalog error: {0}")]
    Transient(String),
}

/// Classified content fetch errors
///
/// Produced by [`ContentFetcher`](crate::source::ContentFetcher)
/// implementations. At the fetch-service boundary all variants are normalized
/// to a uniform [`FetchResult::Failure`](crate::types::FetchResult) — the
/// variant distinction exists for fetcher implementors and diagnostics.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The locator could not be reached at all
    #[error("locator unreachable: {0}")]
    Unreachable(String),

    /// The remote answered with a non-success status
    #[error("unexpected status {code} from {url}")]
    Status {
        /// HTTP-like status code
        code: u16,
        /// The locator that produced the status
        url: String,
    },

    /// Internal fetcher error (decode, protocol, anything else)
    #[error("fetcher error: {0}")]
    Internal(String),
}
