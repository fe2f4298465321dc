//! Single-item fetch service
//!
//! Resolves one [`Item`] to a [`FetchResult`] via the content fetcher
//! collaborator. Failures never propagate as errors from here: an unreachable
//! locator, an empty payload, and a fetcher-internal error all become a
//! uniform `Failure` value so batch callers can continue past them. The
//! specific reason string is preserved for diagnostics only.

use crate::source::ContentFetcher;
use crate::types::{FetchResult, Item};
use crate::utils::entry_filename;
use std::sync::Arc;

/// Extension used when the fetcher supplies no hint
const FALLBACK_EXTENSION: &str = "bin";

/// Fetches one item through the [`ContentFetcher`] collaborator and derives
/// its suggested filename
pub struct FetchService {
    fetcher: Arc<dyn ContentFetcher>,
}

impl FetchService {
    /// Create a service over the given content fetcher
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch one item to completion.
    ///
    /// May block for an arbitrary, externally-bounded duration — timeout
    /// policy belongs to the content fetcher. Infallible by design: every
    /// failure mode is folded into [`FetchResult::Failure`].
    pub async fn fetch(&self, item: &Item) -> FetchResult {
        tracing::debug!(key = %item.key, locator = %item.source_url, "fetching item");

        match self.fetcher.fetch(&item.source_url).await {
            Ok(payload) if payload.bytes.is_empty() => {
                tracing::warn!(key = %item.key, "fetch returned an empty payload");
                FetchResult::Failure {
                    item: item.clone(),
                    reason: "empty payload".to_string(),
                }
            }
            Ok(payload) => {
                let extension = payload
                    .extension
                    .as_deref()
                    .unwrap_or(FALLBACK_EXTENSION);
                let filename = entry_filename(&item.owner, &item.title, extension);
                tracing::debug!(
                    key = %item.key,
                    bytes = payload.bytes.len(),
                    filename,
                    "item fetched"
                );
                FetchResult::Success {
                    payload: payload.bytes,
                    filename,
                }
            }
            Err(e) => {
                tracing::warn!(key = %item.key, error = %e, "item fetch failed");
                FetchResult::Failure {
                    item: item.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
