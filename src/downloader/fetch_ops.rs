//! Single-item fetching and cache control

use super::CreatorDownloader;
use crate::error::{Error, Result};
use crate::types::{Event, FetchResult, ItemKey};
use std::sync::Arc;

impl CreatorDownloader {
    /// Fetch one catalog item through the cache.
    ///
    /// The first call per key performs the real fetch; later calls — and a
    /// later batch assembly containing the item — reuse the stored result.
    /// Failures are returned as values, not errors, so the caller can show
    /// the reason and retry individually.
    pub async fn fetch_item(&self, key: &ItemKey) -> Result<Arc<FetchResult>> {
        let item = self.item(key).await.ok_or_else(|| Error::UnknownItem(key.clone()))?;

        let result = self.cache.get_or_fetch(&item).await;
        match result.as_ref() {
            FetchResult::Success { payload, .. } => {
                let _ = self.event_tx.send(Event::ItemFetched {
                    key: key.clone(),
                    bytes: payload.len() as u64,
                });
            }
            FetchResult::Failure { reason, .. } => {
                let _ = self.event_tx.send(Event::ItemFetchFailed {
                    key: key.clone(),
                    reason: reason.clone(),
                });
            }
        }
        Ok(result)
    }

    /// Whether a completed result is cached for this key
    pub async fn is_cached(&self, key: &ItemKey) -> bool {
        self.cache.is_cached(key).await
    }

    /// Current cache generation
    pub async fn cache_generation(&self) -> u64 {
        self.cache.generation().await
    }

    /// Clear the fetch cache (explicit user action).
    ///
    /// Starts a new cache generation; selection and any existing archive
    /// artifact are untouched. Returns the new generation.
    pub async fn clear_cache(&self) -> u64 {
        let generation = self.cache.clear().await;
        let _ = self.event_tx.send(Event::CacheCleared { generation });
        generation
    }
}
