//! Memoizing fetch cache with generation-scoped invalidation
//!
//! Maps item identity keys to fetch results. Within one generation each key is
//! fetched at most once; concurrent callers for the same uncached key collapse
//! onto a single underlying fetch (singleflight) — the second caller waits for
//! the first's result instead of triggering a duplicate.
//!
//! [`clear`](FetchCache::clear) bumps the generation counter and swaps in an
//! empty map. Fetches still in flight from the previous generation complete
//! into their old, now-orphaned cells: their results are returned to the
//! caller that started them but are never written into — nor served from —
//! the new generation's map.

use crate::fetch::FetchService;
use crate::types::{FetchResult, Item, ItemKey};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

type ResultCell = Arc<OnceCell<Arc<FetchResult>>>;

struct CacheState {
    generation: u64,
    entries: HashMap<ItemKey, ResultCell>,
}

/// Memoizing store mapping item identity to a fetched payload or failure
pub struct FetchCache {
    service: Arc<FetchService>,
    state: Mutex<CacheState>,
}

impl FetchCache {
    /// Create an empty cache (generation 0) over the given fetch service
    pub fn new(service: Arc<FetchService>) -> Self {
        Self {
            service,
            state: Mutex::new(CacheState {
                generation: 0,
                entries: HashMap::new(),
            }),
        }
    }

    /// Return the cached result for this item, fetching it first if needed.
    ///
    /// At most one underlying fetch runs per key per generation; concurrent
    /// callers for the same key share the same result.
    pub async fn get_or_fetch(&self, item: &Item) -> Arc<FetchResult> {
        // Clone the per-key cell out of the lock so the fetch itself runs
        // without holding the cache mutex.
        let cell = {
            let mut state = self.state.lock().await;
            Arc::clone(
                state
                    .entries
                    .entry(item.key.clone())
                    .or_insert_with(|| Arc::new(OnceCell::new())),
            )
        };

        let result = cell
            .get_or_init(|| async { Arc::new(self.service.fetch(item).await) })
            .await;
        Arc::clone(result)
    }

    /// Whether a completed result is stored for this key in the current generation
    pub async fn is_cached(&self, key: &ItemKey) -> bool {
        let state = self.state.lock().await;
        state.entries.get(key).is_some_and(|cell| cell.initialized())
    }

    /// Number of completed results in the current generation
    pub async fn cached_count(&self) -> usize {
        let state = self.state.lock().await;
        state
            .entries
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    /// Current cache generation
    pub async fn generation(&self) -> u64 {
        self.state.lock().await.generation
    }

    /// Discard every stored result and start a new generation.
    ///
    /// Returns the new generation number. In-flight fetches from the old
    /// generation are not interrupted, but their results never become visible
    /// to later lookups.
    pub async fn clear(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.entries = HashMap::new();
        tracing::info!(generation = state.generation, "fetch cache cleared");
        state.generation
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::source::{ContentFetcher, FetchedPayload};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    /// Counts underlying fetches; optionally gates them on a semaphore so a
    /// test can hold a fetch in flight.
    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
        started: Option<Arc<Semaphore>>,
        release: Option<Arc<Semaphore>>,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                started: None,
                release: None,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn gated(started: Arc<Semaphore>, release: Arc<Semaphore>) -> Self {
            Self {
                started: Some(started),
                release: Some(release),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentFetcher for CountingFetcher {
        async fn fetch(
            &self,
            _locator: &str,
        ) -> std::result::Result<FetchedPayload, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(started) = &self.started {
                started.add_permits(1);
            }
            if let Some(release) = &self.release {
                let permit = release.acquire().await.expect("release semaphore closed");
                permit.forget();
            } else {
                // Keep the fetch in flight long enough for a concurrent
                // caller to observe the pending cell.
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            }
            if self.fail {
                return Err(FetchError::Unreachable(format!("boom #{call}")));
            }
            Ok(FetchedPayload {
                bytes: format!("payload-{call}").into_bytes(),
                extension: Some("mp4".to_string()),
            })
        }
    }

    fn item(key: &str) -> Item {
        Item {
            key: ItemKey::new(key),
            title: format!("title {key}"),
            owner: "owner".to_string(),
            like_count: 0,
            thumbnail_url: None,
            source_url: format!("https://example.com/{key}"),
        }
    }

    fn cache_over(fetcher: Arc<CountingFetcher>) -> FetchCache {
        FetchCache::new(Arc::new(FetchService::new(fetcher)))
    }

    #[tokio::test]
    async fn second_lookup_reuses_the_stored_result() {
        let fetcher = Arc::new(CountingFetcher::new());
        let cache = cache_over(Arc::clone(&fetcher));

        let first = cache.get_or_fetch(&item("v1")).await;
        let second = cache.get_or_fetch(&item("v1")).await;

        assert_eq!(fetcher.calls(), 1, "only one underlying fetch may run");
        assert!(
            Arc::ptr_eq(&first, &second),
            "both callers must observe the identical result"
        );
    }

    #[tokio::test]
    async fn failures_are_memoized_like_successes() {
        let fetcher = Arc::new(CountingFetcher::failing());
        let cache = cache_over(Arc::clone(&fetcher));

        let first = cache.get_or_fetch(&item("v1")).await;
        let second = cache.get_or_fetch(&item("v1")).await;

        assert!(!first.is_success());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls(), 1, "a cached failure must not re-fetch");
    }

    #[tokio::test]
    async fn different_keys_fetch_independently() {
        let fetcher = Arc::new(CountingFetcher::new());
        let cache = cache_over(Arc::clone(&fetcher));

        cache.get_or_fetch(&item("v1")).await;
        cache.get_or_fetch(&item("v2")).await;

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(cache.cached_count().await, 2);
    }

    #[tokio::test]
    async fn clear_starts_a_fresh_generation() {
        let fetcher = Arc::new(CountingFetcher::new());
        let cache = cache_over(Arc::clone(&fetcher));

        let before = cache.get_or_fetch(&item("v1")).await;
        assert_eq!(cache.generation().await, 0);

        let generation = cache.clear().await;
        assert_eq!(generation, 1);
        assert!(!cache.is_cached(&ItemKey::new("v1")).await);

        let after = cache.get_or_fetch(&item("v1")).await;
        assert_eq!(fetcher.calls(), 2, "post-clear lookup must fetch fresh");
        assert!(
            !Arc::ptr_eq(&before, &after),
            "the pre-clear result must never be returned after clear"
        );
    }

    #[tokio::test]
    async fn concurrent_same_key_callers_collapse_to_one_fetch() {
        let fetcher = Arc::new(CountingFetcher::new());
        let cache = Arc::new(cache_over(Arc::clone(&fetcher)));

        let item1 = item("v1");
        let item2 = item("v1");
        let (a, b) = tokio::join!(
            cache.get_or_fetch(&item1),
            cache.get_or_fetch(&item2)
        );

        assert_eq!(fetcher.calls(), 1, "singleflight must collapse duplicates");
        assert!(Arc::ptr_eq(&a, &b), "both callers observe an identical result");
    }

    #[tokio::test]
    async fn in_flight_fetch_from_old_generation_is_not_written_into_new_map() {
        let started = Arc::new(Semaphore::new(0));
        let release = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(CountingFetcher::gated(
            Arc::clone(&started),
            Arc::clone(&release),
        ));
        let cache = Arc::new(cache_over(Arc::clone(&fetcher)));

        let pending = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_or_fetch(&item("v1")).await })
        };

        // Wait until the fetch is genuinely in flight, then invalidate.
        let permit = started.acquire().await.unwrap();
        permit.forget();
        cache.clear().await;
        release.add_permits(1);

        let stale = pending.await.unwrap();
        assert!(stale.is_success(), "the caller that started the fetch still gets its result");
        assert!(
            !cache.is_cached(&ItemKey::new("v1")).await,
            "the stale write must not land in the new generation's map"
        );

        // A fresh lookup performs a fresh fetch.
        release.add_permits(1);
        let fresh = cache.get_or_fetch(&item("v1")).await;
        assert_eq!(fetcher.calls(), 2);
        assert!(!Arc::ptr_eq(&stale, &fresh));
    }
}
