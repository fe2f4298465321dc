//! Common test utilities for creator-dl integration tests

use async_trait::async_trait;
use creator_dl::error::{CatalogError, FetchError};
use creator_dl::source::{CatalogResolver, ContentFetcher, FetchedPayload};
use creator_dl::types::{Item, ItemKey};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build a catalog item for the given owner
pub fn make_item(owner: &str, key: &str, title: &str) -> Item {
    Item {
        key: ItemKey::new(key),
        title: title.to_string(),
        owner: owner.to_string(),
        like_count: 100,
        thumbnail_url: Some(format!("https://cdn.example.com/{key}/thumb.jpg")),
        source_url: format!("https://cdn.example.com/{key}/clip.mp4"),
    }
}

/// Resolver serving a fixed catalog for one owner
pub struct FixedResolver {
    owner: String,
    items: Vec<Item>,
}

impl FixedResolver {
    pub fn new(owner: &str, items: Vec<Item>) -> Self {
        Self {
            owner: owner.to_string(),
            items,
        }
    }
}

#[async_trait]
impl CatalogResolver for FixedResolver {
    async fn resolve(
        &self,
        owner: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Item>, CatalogError> {
        if owner != self.owner {
            return Err(CatalogError::NotFound {
                owner: owner.to_string(),
            });
        }
        let mut items = self.items.clone();
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}

/// Content fetcher with per-locator scripted failures and fetch counting.
///
/// A locator marked flaky fails for its first `fail_times` fetches, then
/// succeeds — enough to exercise memoized failures, cache clears, and retry
/// flows.
pub struct ScriptedFetcher {
    total_calls: AtomicUsize,
    per_locator: Mutex<HashMap<String, usize>>,
    flaky: HashMap<String, usize>,
}

impl ScriptedFetcher {
    pub fn reliable() -> Self {
        Self {
            total_calls: AtomicUsize::new(0),
            per_locator: Mutex::new(HashMap::new()),
            flaky: HashMap::new(),
        }
    }

    /// Mark a locator as failing for its first `fail_times` fetches
    pub fn flaky(mut self, locator: &str, fail_times: usize) -> Self {
        self.flaky.insert(locator.to_string(), fail_times);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFetcher for ScriptedFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchedPayload, FetchError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut counts = self
                .per_locator
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let entry = counts.entry(locator.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        if let Some(&fail_times) = self.flaky.get(locator)
            && attempt <= fail_times
        {
            return Err(FetchError::Unreachable(format!(
                "simulated outage for {locator} (attempt {attempt})"
            )));
        }

        Ok(FetchedPayload {
            bytes: format!("payload of {locator}").into_bytes(),
            extension: Some("mp4".to_string()),
        })
    }
}
