//! Catalog loading and lookups

use super::CreatorDownloader;
use crate::error::Result;
use crate::types::{Event, Item, ItemKey};

impl CreatorDownloader {
    /// Resolve an owner's catalog and make it the active one.
    ///
    /// Resets selection, artifact, and failure ledger (a new catalog starts a
    /// clean slate) but leaves the fetch cache intact — previously fetched
    /// payloads stay reusable. `limit` falls back to
    /// [`default_catalog_limit`](crate::config::Config::default_catalog_limit);
    /// resolution errors abort the load and surface classified.
    pub async fn load_catalog(&self, owner: &str, limit: Option<usize>) -> Result<Vec<Item>> {
        let limit = limit.or(self.config.default_catalog_limit);
        tracing::info!(owner, ?limit, "loading catalog");
        let _ = self.event_tx.send(Event::CatalogLoading {
            owner: owner.to_string(),
        });

        let items = self.resolver.resolve(owner, limit).await?;
        tracing::info!(owner, item_count = items.len(), "catalog loaded");

        {
            let mut state = self.state.lock().await;
            state.owner = Some(owner.to_string());
            state.catalog = items.clone();
            state.session.clear();
        }

        let _ = self.event_tx.send(Event::CatalogLoaded {
            owner: owner.to_string(),
            item_count: items.len(),
        });
        Ok(items)
    }

    /// Cheap flat listing of an owner's catalog, without touching any state.
    ///
    /// Useful for previewing large catalogs before committing to a full
    /// [`load_catalog`](Self::load_catalog).
    pub async fn peek_catalog(&self, owner: &str, limit: Option<usize>) -> Result<Vec<Item>> {
        let limit = limit.or(self.config.default_catalog_limit);
        Ok(self.resolver.resolve_flat(owner, limit).await?)
    }

    /// The active catalog, in resolver order
    pub async fn catalog(&self) -> Vec<Item> {
        self.state.lock().await.catalog.clone()
    }

    /// The owner whose catalog is active, if any
    pub async fn owner(&self) -> Option<String> {
        self.state.lock().await.owner.clone()
    }

    /// Look up one catalog item by key
    pub async fn item(&self, key: &ItemKey) -> Option<Item> {
        self.state
            .lock()
            .await
            .catalog
            .iter()
            .find(|item| &item.key == key)
            .cloned()
    }
}
