//! Selection mutations and accessors
//!
//! Thin, catalog-validated wrappers over the
//! [`SessionState`](crate::session::SessionState) aggregate. Any mutation that
//! makes the selection diverge from the recorded artifact discards the
//! artifact (see the session module for the permanent-discard semantics).

use super::CreatorDownloader;
use crate::error::{Error, Result};
use crate::types::{Item, ItemKey};
use std::collections::HashSet;

impl CreatorDownloader {
    /// Toggle one item in or out of the selection; returns whether it is now
    /// selected. The key must belong to the active catalog.
    pub async fn toggle(&self, key: &ItemKey) -> Result<bool> {
        let mut state = self.state.lock().await;
        if !state.catalog.iter().any(|item| &item.key == key) {
            return Err(Error::UnknownItem(key.clone()));
        }
        Ok(state.session.toggle(key.clone()))
    }

    /// Select every item in the active catalog
    pub async fn select_all(&self) {
        let mut state = self.state.lock().await;
        let keys: Vec<ItemKey> = state.catalog.iter().map(|item| item.key.clone()).collect();
        state.session.select_all(keys);
    }

    /// Empty the selection
    pub async fn deselect_all(&self) {
        self.state.lock().await.session.deselect_all();
    }

    /// The set of currently selected item keys
    pub async fn current_selection(&self) -> HashSet<ItemKey> {
        self.state.lock().await.session.current_selection().clone()
    }

    /// Whether one item is currently selected
    pub async fn is_selected(&self, key: &ItemKey) -> bool {
        self.state.lock().await.session.is_selected(key)
    }

    /// The selected items in catalog (resolver) order — the order an archive
    /// assembly will process them
    pub async fn selected_items(&self) -> Vec<Item> {
        let state = self.state.lock().await;
        state
            .catalog
            .iter()
            .filter(|item| state.session.is_selected(&item.key))
            .cloned()
            .collect()
    }
}
