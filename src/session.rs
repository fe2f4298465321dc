//! Selection and artifact state machine
//!
//! Pure in-memory state: the current selection, the last assembled archive
//! artifact, and the failure ledger of the most recent assembly run. Owns no
//! network or I/O.
//!
//! The artifact moves through three states — no-artifact, valid-artifact,
//! stale-artifact — driven by selection mutations and assembly completions.
//! Invalidation is a *permanent discard*: as soon as a mutation makes the
//! selection diverge from the artifact's recorded identity set, the artifact
//! bytes are dropped, and restoring the original selection does not revive
//! them. (A stale artifact can only be observed when `note_new_artifact`
//! records a run whose selection already changed while it was assembling.)

use crate::types::{ArchiveArtifact, FailedItem, ItemKey};
use std::collections::HashSet;

/// In-memory session aggregate: selection set, archive artifact, failure ledger
#[derive(Debug, Default)]
pub struct SessionState {
    selection: HashSet<ItemKey>,
    artifact: Option<ArchiveArtifact>,
    failures: Vec<FailedItem>,
}

impl SessionState {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle one item in or out of the selection; returns whether it is now selected
    pub fn toggle(&mut self, key: ItemKey) -> bool {
        let selected = if self.selection.remove(&key) {
            false
        } else {
            self.selection.insert(key);
            true
        };
        self.discard_artifact_if_diverged();
        selected
    }

    /// Replace the selection with every candidate key
    pub fn select_all(&mut self, candidates: impl IntoIterator<Item = ItemKey>) {
        self.selection = candidates.into_iter().collect();
        self.discard_artifact_if_diverged();
    }

    /// Empty the selection
    pub fn deselect_all(&mut self) {
        self.selection.clear();
        self.discard_artifact_if_diverged();
    }

    /// The set of currently selected item keys
    pub fn current_selection(&self) -> &HashSet<ItemKey> {
        &self.selection
    }

    /// Whether one item is currently selected
    pub fn is_selected(&self, key: &ItemKey) -> bool {
        self.selection.contains(key)
    }

    /// Record the outcome of an assembly run.
    ///
    /// `None` (an empty or all-failed run) is equivalent to invalidation.
    pub fn note_new_artifact(&mut self, artifact: Option<ArchiveArtifact>) {
        self.artifact = artifact;
    }

    /// Whether the stored artifact matches the current selection exactly
    pub fn current_artifact_valid(&self) -> bool {
        self.artifact
            .as_ref()
            .is_some_and(|artifact| artifact.item_keys == self.selection)
    }

    /// The stored artifact, valid or stale
    pub fn artifact(&self) -> Option<&ArchiveArtifact> {
        self.artifact.as_ref()
    }

    /// Replace the failure ledger wholesale (one ledger per assembly run)
    pub fn record_failures(&mut self, failures: Vec<FailedItem>) {
        self.failures = failures;
    }

    /// Failure ledger of the most recent assembly run
    pub fn failures(&self) -> &[FailedItem] {
        &self.failures
    }

    /// Drop selection, artifact, and ledger together
    pub fn clear(&mut self) {
        self.selection.clear();
        self.artifact = None;
        self.failures.clear();
    }

    fn discard_artifact_if_diverged(&mut self) {
        if let Some(artifact) = &self.artifact
            && artifact.item_keys != self.selection
        {
            tracing::debug!("selection diverged from archived set, discarding artifact");
            self.artifact = None;
        }
    }
}
