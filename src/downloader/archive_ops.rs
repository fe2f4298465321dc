//! Batch archive assembly and artifact access

use super::CreatorDownloader;
use crate::error::Result;
use crate::types::{ArchiveArtifact, AssemblySummary, FailedItem, Item};
use crate::utils::sanitize_filename;
use tokio_util::sync::CancellationToken;

/// Archive name used before any catalog has been loaded
const DEFAULT_ARCHIVE_OWNER: &str = "download";

impl CreatorDownloader {
    /// Assemble an archive from the current selection.
    ///
    /// Snapshots the selection in catalog order, runs the batch assembler
    /// (without holding the session lock), then records the resulting artifact
    /// and failure ledger in session state. Per-item failures do not abort the
    /// run; they land in the ledger, readable via
    /// [`failed_items`](Self::failed_items). Cancelling through `cancel`
    /// abandons the run with [`Error::Cancelled`](crate::error::Error) and
    /// records nothing — already-cached fetches stay cached.
    ///
    /// The archive is named after the owner that produced the selection:
    /// `<sanitized-owner>_download.zip`.
    pub async fn prepare_archive(&self, cancel: &CancellationToken) -> Result<AssemblySummary> {
        let (selection, archive_name) = {
            let state = self.state.lock().await;
            let selection: Vec<Item> = state
                .catalog
                .iter()
                .filter(|item| state.session.is_selected(&item.key))
                .cloned()
                .collect();
            let owner = state
                .owner
                .clone()
                .unwrap_or_else(|| DEFAULT_ARCHIVE_OWNER.to_string());
            (selection, format!("{}_download.zip", sanitize_filename(&owner)))
        };

        let attempted = selection.len();
        let outcome = self
            .assembler
            .assemble(&selection, &archive_name, cancel)
            .await?;

        let summary = AssemblySummary {
            attempted,
            archived: outcome.entries_written,
            failed: outcome.failures.len(),
            archive_name: outcome.artifact.as_ref().map(|a| a.filename.clone()),
        };

        {
            let mut state = self.state.lock().await;
            state.session.record_failures(outcome.failures);
            state.session.note_new_artifact(outcome.artifact);
        }

        Ok(summary)
    }

    /// The stored archive artifact, if any — valid or stale.
    ///
    /// Use [`current_artifact_valid`](Self::current_artifact_valid) (or
    /// [`artifact_if_valid`](Self::artifact_if_valid)) before offering it for
    /// download.
    pub async fn artifact(&self) -> Option<ArchiveArtifact> {
        self.state.lock().await.session.artifact().cloned()
    }

    /// The stored artifact, only when it matches the current selection exactly
    pub async fn artifact_if_valid(&self) -> Option<ArchiveArtifact> {
        let state = self.state.lock().await;
        if state.session.current_artifact_valid() {
            state.session.artifact().cloned()
        } else {
            None
        }
    }

    /// Whether the stored artifact matches the current selection exactly
    pub async fn current_artifact_valid(&self) -> bool {
        self.state.lock().await.session.current_artifact_valid()
    }

    /// Failure ledger of the most recent assembly run
    pub async fn failed_items(&self) -> Vec<FailedItem> {
        self.state.lock().await.session.failures().to_vec()
    }
}
