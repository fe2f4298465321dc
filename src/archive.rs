//! Batch archive assembly
//!
//! Fans a selection of items out into a bounded worker pool, pulls each
//! payload through the fetch cache, and streams successes into an in-memory
//! deflate ZIP. Per-item failures never terminate the batch: they accumulate
//! in the failure ledger and assembly proceeds to completion. Only the caller
//! can abandon a batch, via the cancellation token — and a cancelled run never
//! publishes an artifact.

use crate::cache::FetchCache;
use crate::config::{Config, EntryCollisionAction};
use crate::error::{Error, Result};
use crate::types::{ArchiveArtifact, BatchOutcome, Event, FailedItem, FetchResult, Item, ItemKey};
use crate::utils::unique_entry_name;
use chrono::Utc;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use zip::CompressionMethod;
use zip::write::FileOptions;

/// Assembles multi-item archives from a selection, tolerating partial failure
pub struct ArchiveAssembler {
    cache: Arc<FetchCache>,
    config: Arc<Config>,
    event_tx: broadcast::Sender<Event>,
}

/// Per-task outcome: slot index, the item, and its fetch result.
///
/// `None` means the task never fetched (cancelled before start, or the pool
/// shut down under it).
type TaskOutcome = (usize, Item, Option<Arc<FetchResult>>);

impl ArchiveAssembler {
    /// Create an assembler over the given cache
    pub fn new(
        cache: Arc<FetchCache>,
        config: Arc<Config>,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            cache,
            config,
            event_tx,
        }
    }

    /// Assemble an archive from the selection, in the given order.
    ///
    /// Fetches run concurrently (bounded by
    /// [`max_concurrent_fetches`](Config::max_concurrent_fetches)); the ZIP is
    /// written in selection order once all fetches have settled. Returns the
    /// artifact (tagged with the exact identity set attempted) plus the
    /// failure ledger for this run. A run that writes zero entries — empty
    /// selection or total failure — returns no artifact.
    ///
    /// Items already in the cache are not re-fetched, so re-assembling after a
    /// failed run only performs real work for the items that failed.
    pub async fn assemble(
        &self,
        selection: &[Item],
        archive_name: &str,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome> {
        if selection.is_empty() {
            tracing::debug!("empty selection, nothing to assemble");
            return Ok(BatchOutcome {
                artifact: None,
                entries_written: 0,
                failures: Vec::new(),
            });
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let total = selection.len();
        tracing::info!(total, archive_name, "assembling archive");
        let _ = self.event_tx.send(Event::ArchiveStarted { total });

        let results = self.fetch_all(selection, cancel).await;

        if cancel.is_cancelled() {
            tracing::info!(archive_name, "archive assembly cancelled");
            let _ = self.event_tx.send(Event::ArchiveCancelled);
            return Err(Error::Cancelled);
        }

        self.write_archive(selection, results, archive_name)
    }

    /// Fan the selection out into the bounded worker pool and collect every
    /// result into its selection-order slot.
    async fn fetch_all(
        &self,
        selection: &[Item],
        cancel: &CancellationToken,
    ) -> Vec<Option<Arc<FetchResult>>> {
        let total = selection.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches));
        let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();

        for (index, item) in selection.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let cache = Arc::clone(&self.cache);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, item, None),
                };
                // Cancellation is honored between per-item fetches; a fetch
                // already underway runs to completion so its cache entry
                // stays usable.
                if cancel.is_cancelled() {
                    return (index, item, None);
                }
                let result = cache.get_or_fetch(&item).await;
                (index, item, Some(result))
            });
        }

        let mut slots: Vec<Option<Arc<FetchResult>>> = vec![None; total];
        let mut completed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, item, result)) => {
                    completed += 1;
                    let _ = self.event_tx.send(Event::ArchiveProgress {
                        completed,
                        total,
                        key: item.key.clone(),
                    });
                    slots[index] = result;
                }
                Err(e) => {
                    // The slot stays empty and is ledgered as a failure below.
                    tracing::error!(error = %e, "fetch task did not complete");
                }
            }
        }
        slots
    }

    /// Write the settled results into a ZIP in selection order.
    fn write_archive(
        &self,
        selection: &[Item],
        results: Vec<Option<Arc<FetchResult>>>,
        archive_name: &str,
    ) -> Result<BatchOutcome> {
        let attempted: HashSet<ItemKey> = selection.iter().map(|item| item.key.clone()).collect();
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let mut taken: HashSet<String> = HashSet::new();
        let mut failures: Vec<FailedItem> = Vec::new();
        let mut entries = 0usize;

        for (item, result) in selection.iter().zip(results) {
            let Some(result) = result else {
                failures.push(FailedItem {
                    item: item.clone(),
                    reason: "fetch task aborted".to_string(),
                });
                continue;
            };

            match result.as_ref() {
                FetchResult::Success { payload, filename } => {
                    let entry_name = match self.resolve_entry_name(&taken, filename) {
                        Some(name) => name,
                        None => continue, // Skip policy dropped a duplicate
                    };
                    writer.start_file(entry_name.as_str(), options)?;
                    writer.write_all(payload)?;
                    taken.insert(entry_name);
                    entries += 1;
                }
                FetchResult::Failure { item: failed, reason } => {
                    failures.push(FailedItem {
                        item: failed.clone(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        if entries == 0 {
            tracing::warn!(
                failed = failures.len(),
                "no entries written, not producing an artifact"
            );
            return Ok(BatchOutcome {
                artifact: None,
                entries_written: 0,
                failures,
            });
        }

        let cursor = writer.finish()?;
        tracing::info!(
            archive_name,
            entries,
            failed = failures.len(),
            "archive assembled"
        );
        let _ = self.event_tx.send(Event::ArchiveReady {
            archive_name: archive_name.to_string(),
            entries,
            failed: failures.len(),
        });

        Ok(BatchOutcome {
            artifact: Some(ArchiveArtifact {
                bytes: cursor.into_inner(),
                filename: archive_name.to_string(),
                item_keys: attempted,
                created_at: Utc::now(),
            }),
            entries_written: entries,
            failures,
        })
    }

    /// Apply the configured collision action to a candidate entry name.
    ///
    /// Returns `None` when the Skip policy drops a duplicate.
    fn resolve_entry_name(&self, taken: &HashSet<String>, filename: &str) -> Option<String> {
        match self.config.entry_collision {
            EntryCollisionAction::Overwrite => Some(filename.to_string()),
            EntryCollisionAction::Rename => Some(unique_entry_name(taken, filename)),
            EntryCollisionAction::Skip => {
                if taken.contains(filename) {
                    tracing::warn!(filename, "duplicate entry name, skipping");
                    None
                } else {
                    Some(filename.to_string())
                }
            }
        }
    }
}
