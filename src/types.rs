//! Core types for creator-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable unique identity of one content item.
///
/// Catalog resolvers must produce keys that are stable across repeated
/// resolutions of the same owner; all caching and selection state is keyed on
/// this value, never on the item's metadata.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(pub String);

impl ItemKey {
    /// Create a new ItemKey
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the inner key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ItemKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for ItemKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One published content item, as produced by a catalog resolver.
///
/// Items are immutable once resolved. Equality and hashing use the identity
/// key only — metadata fields (title, like count, thumbnail) may drift between
/// resolutions without changing what the item *is*.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity key
    pub key: ItemKey,

    /// Human-readable title
    pub title: String,

    /// Owner (creator) name
    pub owner: String,

    /// Popularity metric (e.g. like count)
    pub like_count: u64,

    /// Thumbnail locator, if the resolver provides one
    pub thumbnail_url: Option<String>,

    /// Canonical source locator handed to the content fetcher
    pub source_url: String,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Item {}

impl std::hash::Hash for Item {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Outcome of fetching a single item.
///
/// Produced at most once per item key per cache generation and shared
/// immutably behind an `Arc` — never mutated after creation. Failures are
/// values, not errors: callers treat every failure uniformly and the reason
/// string exists for diagnostics only.
#[derive(Debug)]
pub enum FetchResult {
    /// Payload fetched successfully
    Success {
        /// Raw payload bytes
        payload: Vec<u8>,
        /// Suggested filename (`<owner>_<title>.<ext>`, sanitized)
        filename: String,
    },

    /// Fetch failed; the item is kept so callers can retry it manually
    Failure {
        /// The item that could not be fetched
        item: Item,
        /// Diagnostic reason — never used for control flow
        reason: String,
    },
}

impl FetchResult {
    /// Whether this result carries a payload
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    /// Payload size in bytes, zero for failures
    pub fn payload_len(&self) -> usize {
        match self {
            FetchResult::Success { payload, .. } => payload.len(),
            FetchResult::Failure { .. } => 0,
        }
    }
}

/// One entry in the failure ledger of an assembly run.
///
/// Retains the full item (including its canonical locator) so the caller can
/// surface it for manual or individual retry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailedItem {
    /// The item that failed
    pub item: Item,

    /// Diagnostic reason recorded at failure time
    pub reason: String,
}

/// The last successfully assembled archive.
///
/// Valid only while the current selection is set-equal to `item_keys` — the
/// exact identity set that was *attempted* when the archive was built.
#[derive(Clone, Debug)]
pub struct ArchiveArtifact {
    /// Complete archive bytes (deflate ZIP)
    pub bytes: Vec<u8>,

    /// Suggested archive filename
    pub filename: String,

    /// Identity set of every item attempted in the assembly run
    pub item_keys: HashSet<ItemKey>,

    /// When the archive was assembled
    pub created_at: DateTime<Utc>,
}

/// Result of one batch assembly run: the artifact (if any entry was written)
/// plus the failure ledger for the run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Assembled artifact; `None` when the selection was empty or every item failed
    pub artifact: Option<ArchiveArtifact>,

    /// Number of entries written into the archive (can differ from
    /// selection − failures when a collision policy drops duplicates)
    pub entries_written: usize,

    /// Items that failed during this run, in selection order (best-effort)
    pub failures: Vec<FailedItem>,
}

/// Caller-facing summary of a `prepare_archive` run.
///
/// The artifact itself is held in session state; this reports the counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssemblySummary {
    /// Number of items attempted (the selection size)
    pub attempted: usize,

    /// Number of entries written into the archive
    pub archived: usize,

    /// Number of items in the failure ledger
    pub failed: usize,

    /// Archive filename, when an artifact was produced
    pub archive_name: Option<String>,
}

/// Event emitted during catalog, fetch, and archive operations
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Catalog resolution started
    CatalogLoading {
        /// Owner identifier being resolved
        owner: String,
    },

    /// Catalog resolution finished
    CatalogLoaded {
        /// Owner identifier that was resolved
        owner: String,
        /// Number of items in the catalog
        item_count: usize,
    },

    /// A single item was fetched successfully (cache hit or live fetch)
    ItemFetched {
        /// Item identity
        key: ItemKey,
        /// Payload size in bytes
        bytes: u64,
    },

    /// A single item fetch failed
    ItemFetchFailed {
        /// Item identity
        key: ItemKey,
        /// Diagnostic reason
        reason: String,
    },

    /// Batch assembly started
    ArchiveStarted {
        /// Number of items in the selection
        total: usize,
    },

    /// One item of the batch finished (success or failure)
    ArchiveProgress {
        /// Items finished so far
        completed: usize,
        /// Total items in the batch
        total: usize,
        /// Identity of the item that just finished
        key: ItemKey,
    },

    /// Batch assembly produced an artifact
    ArchiveReady {
        /// Archive filename
        archive_name: String,
        /// Entries written into the archive
        entries: usize,
        /// Items in the failure ledger
        failed: usize,
    },

    /// Batch assembly was abandoned before completion
    ArchiveCancelled,

    /// The fetch cache was cleared
    CacheCleared {
        /// Generation in effect after the clear
        generation: u64,
    },

    /// The whole session (cache, selection, artifact, catalog) was reset
    SessionReset,
}
