//! Core downloader implementation split into focused submodules.
//!
//! The `CreatorDownloader` struct and its methods are organized by domain:
//! - [`catalog`] - Catalog loading and lookups
//! - [`selection`] - Selection mutations and accessors
//! - [`fetch_ops`] - Single-item fetching and cache control
//! - [`archive_ops`] - Batch archive assembly and artifact access

mod archive_ops;
mod catalog;
mod fetch_ops;
mod selection;


use crate::archive::ArchiveAssembler;
use crate::cache::FetchCache;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::FetchService;
use crate::session::SessionState;
use crate::source::{CatalogResolver, ContentFetcher, HttpContentFetcher};
use crate::types::{Event, Item};
use std::sync::Arc;
use std::time::Duration;

/// Session-scoped mutable state behind one lock: the owner whose catalog is
/// loaded, the catalog itself, and the selection/artifact aggregate.
pub(crate) struct DownloaderState {
    pub(crate) owner: Option<String>,
    pub(crate) catalog: Vec<Item>,
    pub(crate) session: SessionState,
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
///
/// Owns the fetch cache, the selection/artifact session state, and the event
/// channel; delegates catalog resolution and raw fetching to the collaborator
/// traits supplied at construction. All state is process-local and volatile —
/// nothing survives the instance.
#[derive(Clone)]
pub struct CreatorDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Catalog resolver collaborator
    pub(crate) resolver: Arc<dyn CatalogResolver>,
    /// Memoizing fetch cache (write-through to the fetch service)
    pub(crate) cache: Arc<FetchCache>,
    /// Batch archive assembler
    pub(crate) assembler: Arc<ArchiveAssembler>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Owner + catalog + session aggregate
    pub(crate) state: Arc<tokio::sync::Mutex<DownloaderState>>,
}

impl CreatorDownloader {
    /// Create a downloader over explicit resolver and fetcher collaborators
    pub fn new(
        config: Config,
        resolver: Arc<dyn CatalogResolver>,
        fetcher: Arc<dyn ContentFetcher>,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let (event_tx, _) = tokio::sync::broadcast::channel(config.event_channel_capacity);
        let service = Arc::new(FetchService::new(fetcher));
        let cache = Arc::new(FetchCache::new(service));
        let assembler = Arc::new(ArchiveAssembler::new(
            Arc::clone(&cache),
            Arc::clone(&config),
            event_tx.clone(),
        ));

        Ok(Self {
            config,
            resolver,
            cache,
            assembler,
            event_tx,
            state: Arc::new(tokio::sync::Mutex::new(DownloaderState {
                owner: None,
                catalog: Vec::new(),
                session: SessionState::new(),
            })),
        })
    }

    /// Create a downloader using the bundled HTTP content fetcher.
    ///
    /// Convenience for resolvers whose canonical locators are directly
    /// fetchable URLs; the request timeout comes from
    /// [`fetch_timeout_secs`](Config::fetch_timeout_secs).
    pub fn with_http_fetcher(config: Config, resolver: Arc<dyn CatalogResolver>) -> Result<Self> {
        let fetcher = Arc::new(HttpContentFetcher::new(Duration::from_secs(
            config.fetch_timeout_secs,
        ))?);
        Self::new(config, resolver, fetcher)
    }

    /// Subscribe to downloader events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discard the whole session: cache, selection, artifact, ledger, and
    /// catalog together.
    pub async fn reset_session(&self) {
        {
            let mut state = self.state.lock().await;
            state.owner = None;
            state.catalog.clear();
            state.session.clear();
        }
        self.cache.clear().await;
        tracing::info!("session reset");
        let _ = self.event_tx.send(Event::SessionReset);
    }
}
