//! # creator-dl
//!
//! Backend library for bulk-downloading a creator's published content.
//!
//! ## Design Philosophy
//!
//! creator-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Collaborator-driven** - Catalog resolution and raw fetching live
//!   behind traits; the core owns only orchestration, caching, and state
//! - **Failure-tolerant** - A batch archive continues past per-item failures
//!   and reports exactly which items failed
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use creator_dl::{Config, CreatorDownloader};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! # use creator_dl::source::CatalogResolver;
//! # fn my_resolver() -> Arc<dyn CatalogResolver> { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = CreatorDownloader::with_http_fetcher(Config::default(), my_resolver())?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     downloader.load_catalog("some.creator", Some(25)).await?;
//!     downloader.select_all().await;
//!     let summary = downloader.prepare_archive(&CancellationToken::new()).await?;
//!     println!("archived {} of {}", summary.archived, summary.attempted);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Batch archive assembly
pub mod archive;
/// Memoizing fetch cache with generation-scoped invalidation
pub mod cache;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Single-item fetch service
pub mod fetch;
/// Selection and artifact state machine
pub mod session;
/// Collaborator seams: catalog resolution and content fetching
pub mod source;
/// Core types and events
pub mod types;
/// Filename sanitization and archive entry naming
pub mod utils;

// Re-export commonly used types
pub use archive::ArchiveAssembler;
pub use cache::FetchCache;
pub use config::{Config, EntryCollisionAction};
pub use downloader::CreatorDownloader;
pub use error::{CatalogError, Error, FetchError, Result};
pub use fetch::FetchService;
pub use session::SessionState;
pub use source::{CatalogResolver, ContentFetcher, FetchedPayload, HttpContentFetcher};
pub use types::{
    ArchiveArtifact, AssemblySummary, BatchOutcome, Event, FailedItem, FetchResult, Item, ItemKey,
};
