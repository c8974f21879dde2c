//! Builds a streaming playlist from the week's best-reviewed new albums.
//!
//! Album sources scrape music criticism sites ([`sources`]), the
//! [`Aggregator`] concatenates their albums lazily, [`deduplicate`] collapses
//! repeats, and [`PlaylistSync`] matches each album against the catalog and
//! rebuilds the target playlist.

pub mod aggregator;
pub mod album;
pub mod catalog;
pub mod config;
pub mod dates;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod fuzzy;
pub mod headers;
pub mod iterator;
pub mod parsing;
pub mod retry;
pub mod sources;
pub mod storage;
pub mod sync;
pub mod testing;

pub use aggregator::{AggregatedAlbums, Aggregator, SourceFailure};
pub use album::{Album, StoredAlbum};
pub use catalog::{
    AuthorizationFlow, CatalogClient, CatalogEntry, CatalogMatch, CatalogMatcher, CatalogTrack,
    SpotifyClient, SpotifyCredentials,
};
pub use config::AppConfig;
pub use dates::DateNormalizer;
pub use dedup::{deduplicate, deduplicate_stream};
pub use error::PlaylistError;
pub use fetch::PageFetcher;
pub use filter::ReleaseFilter;
pub use iterator::AsyncAlbumIterator;
pub use sources::{AlbumSource, ScrapeOptions, SourceKind};
pub use storage::{load_albums, save_albums, BlobStore, FileBlobStore};
pub use sync::{MatchedAlbum, PlaylistSync, SyncReport, SyncStage};

#[cfg(feature = "mock")]
pub use catalog::MockCatalogClient;
#[cfg(feature = "mock")]
pub use iterator::MockAsyncAlbumIterator;

pub type Result<T> = std::result::Result<T, PlaylistError>;
