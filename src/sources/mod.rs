//! Album sources: one listing page per music criticism site.
//!
//! Every source exposes the same capability ([`AlbumSource`]): fetch its raw
//! page, parse it into [`RawRelease`] rows, and, once boxed, yield filtered
//! [`Album`] records lazily through `produce_albums`.

mod detailed_metacritic;
mod metacritic;
mod pitchfork;

pub use detailed_metacritic::{DetailedMetacriticSource, DETAILED_METACRITIC_URL};
pub use metacritic::{MetacriticSource, METACRITIC_URL};
pub use pitchfork::{PitchforkSource, PITCHFORK_URL};

use crate::album::RawRelease;
use crate::fetch::PageFetcher;
use crate::filter::ReleaseFilter;
use crate::iterator::AsyncAlbumIterator;
use crate::{Album, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Per-run settings handed to every source.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeOptions {
    pub filter: ReleaseFilter,
    /// Rate limit retries per page fetch
    pub retries: u32,
    /// Reference day for year inference and the recency window
    pub today: NaiveDate,
}

impl ScrapeOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            filter: ReleaseFilter::default(),
            retries: 3,
            today,
        }
    }

    pub fn with_filter(mut self, filter: ReleaseFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// A site that lists newly released albums.
///
/// Sources hold only their fixed configuration (URL, fetcher) and are used
/// for a single pass: once their albums have been produced they are dropped.
#[async_trait(?Send)]
pub trait AlbumSource {
    /// Human-readable label stored on every album this source yields.
    fn name(&self) -> &str;

    /// The listing page this source scrapes.
    fn url(&self) -> &str;

    fn fetcher(&self) -> &PageFetcher;

    /// Download the listing page, retrying up to `retries` times when rate
    /// limited.
    async fn fetch_raw(&self, retries: u32) -> Result<String> {
        self.fetcher().fetch(self.url(), retries).await
    }

    /// Extract every release row from a downloaded page.
    ///
    /// Rows that cannot be parsed are skipped; a page without the expected
    /// structure at all is a [`PlaylistError::Parse`](crate::PlaylistError::Parse).
    fn parse(&self, raw: &str, today: NaiveDate) -> Result<Vec<RawRelease>>;
}

impl dyn AlbumSource {
    /// Turn this source into a lazy, filtered album sequence.
    ///
    /// The page is not fetched until the first call to `next`.
    pub fn produce_albums(self: Box<Self>, options: ScrapeOptions) -> SourceAlbums {
        SourceAlbums::new(self, options)
    }
}

/// Lazy album sequence for a single source.
pub struct SourceAlbums {
    source: Box<dyn AlbumSource>,
    options: ScrapeOptions,
    pending: Option<VecDeque<RawRelease>>,
    yielded: usize,
    dropped: usize,
}

impl SourceAlbums {
    pub fn new(source: Box<dyn AlbumSource>, options: ScrapeOptions) -> Self {
        Self {
            source,
            options,
            pending: None,
            yielded: 0,
            dropped: 0,
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    async fn load(&mut self) -> Result<()> {
        log::info!("Scraping {} ({})", self.source.name(), self.source.url());
        let raw = self.source.fetch_raw(self.options.retries).await?;
        let releases = self.source.parse(&raw, self.options.today)?;
        log::debug!("{} listed {} releases", self.source.name(), releases.len());
        self.pending = Some(releases.into());
        Ok(())
    }
}

#[async_trait(?Send)]
impl AsyncAlbumIterator for SourceAlbums {
    async fn next(&mut self) -> Result<Option<Album>> {
        if self.pending.is_none() {
            self.load().await?;
        }

        let ScrapeOptions { filter, today, .. } = self.options;
        let Some(pending) = self.pending.as_mut() else {
            return Ok(None);
        };

        while let Some(release) = pending.pop_front() {
            if filter.accepts(release.rating, release.release_date, today) {
                self.yielded += 1;
                return Ok(Some(Album::from_release(release, self.source.name())));
            }
            self.dropped += 1;
            log::debug!(
                "Dropping '{}' by '{}' (rating {}, released {})",
                release.title,
                release.artist,
                release.rating,
                release.release_date
            );
        }

        if self.yielded + self.dropped > 0 {
            log::info!(
                "{}: {} albums kept, {} filtered out",
                self.source.name(),
                self.yielded,
                self.dropped
            );
            self.yielded = 0;
            self.dropped = 0;
        }
        Ok(None)
    }
}

/// Source variants that can be enabled from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Metacritic,
    DetailedMetacritic,
    Pitchfork,
}

impl SourceKind {
    pub fn build(self, fetcher: PageFetcher) -> Box<dyn AlbumSource> {
        match self {
            SourceKind::Metacritic => Box::new(MetacriticSource::new(fetcher)),
            SourceKind::DetailedMetacritic => Box::new(DetailedMetacriticSource::new(fetcher)),
            SourceKind::Pitchfork => Box::new(PitchforkSource::new(fetcher)),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Metacritic => "metacritic",
            SourceKind::DetailedMetacritic => "detailed_metacritic",
            SourceKind::Pitchfork => "pitchfork",
        };
        f.write_str(name)
    }
}
