use crate::catalog::{CatalogClient, CatalogEntry, CatalogMatcher, DEFAULT_MATCH_THRESHOLD};
use crate::dates::format_stored_date;
use crate::filter::ReleaseFilter;
use crate::{Album, PlaylistError, Result};
use chrono::NaiveDate;
use std::fmt;

/// Stage of a playlist sync, reported when a playlist mutation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Clearing,
    Matching,
    Describing,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Clearing => "clearing",
            SyncStage::Matching => "matching",
            SyncStage::Describing => "describing",
        };
        f.write_str(name)
    }
}

/// An album that made it into the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedAlbum {
    pub album: Album,
    pub entry: CatalogEntry,
    pub score: u8,
    pub tracks_added: usize,
}

/// What a sync run did.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Tracks removed while clearing
    pub cleared: usize,
    pub added: Vec<MatchedAlbum>,
    /// Albums with no acceptable catalog match
    pub unmatched: Vec<Album>,
    /// Albums whose lookup failed, with the error message
    pub failed: Vec<(Album, String)>,
    pub description: String,
}

impl SyncReport {
    pub fn tracks_added(&self) -> usize {
        self.added.iter().map(|m| m.tracks_added).sum()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cleared {} tracks, added {} albums ({} tracks), {} unmatched, {} failed",
            self.cleared,
            self.added.len(),
            self.tracks_added(),
            self.unmatched.len(),
            self.failed.len()
        )
    }
}

/// Playlist description recording the run's thresholds, sources and date.
pub fn describe(filter: &ReleaseFilter, sources: &[&str], completed: NaiveDate) -> String {
    let sources = match sources {
        [] => "no sources".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    };
    format!(
        "(Updated {}). Albums from {} released in the last {} days with a critic score of at least {}.",
        format_stored_date(completed),
        sources,
        filter.window_days,
        filter.min_rating
    )
}

/// Rebuilds the target playlist from a list of albums.
///
/// Runs Clearing, then Matching for each album in order, then Describing.
/// Any failure to change the playlist aborts the run with
/// [`PlaylistError::Playlist`] naming the stage. A failed search or track
/// lookup for one album is logged and recorded in the report; the run
/// carries on with the next album.
pub struct PlaylistSync<'a> {
    client: &'a dyn CatalogClient,
    filter: ReleaseFilter,
    match_threshold: u8,
}

impl<'a> PlaylistSync<'a> {
    pub fn new(client: &'a dyn CatalogClient) -> Self {
        Self {
            client,
            filter: ReleaseFilter::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    /// Thresholds quoted in the description.
    pub fn with_filter(mut self, filter: ReleaseFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_match_threshold(mut self, threshold: u8) -> Self {
        self.match_threshold = threshold;
        self
    }

    pub async fn run(&self, albums: &[Album], today: NaiveDate) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        log::info!("Clearing playlist");
        let cleared = self
            .client
            .clear_playlist()
            .await
            .map_err(|e| PlaylistError::playlist(SyncStage::Clearing, e))?;
        report.cleared = cleared.len();

        let matcher = CatalogMatcher::new(self.client).with_threshold(self.match_threshold);
        log::info!(
            "Matching {} albums (score above {})",
            albums.len(),
            matcher.threshold()
        );
        for album in albums {
            let query = album.query();
            log::debug!("Searching for: {query}");

            let found = match matcher.find(&query).await {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("Lookup failed for {album}: {e}");
                    report.failed.push((album.clone(), e.to_string()));
                    continue;
                }
            };
            let Some(matched) = found else {
                log::info!("No match for {album}");
                report.unmatched.push(album.clone());
                continue;
            };

            self.client
                .add_tracks(&matched.tracks)
                .await
                .map_err(|e| PlaylistError::playlist(SyncStage::Matching, e))?;
            log::info!(
                "Added {} tracks from {} ({})",
                matched.tracks.len(),
                matched.entry,
                matched.score
            );
            report.added.push(MatchedAlbum {
                album: album.clone(),
                entry: matched.entry,
                score: matched.score,
                tracks_added: matched.tracks.len(),
            });
        }

        let mut sources: Vec<&str> = Vec::new();
        for album in albums {
            if !sources.contains(&album.source.as_str()) {
                sources.push(&album.source);
            }
        }
        report.description = describe(&self.filter, &sources, today);

        log::info!("Updating playlist description");
        self.client
            .set_description(&report.description)
            .await
            .map_err(|e| PlaylistError::playlist(SyncStage::Describing, e))?;

        log::info!("Playlist sync finished: {report}");
        Ok(report)
    }
}
