#![allow(dead_code)]
use async_trait::async_trait;
use chrono::NaiveDate;
use critic_playlist::{Album, CatalogClient, CatalogEntry, CatalogTrack, PlaylistError, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn album(title: &str, artist: &str, source: &str) -> Album {
    Album::new(title, artist, source, "", 90, day(2020, 7, 24))
}

pub fn tracks(album_id: &str, artist: &str, count: usize) -> Vec<CatalogTrack> {
    (1..=count)
        .map(|n| CatalogTrack::new(artist, format!("Track {n}"), format!("{album_id}t{n}")))
        .collect()
}

/// Playlist operation that should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOn {
    PlaylistTracks,
    Remove,
    Add,
    Describe,
}

/// In-memory catalog with a single playlist.
#[derive(Default)]
pub struct FakeCatalog {
    search_results: HashMap<String, Vec<CatalogEntry>>,
    album_tracks: HashMap<String, Vec<CatalogTrack>>,
    failing_searches: HashSet<String>,
    fail_on: HashSet<FailOn>,
    pub playlist: RefCell<Vec<CatalogTrack>>,
    pub description: RefCell<Option<String>>,
    pub searches: RefCell<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an album reachable by `query`.
    pub fn with_album(mut self, query: &str, entry: CatalogEntry, track_count: usize) -> Self {
        let album_tracks = tracks(&entry.external_id, &entry.artist, track_count);
        self.album_tracks
            .insert(entry.external_id.clone(), album_tracks);
        self.search_results
            .entry(query.to_string())
            .or_default()
            .push(entry);
        self
    }

    pub fn with_failing_search(mut self, query: &str) -> Self {
        self.failing_searches.insert(query.to_string());
        self
    }

    pub fn with_playlist(self, tracks: Vec<CatalogTrack>) -> Self {
        *self.playlist.borrow_mut() = tracks;
        self
    }

    pub fn failing_on(mut self, op: FailOn) -> Self {
        self.fail_on.insert(op);
        self
    }

    fn check(&self, op: FailOn) -> Result<()> {
        if self.fail_on.contains(&op) {
            return Err(PlaylistError::Upstream {
                status: 502,
                message: format!("{op:?} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl CatalogClient for FakeCatalog {
    async fn search_albums(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        self.searches.borrow_mut().push(query.to_string());
        if self.failing_searches.contains(query) {
            return Err(PlaylistError::Http("connection reset".to_string()));
        }
        Ok(self.search_results.get(query).cloned().unwrap_or_default())
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<CatalogTrack>> {
        Ok(self.album_tracks.get(album_id).cloned().unwrap_or_default())
    }

    async fn playlist_tracks(&self) -> Result<Vec<CatalogTrack>> {
        self.check(FailOn::PlaylistTracks)?;
        Ok(self.playlist.borrow().clone())
    }

    async fn remove_tracks(&self, tracks: &[CatalogTrack]) -> Result<()> {
        self.check(FailOn::Remove)?;
        self.playlist.borrow_mut().retain(|t| !tracks.contains(t));
        Ok(())
    }

    async fn add_tracks(&self, tracks: &[CatalogTrack]) -> Result<()> {
        self.check(FailOn::Add)?;
        self.playlist.borrow_mut().extend_from_slice(tracks);
        Ok(())
    }

    async fn set_description(&self, description: &str) -> Result<()> {
        self.check(FailOn::Describe)?;
        *self.description.borrow_mut() = Some(description.to_string());
        Ok(())
    }
}
