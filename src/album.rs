use crate::dates::{format_stored_date, parse_stored_date};
use crate::{PlaylistError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest rating a source can report.
pub const MAX_RATING: u8 = 100;

/// A newly released album as reported by one source.
///
/// Two albums with the same title and artist are the same album, whatever
/// source, rating or date they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub title: String,
    pub artist: String,
    /// Name of the source that reported the album
    pub source: String,
    pub image_url: String,
    /// Critic score, 0-100. Unrated albums score 0.
    pub rating: u8,
    pub release_date: NaiveDate,
}

impl Album {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        source: impl Into<String>,
        image_url: impl Into<String>,
        rating: u8,
        release_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            source: source.into(),
            image_url: image_url.into(),
            rating: rating.min(MAX_RATING),
            release_date,
        }
    }

    /// Build an album from a parsed listing row.
    pub fn from_release(release: RawRelease, source: &str) -> Self {
        Self::new(
            release.title,
            release.artist,
            source,
            release.image_url,
            release.rating,
            release.release_date,
        )
    }

    /// Identity used for deduplication.
    pub fn key(&self) -> (&str, &str) {
        (&self.title, &self.artist)
    }

    /// Free-text query used to look the album up in the catalog.
    pub fn query(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// One row extracted from a listing page, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRelease {
    pub title: String,
    pub artist: String,
    pub rating: u8,
    pub release_date: NaiveDate,
    pub image_url: String,
}

/// Flat record written to blob storage between the scrape and sync steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAlbum {
    pub artist: String,
    /// Release date as "Mon DD YYYY"
    pub date: String,
    #[serde(default)]
    pub image: String,
    pub rating: u8,
    #[serde(default)]
    pub source: String,
    pub title: String,
}

impl From<&Album> for StoredAlbum {
    fn from(album: &Album) -> Self {
        Self {
            artist: album.artist.clone(),
            date: format_stored_date(album.release_date),
            image: album.image_url.clone(),
            rating: album.rating,
            source: album.source.clone(),
            title: album.title.clone(),
        }
    }
}

impl TryFrom<StoredAlbum> for Album {
    type Error = PlaylistError;

    fn try_from(stored: StoredAlbum) -> Result<Self> {
        let release_date = parse_stored_date(&stored.date)?;
        Ok(Album::new(
            stored.title,
            stored.artist,
            stored.source,
            stored.image,
            stored.rating,
            release_date,
        ))
    }
}

/// Serialise albums to the pretty-printed storage format.
pub fn albums_to_json(albums: &[Album]) -> Result<String> {
    let stored: Vec<StoredAlbum> = albums.iter().map(StoredAlbum::from).collect();
    Ok(serde_json::to_string_pretty(&stored)?)
}

/// Parse albums back out of the storage format.
pub fn albums_from_json(json: &str) -> Result<Vec<Album>> {
    let stored: Vec<StoredAlbum> = serde_json::from_str(json)?;
    stored.into_iter().map(Album::try_from).collect()
}
