//! The streaming catalog: album search, track listings and the target
//! playlist.

mod authorize;
mod matcher;
mod spotify;

pub use authorize::{
    extract_code, AuthorizationFlow, TokenGrant, DEFAULT_REDIRECT_URI, PLAYLIST_SCOPES,
    SPOTIFY_AUTHORIZE_URL,
};
pub use matcher::{CatalogMatch, CatalogMatcher, DEFAULT_MATCH_THRESHOLD};
pub use spotify::{SpotifyClient, SpotifyCredentials, SPOTIFY_API_BASE, SPOTIFY_AUTH_URL};

use crate::Result;
use async_trait::async_trait;
use std::fmt;

/// An album returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub artist: String,
    pub title: String,
    pub external_id: String,
}

impl CatalogEntry {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            external_id: external_id.into(),
        }
    }

    /// Text compared against the search query: "{title} {artist}".
    pub fn match_text(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} [{}]", self.artist, self.title, self.external_id)
    }
}

/// A track on a catalog album or in the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub artist: String,
    pub title: String,
    pub external_id: String,
}

impl CatalogTrack {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            external_id: external_id.into(),
        }
    }

    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.external_id)
    }
}

/// Catalog operations the playlist sync depends on.
///
/// Authentication is the implementation's concern; a client that cannot
/// obtain credentials fails every call with
/// [`PlaylistError::Auth`](crate::PlaylistError::Auth).
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockCatalogClient`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait CatalogClient {
    /// Search albums by free text. Results are capped at the API's page size.
    async fn search_albums(&self, query: &str) -> Result<Vec<CatalogEntry>>;

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<CatalogTrack>>;

    /// Tracks currently in the target playlist.
    async fn playlist_tracks(&self) -> Result<Vec<CatalogTrack>>;

    async fn remove_tracks(&self, tracks: &[CatalogTrack]) -> Result<()>;

    /// Append tracks to the target playlist, keeping their order.
    async fn add_tracks(&self, tracks: &[CatalogTrack]) -> Result<()>;

    async fn set_description(&self, description: &str) -> Result<()>;

    /// Remove every track from the target playlist and return what was removed.
    async fn clear_playlist(&self) -> Result<Vec<CatalogTrack>> {
        let tracks = self.playlist_tracks().await?;
        if !tracks.is_empty() {
            self.remove_tracks(&tracks).await?;
        }
        log::info!("Cleared {} tracks from the playlist", tracks.len());
        Ok(tracks)
    }
}
