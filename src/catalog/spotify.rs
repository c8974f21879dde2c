use super::{CatalogClient, CatalogEntry, CatalogTrack};
use crate::fetch::{parse_url, retry_after_secs, truncate};
use crate::headers::{add_api_headers, add_token_headers};
use crate::retry::{retry_on_rate_limit, RetryConfig};
use crate::{PlaylistError, Result};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use http_client::{HttpClient, Request};
use http_types::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/api/token";

/// Most track URIs the playlist endpoints accept per request.
const TRACKS_PER_REQUEST: usize = 100;

/// Refresh the access token when it has less than this long to live.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 10;

/// Application credentials and a user refresh token.
#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl SpotifyCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Read `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and
    /// `SPOTIFY_REFRESH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(
            credential_var("SPOTIFY_CLIENT_ID")?,
            credential_var("SPOTIFY_CLIENT_SECRET")?,
            credential_var("SPOTIFY_REFRESH_TOKEN")?,
        ))
    }

    fn basic_auth(&self) -> String {
        basic_auth(&self.client_id, &self.client_secret)
    }
}

/// Base64 `id:secret` for the token endpoint's Basic authorization.
pub(crate) fn basic_auth(client_id: &str, client_secret: &str) -> String {
    STANDARD.encode(format!("{client_id}:{client_secret}"))
}

/// Non-empty environment variable, or an auth error naming it.
pub(crate) fn credential_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PlaylistError::Auth(format!("{name} is not set")))
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    albums: Paging<AlbumObject>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    track: Option<TrackObject>,
}

fn first_artist(artists: &[ArtistObject]) -> String {
    artists.first().map(|a| a.name.clone()).unwrap_or_default()
}

impl From<AlbumObject> for CatalogEntry {
    fn from(album: AlbumObject) -> Self {
        // "spotify:album:<id>"
        let external_id = album.uri.rsplit(':').next().unwrap_or_default().to_string();
        CatalogEntry {
            artist: first_artist(&album.artists),
            title: album.name,
            external_id,
        }
    }
}

impl TrackObject {
    /// Local files in a playlist have no catalog id and are skipped.
    fn into_track(self) -> Option<CatalogTrack> {
        let id = self.id?;
        Some(CatalogTrack {
            artist: first_artist(&self.artists),
            title: self.name,
            external_id: id,
        })
    }
}

/// Spotify Web API client bound to one playlist.
///
/// Uses the refresh-token grant; the bearer token is cached and renewed
/// shortly before it expires. Rate limited calls are retried after the
/// server's `Retry-After` delay.
pub struct SpotifyClient {
    client: Arc<dyn HttpClient>,
    credentials: SpotifyCredentials,
    playlist_id: String,
    api_base: String,
    auth_url: String,
    retry: RetryConfig,
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyClient {
    pub fn new(
        client: Arc<dyn HttpClient>,
        credentials: SpotifyCredentials,
        playlist_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            playlist_id: playlist_id.into(),
            api_base: SPOTIFY_API_BASE.to_string(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            retry: RetryConfig::default(),
            token: Mutex::new(None),
        }
    }

    pub fn with_endpoints(mut self, api_base: impl Into<String>, auth_url: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.auth_url = auth_url.into();
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|t| t.is_fresh(Utc::now()))
            .map(|t| t.value.clone())
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        log::debug!("Refreshing Spotify access token");
        let mut request = Request::new(Method::Post, parse_url(&self.auth_url)?);
        add_token_headers(&mut request, &self.credentials.basic_auth());
        request.set_body(format!(
            "grant_type=refresh_token&refresh_token={}",
            urlencoding::encode(&self.credentials.refresh_token)
        ));

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| PlaylistError::Http(e.to_string()))?;
        let status: u16 = response.status().into();
        let body = response
            .body_string()
            .await
            .map_err(|e| PlaylistError::Http(e.to_string()))?;
        if status != 200 {
            return Err(PlaylistError::Auth(format!(
                "Unable to refresh access token ({status}): {}",
                truncate(&body, 200)
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        let token = AccessToken {
            value: parsed.access_token,
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        };
        let value = token.value.clone();
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token);
        Ok(value)
    }

    async fn call_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        expected: u16,
    ) -> Result<String> {
        let token = self.access_token().await?;
        let mut request = Request::new(method, parse_url(url)?);
        add_api_headers(&mut request, &token);
        if let Some(body) = body {
            request.set_body(body.to_string());
        }

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| PlaylistError::Http(e.to_string()))?;
        let status: u16 = response.status().into();
        log::debug!("{method} {url} -> {status}");

        if status == 429 {
            let retry_after = retry_after_secs(&response).unwrap_or(self.retry.default_retry_after);
            return Err(PlaylistError::RateLimit { retry_after });
        }

        let text = response
            .body_string()
            .await
            .map_err(|e| PlaylistError::Http(e.to_string()))?;
        match status {
            s if s == expected => Ok(text),
            401 => {
                self.token.lock().unwrap_or_else(|e| e.into_inner()).take();
                Err(PlaylistError::Auth(truncate(&text, 200)))
            }
            403 => Err(PlaylistError::Forbidden(truncate(&text, 200))),
            _ => Err(PlaylistError::Upstream {
                status,
                message: truncate(&text, 200),
            }),
        }
    }

    async fn call(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        body: Option<String>,
        expected: u16,
    ) -> Result<String> {
        let outcome = retry_on_rate_limit(self.retry, operation, || {
            self.call_once(method, url, body.as_deref(), expected)
        })
        .await?;
        Ok(outcome.result)
    }

    /// Follow `next` links until the listing is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        operation: &str,
        first_url: String,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first_url);
        while let Some(url) = next {
            let body = self.call(operation, Method::Get, &url, None, 200).await?;
            let page: Paging<T> = serde_json::from_str(&body)?;
            items.extend(page.items);
            next = page.next;
        }
        Ok(items)
    }

    fn playlist_tracks_url(&self) -> String {
        format!("{}/playlists/{}/tracks", self.api_base, self.playlist_id)
    }
}

#[async_trait(?Send)]
impl CatalogClient for SpotifyClient {
    async fn search_albums(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        let url = format!(
            "{}/search?q=album:{}&type=album",
            self.api_base,
            urlencoding::encode(query)
        );
        let body = self.call("search", Method::Get, &url, None, 200).await?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        Ok(response.albums.items.into_iter().map(CatalogEntry::from).collect())
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<CatalogTrack>> {
        let url = format!("{}/albums/{}/tracks?limit=50", self.api_base, album_id);
        let tracks: Vec<TrackObject> = self.get_all("album tracks", url).await?;
        Ok(tracks.into_iter().filter_map(TrackObject::into_track).collect())
    }

    async fn playlist_tracks(&self) -> Result<Vec<CatalogTrack>> {
        let url = format!(
            "{}?limit=100&fields=items(track(name,id,artists(name))),next",
            self.playlist_tracks_url()
        );
        let items: Vec<PlaylistItem> = self.get_all("playlist tracks", url).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.track.and_then(TrackObject::into_track))
            .collect())
    }

    async fn remove_tracks(&self, tracks: &[CatalogTrack]) -> Result<()> {
        let url = self.playlist_tracks_url();
        for chunk in tracks.chunks(TRACKS_PER_REQUEST) {
            let uris: Vec<_> = chunk.iter().map(|t| json!({ "uri": t.uri() })).collect();
            let body = json!({ "tracks": uris }).to_string();
            self.call("remove tracks", Method::Delete, &url, Some(body), 200)
                .await?;
        }
        Ok(())
    }

    async fn add_tracks(&self, tracks: &[CatalogTrack]) -> Result<()> {
        let url = self.playlist_tracks_url();
        for chunk in tracks.chunks(TRACKS_PER_REQUEST) {
            let uris: Vec<_> = chunk.iter().map(CatalogTrack::uri).collect();
            let body = json!({ "uris": uris }).to_string();
            self.call("add tracks", Method::Post, &url, Some(body), 201)
                .await?;
        }
        Ok(())
    }

    async fn set_description(&self, description: &str) -> Result<()> {
        let url = format!("{}/playlists/{}", self.api_base, self.playlist_id);
        let body = json!({ "description": description }).to_string();
        self.call("set description", Method::Put, &url, Some(body), 200)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_comes_from_uri() {
        let album: AlbumObject = serde_json::from_str(
            r#"{"name": "Blue Rev", "uri": "spotify:album:4mD2d", "artists": [{"name": "Alvvays"}, {"name": "Guest"}]}"#,
        )
        .unwrap();
        let entry = CatalogEntry::from(album);
        assert_eq!(entry, CatalogEntry::new("Alvvays", "Blue Rev", "4mD2d"));
    }

    #[test]
    fn test_local_tracks_are_dropped() {
        let track: TrackObject =
            serde_json::from_str(r#"{"id": null, "name": "demo.mp3", "artists": []}"#).unwrap();
        assert!(track.into_track().is_none());
    }

    #[test]
    fn test_token_freshness_margin() {
        let now = Utc::now();
        let token = |secs| AccessToken {
            value: "t".to_string(),
            expires_at: now + Duration::seconds(secs),
        };
        assert!(token(3600).is_fresh(now));
        assert!(!token(10).is_fresh(now));
        assert!(!token(-5).is_fresh(now));
    }

    #[test]
    fn test_basic_auth_encoding() {
        let credentials = SpotifyCredentials::new("id", "secret", "refresh");
        assert_eq!(credentials.basic_auth(), "aWQ6c2VjcmV0");
    }
}
