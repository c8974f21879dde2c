use chrono::{Local, NaiveDate};
use critic_playlist::config::StorageBackend;
use critic_playlist::{
    AppConfig, BlobStore, FileBlobStore, PageFetcher, PlaylistError, Result, SpotifyClient,
    SpotifyCredentials,
};
use http_client::HttpClient;
use std::sync::Arc;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn http_client() -> Arc<dyn HttpClient> {
    Arc::new(http_client::native::NativeClient::new())
}

pub fn page_fetcher(config: &AppConfig, client: Arc<dyn HttpClient>) -> PageFetcher {
    PageFetcher::new(client)
        .with_user_agent(config.user_agent.clone())
        .with_retry_config(config.retry_config())
}

/// Spotify client for the configured playlist, credentials from the environment.
pub fn spotify_client(config: &AppConfig, client: Arc<dyn HttpClient>) -> Result<SpotifyClient> {
    let playlist_id = config.playlist_id.clone().ok_or_else(|| {
        PlaylistError::Config(config::ConfigError::NotFound("playlist_id".to_string()))
    })?;
    let credentials = SpotifyCredentials::from_env()?;
    Ok(SpotifyClient::new(client, credentials, playlist_id)
        .with_endpoints(&config.spotify.api_base, &config.spotify.auth_url)
        .with_retry_config(config.retry_config()))
}

pub async fn open_store(config: &AppConfig) -> Result<Box<dyn BlobStore>> {
    match config.storage.backend {
        StorageBackend::File => Ok(Box::new(FileBlobStore::new(&config.storage.path))),
        StorageBackend::S3 => open_s3_store(config).await,
    }
}

#[cfg(feature = "s3")]
async fn open_s3_store(config: &AppConfig) -> Result<Box<dyn BlobStore>> {
    let bucket = config.storage.bucket.clone().ok_or_else(|| {
        PlaylistError::Storage("storage.bucket is required for the s3 backend".to_string())
    })?;
    let store =
        critic_playlist::storage::S3BlobStore::from_env(bucket, config.storage.region.clone())
            .await;
    Ok(Box::new(store))
}

#[cfg(not(feature = "s3"))]
async fn open_s3_store(_config: &AppConfig) -> Result<Box<dyn BlobStore>> {
    Err(PlaylistError::Storage(
        "this build has no S3 support, rebuild with --features s3".to_string(),
    ))
}
