//! Blob storage for scraped album lists.
//!
//! The scrape and playlist update steps can run separately; the album list
//! travels between them as a JSON blob in a local directory or an S3 bucket.

use crate::album::{albums_from_json, albums_to_json};
use crate::{Album, PlaylistError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Default object key for the album list.
pub const DEFAULT_ALBUMS_KEY: &str = "albums.json";

#[async_trait(?Send)]
pub trait BlobStore {
    async fn upload(&self, key: &str, bytes: &[u8]) -> Result<()>;

    async fn download(&self, key: &str) -> Result<Vec<u8>>;

    /// Where a key lives, for log messages.
    fn describe(&self, key: &str) -> String;
}

/// Blobs stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait(?Send)]
impl BlobStore for FileBlobStore {
    async fn upload(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path(key);
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                PlaylistError::Storage(format!("Nothing stored at {}", path.display()))
            }
            _ => PlaylistError::Io(e),
        })
    }

    fn describe(&self, key: &str) -> String {
        self.path(key).display().to_string()
    }
}

#[cfg(feature = "s3")]
pub use s3::S3BlobStore;

#[cfg(feature = "s3")]
mod s3 {
    use super::BlobStore;
    use crate::{PlaylistError, Result};
    use async_trait::async_trait;
    use aws_config::BehaviorVersion;
    use aws_sdk_s3::config::Region;
    use aws_sdk_s3::Client;

    /// Blobs stored as objects in one S3 bucket.
    pub struct S3BlobStore {
        client: Client,
        bucket: String,
    }

    impl S3BlobStore {
        pub fn new(client: Client, bucket: impl Into<String>) -> Self {
            Self {
                client,
                bucket: bucket.into(),
            }
        }

        /// Build a client from the standard AWS environment and profile chain.
        pub async fn from_env(bucket: impl Into<String>, region: Option<String>) -> Self {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region));
            }
            let config = loader.load().await;
            Self::new(Client::new(&config), bucket)
        }
    }

    #[async_trait(?Send)]
    impl BlobStore for S3BlobStore {
        async fn upload(&self, key: &str, bytes: &[u8]) -> Result<()> {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(bytes.to_vec().into())
                .content_type("application/json")
                .send()
                .await
                .map_err(|e| PlaylistError::Storage(format!("Upload to {} failed: {e}", self.describe(key))))?;
            Ok(())
        }

        async fn download(&self, key: &str) -> Result<Vec<u8>> {
            let object = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    PlaylistError::Storage(format!("Download of {} failed: {e}", self.describe(key)))
                })?;
            let data = object
                .body
                .collect()
                .await
                .map_err(|e| PlaylistError::Storage(format!("Reading {} failed: {e}", self.describe(key))))?;
            Ok(data.into_bytes().to_vec())
        }

        fn describe(&self, key: &str) -> String {
            format!("s3://{}/{}", self.bucket, key)
        }
    }
}

/// Serialise albums and upload them under `key`.
pub async fn save_albums(store: &dyn BlobStore, key: &str, albums: &[Album]) -> Result<()> {
    let json = albums_to_json(albums)?;
    store.upload(key, json.as_bytes()).await?;
    log::info!("Saved {} albums to {}", albums.len(), store.describe(key));
    Ok(())
}

/// Download and parse the album list stored under `key`.
pub async fn load_albums(store: &dyn BlobStore, key: &str) -> Result<Vec<Album>> {
    let bytes = store.download(key).await?;
    let text = String::from_utf8(bytes)
        .map_err(|e| PlaylistError::Storage(format!("{} is not UTF-8: {e}", store.describe(key))))?;
    let albums = albums_from_json(&text)?;
    log::info!("Loaded {} albums from {}", albums.len(), store.describe(key));
    Ok(albums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path().join("nested"));
        let albums = vec![Album::new(
            "Punisher",
            "Phoebe Bridgers",
            "Metacritic",
            "https://img.test/punisher.jpg",
            92,
            NaiveDate::from_ymd_opt(2020, 6, 18).unwrap(),
        )];

        save_albums(&store, DEFAULT_ALBUMS_KEY, &albums).await.unwrap();
        let loaded = load_albums(&store, DEFAULT_ALBUMS_KEY).await.unwrap();
        assert_eq!(loaded, albums);
    }

    #[tokio::test]
    async fn test_missing_blob_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path());
        let result = load_albums(&store, "absent.json").await;
        assert!(matches!(result, Err(PlaylistError::Storage(_))));
    }
}
