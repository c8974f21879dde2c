use crate::catalog::{
    DEFAULT_MATCH_THRESHOLD, DEFAULT_REDIRECT_URI, SPOTIFY_API_BASE, SPOTIFY_AUTHORIZE_URL,
    SPOTIFY_AUTH_URL,
};
use crate::filter::ReleaseFilter;
use crate::headers::DEFAULT_USER_AGENT;
use crate::retry::RetryConfig;
use crate::sources::SourceKind;
use crate::storage::DEFAULT_ALBUMS_KEY;
use crate::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "critic-playlist";

/// Prefix for environment overrides, e.g. `CRITIC_PLAYLIST__FILTER__MIN_RATING=85`.
pub const ENV_PREFIX: &str = "CRITIC_PLAYLIST";

/// `<config dir>/critic-playlist/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// `<data dir>/critic-playlist`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    S3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the file backend
    pub path: PathBuf,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: default_data_dir(),
            bucket: None,
            region: None,
            key: DEFAULT_ALBUMS_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub api_base: String,
    pub auth_url: String,
    /// Consent page for `get-token`
    pub authorize_url: String,
    /// Redirect URI registered for the Spotify application
    pub redirect_uri: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            api_base: SPOTIFY_API_BASE.to_string(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            authorize_url: SPOTIFY_AUTHORIZE_URL.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }
}

/// Settings for a run.
///
/// Layered from built-in defaults, then an optional TOML file, then
/// `CRITIC_PLAYLIST__*` environment variables (nested keys joined by `__`).
/// Catalog credentials are not part of the file; see
/// [`SpotifyCredentials::from_env`](crate::catalog::SpotifyCredentials::from_env).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target playlist id
    pub playlist_id: Option<String>,
    pub user_agent: String,
    /// Rate limit retries per request
    pub retries: u32,
    /// Wait used when a 429 carries no Retry-After (seconds)
    pub default_retry_after_secs: u64,
    pub filter: ReleaseFilter,
    pub match_threshold: u8,
    /// Sources in scrape order
    pub sources: Vec<SourceKind>,
    pub storage: StorageConfig,
    pub spotify: SpotifyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playlist_id: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retries: 3,
            default_retry_after_secs: 5,
            filter: ReleaseFilter::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            sources: vec![SourceKind::Metacritic, SourceKind::Pitchfork],
            storage: StorageConfig::default(),
            spotify: SpotifyConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the layered configuration.
    ///
    /// An explicit `path` must exist; the default location is used only when
    /// present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Some((path.to_path_buf(), true)),
            None => default_config_path().map(|p| (p, false)),
        };
        Self::load_from(file, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(file: Option<(PathBuf, bool)>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);
        if let Some((path, required)) = file {
            log::debug!("Reading config from {}", path.display());
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }
        let config = builder
            .add_source(
                env.prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("sources"),
            )
            .build()?;
        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.filter.window_days < 0 {
            return Err(config::ConfigError::Message(format!(
                "filter.window_days must not be negative, got {}",
                self.filter.window_days
            ))
            .into());
        }
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.retries,
            default_retry_after: self.default_retry_after_secs,
            ..RetryConfig::default()
        }
    }
}
