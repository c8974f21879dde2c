use crate::sync::SyncStage;
use thiserror::Error;

/// Error types for the scrape-and-sync pipeline.
///
/// Fetch-level errors (`RateLimitExceeded`, `Forbidden`, `Upstream`) and
/// `Parse` stay local to the source that produced them: the aggregator logs
/// them and moves on to the next source. `Playlist` errors always terminate
/// the run.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use critic_playlist::{PlaylistError, SyncStage};
///
/// fn report(err: &PlaylistError) {
///     match err {
///         PlaylistError::Playlist { stage, source } => {
///             eprintln!("playlist update failed while {stage}: {source}");
///         }
///         PlaylistError::RateLimitExceeded { operation, attempts } => {
///             eprintln!("{operation} still rate limited after {attempts} attempts");
///         }
///         other => eprintln!("{other}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// HTTP/network related errors.
    ///
    /// Connection failures, DNS errors, malformed URLs and unreadable bodies.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Markup or a date string did not have the expected shape.
    #[error("Failed to parse: {0}")]
    Parse(String),

    /// A single rate limit response.
    ///
    /// This is consumed by [`retry_on_rate_limit`](crate::retry::retry_on_rate_limit);
    /// callers only see it when retries are disabled.
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimit {
        /// Number of seconds to wait before retrying
        retry_after: u64,
    },

    /// Still rate limited after every retry was spent.
    #[error("Rate limit exceeded for {operation} after {attempts} attempts, try again later")]
    RateLimitExceeded { operation: String, attempts: u32 },

    /// The server refused the request outright.
    ///
    /// For scraped pages this usually means the declared User-Agent was
    /// recognised as a scraper; changing `user_agent` in the config helps.
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Any other non-success status.
    #[error("Upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Catalog credentials are missing or were rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A playlist mutation failed. Always fatal to the run.
    #[error("Playlist update failed while {stage}: {source}")]
    Playlist {
        stage: SyncStage,
        source: Box<PlaylistError>,
    },

    /// Every registered source failed, so there is nothing to publish.
    #[error("All album sources failed: {}", .0.join("; "))]
    AllSourcesFailed(Vec<String>),

    /// Blob storage upload or download failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaylistError {
    /// Wrap an error raised while mutating the playlist in the given stage.
    pub fn playlist(stage: SyncStage, source: PlaylistError) -> Self {
        PlaylistError::Playlist {
            stage,
            source: Box::new(source),
        }
    }

    /// The sync stage a playlist error was raised in, if any.
    pub fn stage(&self) -> Option<SyncStage> {
        match self {
            PlaylistError::Playlist { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
