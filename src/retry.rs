use crate::{PlaylistError, Result};
use std::future::Future;
use std::time::Duration;

/// Configuration for rate limit retries
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay used when the server does not say how long to wait (in seconds)
    pub default_retry_after: u64,
    /// Maximum delay cap (in seconds)
    pub max_delay: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            default_retry_after: 5,
            max_delay: 300, // 5 minutes
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Result of a retry operation with context
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub result: T,
    /// Number of retry attempts made
    pub attempts_made: u32,
    /// Total time spent waiting (in seconds)
    pub total_retry_time: u64,
}

/// Run `operation`, sleeping and retrying whenever it reports
/// [`PlaylistError::RateLimit`].
///
/// The wait is the server-specified `retry_after` capped at `max_delay`. Once
/// `max_retries` retries are spent the error becomes
/// [`PlaylistError::RateLimitExceeded`]. Any other error is returned as is.
/// The sleep blocks the calling task and cannot be interrupted.
pub async fn retry_on_rate_limit<T, F, Fut>(
    config: RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<RetryResult<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries = 0;
    let mut total_retry_time = 0;

    loop {
        match operation().await {
            Ok(result) => {
                return Ok(RetryResult {
                    result,
                    attempts_made: retries,
                    total_retry_time,
                });
            }
            Err(PlaylistError::RateLimit { retry_after }) => {
                if retries >= config.max_retries {
                    log::warn!(
                        "Max retries ({}) exceeded for {} operation",
                        config.max_retries,
                        operation_name
                    );
                    return Err(PlaylistError::RateLimitExceeded {
                        operation: operation_name.to_string(),
                        attempts: retries + 1,
                    });
                }

                let delay = retry_after.min(config.max_delay);
                log::info!(
                    "{} rate limited. Waiting {} seconds before retry {} of {}",
                    operation_name,
                    delay,
                    retries + 1,
                    config.max_retries
                );

                tokio::time::sleep(Duration::from_secs(delay)).await;
                retries += 1;
                total_retry_time += delay;
            }
            Err(other_error) => return Err(other_error),
        }
    }
}
