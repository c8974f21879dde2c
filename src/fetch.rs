use crate::headers::{add_page_headers, DEFAULT_USER_AGENT};
use crate::retry::{retry_on_rate_limit, RetryConfig};
use crate::{PlaylistError, Result};
use http_client::{HttpClient, Request, Response};
use http_types::{Method, Url};
use std::sync::Arc;

/// Read the `Retry-After` header as whole seconds.
pub fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .header("retry-after")
        .and_then(|h| h.get(0))
        .and_then(|v| v.as_str().trim().parse::<u64>().ok())
}

pub fn parse_url(url: &str) -> Result<Url> {
    url.parse::<Url>()
        .map_err(|e| PlaylistError::Http(format!("Invalid URL '{url}': {e}")))
}

/// Downloads listing pages for album sources.
///
/// Shared by every source in a run; cloning is cheap.
#[derive(Clone)]
pub struct PageFetcher {
    client: Arc<dyn HttpClient>,
    user_agent: String,
    retry: RetryConfig,
}

impl PageFetcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch `url`, retrying up to `retries` times on rate limit responses.
    ///
    /// A 403 fails immediately with [`PlaylistError::Forbidden`]; any other
    /// non-success status fails with [`PlaylistError::Upstream`].
    pub async fn fetch(&self, url: &str, retries: u32) -> Result<String> {
        let config = self.retry.with_max_retries(retries);
        let outcome = retry_on_rate_limit(config, url, || self.get_once(url)).await?;
        if outcome.attempts_made > 0 {
            log::info!(
                "Fetched {url} after {} retries ({}s waiting)",
                outcome.attempts_made,
                outcome.total_retry_time
            );
        }
        Ok(outcome.result)
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        let mut request = Request::new(Method::Get, parse_url(url)?);
        add_page_headers(&mut request, &self.user_agent);

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| PlaylistError::Http(e.to_string()))?;

        let status: u16 = response.status().into();
        log::debug!("GET {url} -> {status}");

        match status {
            429 => {
                let retry_after =
                    retry_after_secs(&response).unwrap_or(self.retry.default_retry_after);
                Err(PlaylistError::RateLimit { retry_after })
            }
            403 => Err(PlaylistError::Forbidden(format!(
                "{url} refused the request, try a different User-Agent"
            ))),
            200..=299 => response
                .body_string()
                .await
                .map_err(|e| PlaylistError::Http(e.to_string())),
            _ => {
                let message = response.body_string().await.unwrap_or_default();
                Err(PlaylistError::Upstream {
                    status,
                    message: truncate(&message, 200),
                })
            }
        }
    }
}

/// Shorten an upstream body for error messages.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("  short  ", 10), "short");
        assert_eq!(truncate("abcdefgh", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        assert!(parse_url("https://www.metacritic.com/browse").is_ok());
        assert!(matches!(parse_url("not a url"), Err(PlaylistError::Http(_))));
    }
}
