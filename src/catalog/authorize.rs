use super::spotify::{basic_auth, credential_var, SPOTIFY_AUTH_URL};
use crate::fetch::{parse_url, truncate};
use crate::headers::add_token_headers;
use crate::{PlaylistError, Result};

use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::Deserialize;
use std::sync::Arc;

pub const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";

/// Must be registered as a redirect URI of the Spotify application.
pub const DEFAULT_REDIRECT_URI: &str = "http://example.com";

/// Scopes needed to read, clear and refill the playlist.
pub const PLAYLIST_SCOPES: &[&str] = &[
    "playlist-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
];

/// Tokens returned for an authorization code.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
}

/// One-off authorization code flow that yields the refresh token
/// [`SpotifyClient`](super::SpotifyClient) runs on.
///
/// The user opens [`authorize_url`](Self::authorize_url), approves access and
/// is sent to the redirect URI with a `code` query parameter, which
/// [`exchange_code`](Self::exchange_code) trades for tokens.
pub struct AuthorizationFlow {
    client: Arc<dyn HttpClient>,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_url: String,
    token_url: String,
}

impl AuthorizationFlow {
    pub fn new(
        client: Arc<dyn HttpClient>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            authorize_url: SPOTIFY_AUTHORIZE_URL.to_string(),
            token_url: SPOTIFY_AUTH_URL.to_string(),
        }
    }

    /// Application credentials from `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET`.
    pub fn from_env(client: Arc<dyn HttpClient>) -> Result<Self> {
        Ok(Self::new(
            client,
            credential_var("SPOTIFY_CLIENT_ID")?,
            credential_var("SPOTIFY_CLIENT_SECRET")?,
        ))
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_endpoints(
        mut self,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.authorize_url = authorize_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Page where the user grants the playlist scopes.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}",
            self.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&PLAYLIST_SCOPES.join(" ")),
        )
    }

    /// Trade an authorization code for an access and refresh token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let mut request = Request::new(Method::Post, parse_url(&self.token_url)?);
        add_token_headers(&mut request, &basic_auth(&self.client_id, &self.client_secret));
        request.set_body(format!(
            "grant_type=authorization_code&code={}&redirect_uri={}",
            urlencoding::encode(code),
            urlencoding::encode(&self.redirect_uri)
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
                "Authorization code was rejected ({status}): {}",
                truncate(&body, 200)
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull the authorization code out of a pasted redirect URL.
///
/// Input that is not a URL is taken as the bare code.
pub fn extract_code(input: &str) -> Result<String> {
    let input = input.trim();
    let Ok(url) = Url::parse(input) else {
        if input.is_empty() {
            return Err(PlaylistError::Auth("No authorization code given".to_string()));
        }
        return Ok(input.to_string());
    };

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => {
                return Err(PlaylistError::Auth(format!("Authorization was denied: {value}")))
            }
            _ => {}
        }
    }
    code.filter(|c| !c.is_empty())
        .ok_or_else(|| PlaylistError::Auth(format!("No code parameter in '{input}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedHttpClient, ScriptedResponse};

    fn flow(client: &Arc<ScriptedHttpClient>) -> AuthorizationFlow {
        AuthorizationFlow::new(client.clone(), "id", "secret")
            .with_endpoints("https://auth.test/authorize", "https://auth.test/api/token")
    }

    #[test]
    fn test_authorize_url_requests_playlist_scopes() {
        let client = Arc::new(ScriptedHttpClient::new());
        let url = flow(&client).authorize_url();

        assert_eq!(
            url,
            "https://auth.test/authorize?client_id=id&response_type=code\
             &redirect_uri=http%3A%2F%2Fexample.com\
             &scope=playlist-read-private%20playlist-modify-public%20playlist-modify-private"
        );
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(
            extract_code("http://example.com/?code=AQB-x_1&state=s\n").unwrap(),
            "AQB-x_1"
        );
        assert_eq!(extract_code("  AQB-x_1 ").unwrap(), "AQB-x_1");
        assert!(matches!(
            extract_code("http://example.com/?error=access_denied"),
            Err(PlaylistError::Auth(_))
        ));
        assert!(extract_code("http://example.com/").is_err());
        assert!(extract_code("").is_err());
    }

    #[tokio::test]
    async fn test_code_is_exchanged_for_tokens() {
        let client = Arc::new(ScriptedHttpClient::with_responses([ScriptedResponse::ok(
            r#"{"access_token": "acc", "token_type": "Bearer", "expires_in": 3600,
                "refresh_token": "ref-1", "scope": "playlist-modify-public"}"#,
        )]));
        let grant = flow(&client)
            .with_redirect_uri("http://localhost:8888/callback")
            .exchange_code("AQB/1")
            .await
            .unwrap();

        assert_eq!(grant.refresh_token, "ref-1");
        assert_eq!(grant.access_token, "acc");
        assert_eq!(grant.expires_in, 3600);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "https://auth.test/api/token");
        assert_eq!(requests[0].header("authorization"), Some("Basic aWQ6c2VjcmV0"));
        assert_eq!(
            requests[0].body,
            "grant_type=authorization_code&code=AQB%2F1\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8888%2Fcallback"
        );
    }

    #[tokio::test]
    async fn test_rejected_code_is_an_auth_error() {
        let client = Arc::new(ScriptedHttpClient::with_responses([ScriptedResponse::status(
            400,
            r#"{"error": "invalid_grant", "error_description": "Invalid authorization code"}"#,
        )]));
        match flow(&client).exchange_code("stale").await {
            Err(PlaylistError::Auth(message)) => assert!(message.contains("invalid_grant")),
            other => panic!("expected Auth, got {other:?}"),
        }
    }
}
