use super::utils::http_client;
use critic_playlist::catalog::extract_code;
use critic_playlist::{AppConfig, AuthorizationFlow, Result};
use std::io::{self, Write};

/// Run the authorization code flow and print the refresh token.
pub async fn handle_get_token_command(config: &AppConfig) -> Result<()> {
    let flow = AuthorizationFlow::from_env(http_client())?
        .with_endpoints(&config.spotify.authorize_url, &config.spotify.auth_url)
        .with_redirect_uri(&config.spotify.redirect_uri);

    println!("🔑 Open this page and approve access to your playlists:");
    println!();
    println!("  {}", flow.authorize_url());
    println!();
    eprint!("Paste the URL you were redirected to: ");
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let code = extract_code(&input)?;

    let grant = flow.exchange_code(&code).await?;
    log::debug!("Granted scopes: {}", grant.scope);
    println!("✅ Refresh token (export as SPOTIFY_REFRESH_TOKEN):");
    println!("{}", grant.refresh_token);
    Ok(())
}
