pub mod get_token;
pub mod scrape;
pub mod update_playlist;
pub mod utils;

use clap::Subcommand;
use critic_playlist::{AppConfig, Result};

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape the configured sources and store the album list
    ///
    /// Albums released in the recency window with a high enough score are
    /// collected from every source, deduplicated, and written to the
    /// configured blob store for a later `update-playlist`.
    ///
    /// Usage examples:
    /// # Scrape and store
    /// critic-playlist scrape
    ///
    /// # Print the JSON instead of storing it
    /// critic-playlist scrape --stdout
    Scrape {
        /// Print the album list as JSON instead of storing it
        #[arg(long)]
        stdout: bool,
    },

    /// Rebuild the playlist from the stored album list
    ///
    /// Requires SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and
    /// SPOTIFY_REFRESH_TOKEN, and a `playlist_id` in the configuration.
    UpdatePlaylist,

    /// Scrape and rebuild the playlist in one go, without touching storage
    Run,

    /// Obtain a Spotify refresh token through the authorization code flow
    ///
    /// Requires SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET. Prints a consent
    /// URL, reads back the URL the browser was redirected to, and prints the
    /// refresh token to use as SPOTIFY_REFRESH_TOKEN.
    GetToken,
}

pub async fn execute_command(command: Commands, config: &AppConfig) -> Result<()> {
    let today = utils::today();
    match command {
        Commands::Scrape { stdout } => scrape::handle_scrape_command(config, today, stdout).await,
        Commands::UpdatePlaylist => {
            update_playlist::handle_update_playlist_command(config, today).await
        }
        Commands::Run => {
            let albums = scrape::scrape_albums(config, today).await?;
            update_playlist::sync_playlist(config, &albums, today).await
        }
        Commands::GetToken => get_token::handle_get_token_command(config).await,
    }
}
