mod commands;

use clap::Parser;
use commands::{execute_command, Commands};
use critic_playlist::AppConfig;
use std::path::PathBuf;

/// Playlist of the week's best-reviewed new albums
#[derive(Parser)]
#[command(
    name = "critic-playlist",
    about = "Scrape new album reviews and sync them into a Spotify playlist",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Config file (defaults to <config dir>/critic-playlist/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Playlist errors name the failing stage in their message
    if let Err(e) = execute_command(args.command, &config).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }
}
