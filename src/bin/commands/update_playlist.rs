use super::utils::{http_client, open_store, spotify_client};
use chrono::NaiveDate;
use critic_playlist::{load_albums, Album, AppConfig, PlaylistSync, Result};

pub async fn sync_playlist(config: &AppConfig, albums: &[Album], today: NaiveDate) -> Result<()> {
    let client = spotify_client(config, http_client())?;
    let report = PlaylistSync::new(&client)
        .with_filter(config.filter)
        .with_match_threshold(config.match_threshold)
        .run(albums, today)
        .await?;

    for matched in &report.added {
        println!(
            "➕ {} -> {} ({} tracks, score {})",
            matched.album, matched.entry, matched.tracks_added, matched.score
        );
    }
    for album in &report.unmatched {
        println!("❔ No match for {album}");
    }
    for (album, error) in &report.failed {
        println!("⚠️  Lookup failed for {album}: {error}");
    }
    println!("✅ Playlist {} updated: {report}", client.playlist_id());
    Ok(())
}

pub async fn handle_update_playlist_command(config: &AppConfig, today: NaiveDate) -> Result<()> {
    let store = open_store(config).await?;
    let albums = load_albums(store.as_ref(), &config.storage.key).await?;
    sync_playlist(config, &albums, today).await
}
