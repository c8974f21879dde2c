use super::utils::{http_client, open_store, page_fetcher};
use chrono::NaiveDate;
use critic_playlist::album::albums_to_json;
use critic_playlist::{
    deduplicate_stream, save_albums, Aggregator, Album, AppConfig, Result, ScrapeOptions,
};

/// Scrape every configured source and deduplicate the result.
pub async fn scrape_albums(config: &AppConfig, today: NaiveDate) -> Result<Vec<Album>> {
    let fetcher = page_fetcher(config, http_client());
    let mut aggregator = Aggregator::new();
    for kind in &config.sources {
        log::debug!("Registering source {kind}");
        aggregator.register_source(kind.build(fetcher.clone()));
    }
    if aggregator.is_empty() {
        println!("No sources configured");
        return Ok(Vec::new());
    }
    println!("🔎 Scraping {} sources", aggregator.len());

    let options = ScrapeOptions::new(today)
        .with_filter(config.filter)
        .with_retries(config.retries);
    let mut albums = aggregator.aggregate(options);
    let unique = deduplicate_stream(&mut albums).await?;

    for failure in albums.failures() {
        println!("⚠️  Skipped {}: {}", failure.source, failure.error);
    }
    Ok(unique)
}

pub async fn handle_scrape_command(config: &AppConfig, today: NaiveDate, stdout: bool) -> Result<()> {
    let albums = scrape_albums(config, today).await?;

    if stdout {
        println!("{}", albums_to_json(&albums)?);
        return Ok(());
    }

    if albums.is_empty() {
        println!("No albums passed the filter");
    }
    for album in &albums {
        println!("  {} ({}, {}, {})", album, album.rating, album.release_date, album.source);
    }

    let store = open_store(config).await?;
    save_albums(store.as_ref(), &config.storage.key, &albums).await?;
    println!(
        "✅ Stored {} albums at {}",
        albums.len(),
        store.describe(&config.storage.key)
    );
    Ok(())
}
