mod common;

use common::day;
use critic_playlist::album::{albums_from_json, albums_to_json};
use critic_playlist::sources::{MetacriticSource, PitchforkSource, METACRITIC_URL};
use critic_playlist::testing::{ScriptedHttpClient, ScriptedResponse};
use critic_playlist::{
    deduplicate_stream, Aggregator, AlbumSource, AsyncAlbumIterator, PageFetcher, PlaylistError,
    ScrapeOptions,
};
use std::sync::Arc;

fn metacritic_row(score: &str, title: &str, date: &str, artist: &str) -> String {
    format!(
        r#"<div class="product_wrap">
             <img src="https://static.metacritic.com/{title}.jpg">
             <div class="metascore_w">{score}</div>
             <div class="product_title"><a>{title}</a></div>
             <li class="release_date"><span>Release Date:</span> <span>{date}</span></li>
             <li class="product_artist"><span class="data">{artist}</span></li>
           </div>"#
    )
}

fn metacritic_page() -> String {
    let rows = [
        metacritic_row("88", "Folklore", "Jul 24", "Taylor Swift"),
        metacritic_row("91", "Shore", "Jul 24", "Fleet Foxes"),
        metacritic_row("84", "Ungodly Hour", "Jul 22", "Chloe x Halle"),
        // Too low
        metacritic_row("65", "Meh", "Jul 24", "Average Band"),
        // Too old
        metacritic_row("95", "Punisher", "Jun 18", "Phoebe Bridgers"),
        // Not rated yet
        metacritic_row("tbd", "Soon", "Jul 31", "Future Band"),
    ];
    format!("<html><body><ol>{}</ol></body></html>", rows.join(""))
}

fn pitchfork_entry(artist: &str, title: &str) -> String {
    format!(
        r#"<li><div><a href="/reviews/albums/x/"><img src="https://media.pitchfork.com/{title}.jpg"><ul><li>{artist}</li></ul><h2>{title}</h2></a></div></li>"#
    )
}

fn pitchfork_page() -> String {
    format!(
        r#"<html><body><section id="best-new-albums"><ul>{}{}</ul></section></body></html>"#,
        pitchfork_entry("Taylor Swift", "Folklore"),
        pitchfork_entry("Jessie Ware", "What's Your Pleasure?"),
    )
}

fn fetcher(client: &Arc<ScriptedHttpClient>) -> PageFetcher {
    PageFetcher::new(client.clone()).with_user_agent("test-agent/1.0")
}

fn options() -> ScrapeOptions {
    ScrapeOptions::new(day(2020, 7, 28)).with_retries(1)
}

#[test_log::test(tokio::test)]
async fn test_two_sources_with_shared_album_dedupe_to_four() {
    let client = Arc::new(ScriptedHttpClient::with_responses([
        ScriptedResponse::ok(metacritic_page()),
        ScriptedResponse::ok(pitchfork_page()),
    ]));
    let mut aggregator = Aggregator::new();
    aggregator.register_source(Box::new(MetacriticSource::new(fetcher(&client))));
    aggregator.register_source(Box::new(PitchforkSource::new(fetcher(&client))));

    let mut albums = aggregator.aggregate(options());
    let unique = deduplicate_stream(&mut albums).await.unwrap();

    let summary: Vec<_> = unique
        .iter()
        .map(|a| (a.title.as_str(), a.source.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Folklore", "Metacritic"),
            ("Shore", "Metacritic"),
            ("Ungodly Hour", "Metacritic"),
            ("What's Your Pleasure?", "Pitchfork"),
        ]
    );
    assert_eq!(unique[0].rating, 88);
    assert_eq!(unique[0].release_date, day(2020, 7, 24));
    assert_eq!(unique[3].rating, 100);
    assert_eq!(unique[3].release_date, day(2020, 7, 28));
    assert!(albums.failures().is_empty());

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url, METACRITIC_URL);
    assert_eq!(requests[0].header("user-agent"), Some("test-agent/1.0"));
    assert_eq!(requests[1].url, "https://pitchfork.com/best");
    assert_eq!(client.remaining(), 0);
}

#[tokio::test]
async fn test_rate_limited_page_is_retried() {
    let client = Arc::new(ScriptedHttpClient::with_responses([
        ScriptedResponse::status(429, "slow down").with_header("Retry-After", "0"),
        ScriptedResponse::ok(metacritic_page()),
    ]));
    let source: Box<dyn AlbumSource> = Box::new(MetacriticSource::new(fetcher(&client)));

    let albums = source.produce_albums(options()).collect_all().await.unwrap();

    assert_eq!(albums.len(), 3);
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_rate_limit_exhaustion_fails_the_source() {
    let client = Arc::new(ScriptedHttpClient::with_responses([
        ScriptedResponse::status(429, "").with_header("Retry-After", "0"),
        ScriptedResponse::status(429, "").with_header("Retry-After", "0"),
    ]));
    let source = MetacriticSource::new(fetcher(&client));

    let err = source.fetch_raw(1).await.unwrap_err();
    match err {
        PlaylistError::RateLimitExceeded { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected RateLimitExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_and_upstream_statuses() {
    let client = Arc::new(ScriptedHttpClient::with_responses([
        ScriptedResponse::status(403, "go away"),
        ScriptedResponse::status(503, "maintenance"),
    ]));
    let source = PitchforkSource::new(fetcher(&client));

    assert!(matches!(
        source.fetch_raw(3).await,
        Err(PlaylistError::Forbidden(_))
    ));
    match source.fetch_raw(3).await {
        Err(PlaylistError::Upstream { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
    // Neither status is retried
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_failed_source_is_skipped_and_reported() {
    let client = Arc::new(ScriptedHttpClient::with_responses([
        ScriptedResponse::status(403, "blocked"),
        ScriptedResponse::ok(pitchfork_page()),
    ]));
    let mut aggregator = Aggregator::new();
    aggregator.register_source(Box::new(MetacriticSource::new(fetcher(&client))));
    aggregator.register_source(Box::new(PitchforkSource::new(fetcher(&client))));

    let mut albums = aggregator.aggregate(options());
    let collected = albums.collect_all().await.unwrap();

    assert_eq!(collected.len(), 2);
    assert!(collected.iter().all(|a| a.source == "Pitchfork"));
    assert_eq!(albums.failures().len(), 1);
    assert_eq!(albums.failures()[0].source, "Metacritic");
}

#[tokio::test]
async fn test_scraped_albums_survive_storage_format() {
    let client = Arc::new(ScriptedHttpClient::with_responses([ScriptedResponse::ok(
        metacritic_page(),
    )]));
    let source: Box<dyn AlbumSource> = Box::new(MetacriticSource::new(fetcher(&client)));
    let albums = source.produce_albums(options()).collect_all().await.unwrap();

    let json = albums_to_json(&albums).unwrap();
    assert!(json.contains(r#""date": "Jul 24 2020""#));
    assert_eq!(albums_from_json(&json).unwrap(), albums);
}
