use crate::iterator::AsyncAlbumIterator;
use crate::sources::{AlbumSource, ScrapeOptions, SourceAlbums};
use crate::{Album, PlaylistError, Result};

use async_trait::async_trait;
use std::collections::VecDeque;

/// Ordered registry of album sources.
///
/// Sources are visited in registration order. Registration does no
/// validation; registering the same kind of source twice scrapes it twice.
#[derive(Default)]
pub struct Aggregator {
    sources: Vec<Box<dyn AlbumSource>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_source(&mut self, source: Box<dyn AlbumSource>) {
        log::debug!("Registered source {} ({})", source.name(), source.url());
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Concatenate every source's albums into one lazy sequence.
    ///
    /// Consumes the aggregator: a sequence cannot be replayed, build a new
    /// aggregator with fresh sources to scrape again.
    pub fn aggregate(self, options: ScrapeOptions) -> AggregatedAlbums {
        AggregatedAlbums {
            pending: self.sources.into(),
            current: None,
            options,
            attempted: 0,
            failures: Vec::new(),
        }
    }
}

/// A source that was skipped because it could not be scraped.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: PlaylistError,
}

/// Albums from every registered source, in source order.
///
/// A source that fails to fetch or parse is logged, recorded in
/// [`failures`](Self::failures), and skipped; iteration continues with the
/// next source. Only when every source has failed does `next` return
/// [`PlaylistError::AllSourcesFailed`].
pub struct AggregatedAlbums {
    pending: VecDeque<Box<dyn AlbumSource>>,
    current: Option<SourceAlbums>,
    options: ScrapeOptions,
    attempted: usize,
    failures: Vec<SourceFailure>,
}

impl AggregatedAlbums {
    /// Sources skipped so far.
    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }

    fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failures.len() == self.attempted
    }
}

#[async_trait(?Send)]
impl AsyncAlbumIterator for AggregatedAlbums {
    async fn next(&mut self) -> Result<Option<Album>> {
        loop {
            if self.current.is_none() {
                let Some(source) = self.pending.pop_front() else {
                    if self.all_failed() {
                        let messages = self
                            .failures
                            .iter()
                            .map(|f| format!("{}: {}", f.source, f.error))
                            .collect();
                        return Err(PlaylistError::AllSourcesFailed(messages));
                    }
                    return Ok(None);
                };
                self.attempted += 1;
                self.current = Some(source.produce_albums(self.options));
            }

            let Some(current) = self.current.as_mut() else {
                continue;
            };
            match current.next().await {
                Ok(Some(album)) => return Ok(Some(album)),
                Ok(None) => self.current = None,
                Err(error) => {
                    let source = current.source_name().to_string();
                    log::warn!("Skipping source {source}: {error}");
                    self.failures.push(SourceFailure { source, error });
                    self.current = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::RawRelease;
    use crate::fetch::PageFetcher;
    use crate::testing::{ScriptedHttpClient, ScriptedResponse};
    use chrono::NaiveDate;
    use std::sync::Arc;

    /// Source whose page is a plain list of "title|artist|rating" lines.
    struct LineSource {
        name: &'static str,
        fetcher: PageFetcher,
    }

    impl LineSource {
        fn boxed(name: &'static str, client: Arc<ScriptedHttpClient>) -> Box<dyn AlbumSource> {
            Box::new(Self {
                name,
                fetcher: PageFetcher::new(client),
            })
        }
    }

    impl AlbumSource for LineSource {
        fn name(&self) -> &str {
            self.name
        }

        fn url(&self) -> &str {
            "https://lines.test/new"
        }

        fn fetcher(&self) -> &PageFetcher {
            &self.fetcher
        }

        fn parse(&self, raw: &str, today: NaiveDate) -> Result<Vec<RawRelease>> {
            raw.lines()
                .map(|line| {
                    let parts: Vec<_> = line.split('|').collect();
                    match parts.as_slice() {
                        [title, artist, rating] => Ok(RawRelease {
                            title: title.to_string(),
                            artist: artist.to_string(),
                            rating: rating.parse().unwrap_or(0),
                            release_date: today,
                            image_url: String::new(),
                        }),
                        _ => Err(PlaylistError::Parse(format!("bad line '{line}'"))),
                    }
                })
                .collect()
        }
    }

    fn options() -> ScrapeOptions {
        ScrapeOptions::new(NaiveDate::from_ymd_opt(2020, 7, 28).unwrap()).with_retries(0)
    }

    #[tokio::test]
    async fn test_concatenates_in_registration_order() {
        let client = Arc::new(ScriptedHttpClient::with_responses([
            ScriptedResponse::ok("A1|a|90\nA2|a|85"),
            ScriptedResponse::ok("B1|b|95"),
        ]));
        let mut aggregator = Aggregator::new();
        assert!(aggregator.is_empty());
        aggregator.register_source(LineSource::boxed("first", client.clone()));
        aggregator.register_source(LineSource::boxed("second", client.clone()));
        assert_eq!(aggregator.len(), 2);

        let mut albums = aggregator.aggregate(options());
        let titles: Vec<_> = albums
            .collect_all()
            .await
            .unwrap()
            .into_iter()
            .map(|a| (a.title, a.source))
            .collect();

        assert_eq!(
            titles,
            vec![
                ("A1".to_string(), "first".to_string()),
                ("A2".to_string(), "first".to_string()),
                ("B1".to_string(), "second".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_sources_are_fetched_lazily() {
        let client = Arc::new(ScriptedHttpClient::with_responses([
            ScriptedResponse::ok("A1|a|90"),
            ScriptedResponse::ok("B1|b|90"),
        ]));
        let mut aggregator = Aggregator::new();
        aggregator.register_source(LineSource::boxed("first", client.clone()));
        aggregator.register_source(LineSource::boxed("second", client.clone()));

        let mut albums = aggregator.aggregate(options());
        assert!(client.requests().is_empty());

        let first = albums.next().await.unwrap().unwrap();
        assert_eq!(first.title, "A1");
        assert_eq!(client.requests().len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_failing_source_is_skipped() {
        let client = Arc::new(ScriptedHttpClient::with_responses([
            ScriptedResponse::status(403, "denied"),
            ScriptedResponse::ok("B1|b|90"),
        ]));
        let mut aggregator = Aggregator::new();
        aggregator.register_source(LineSource::boxed("blocked", client.clone()));
        aggregator.register_source(LineSource::boxed("open", client.clone()));

        let mut albums = aggregator.aggregate(options());
        let collected = albums.collect_all().await.unwrap();

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].source, "open");
        assert_eq!(albums.failures().len(), 1);
        assert_eq!(albums.failures()[0].source, "blocked");
        assert!(matches!(
            albums.failures()[0].error,
            PlaylistError::Forbidden(_)
        ));
    }

    #[tokio::test]
    async fn test_every_source_failing_is_an_error() {
        let client = Arc::new(ScriptedHttpClient::with_responses([
            ScriptedResponse::status(500, "boom"),
            ScriptedResponse::status(403, "denied"),
        ]));
        let mut aggregator = Aggregator::new();
        aggregator.register_source(LineSource::boxed("one", client.clone()));
        aggregator.register_source(LineSource::boxed("two", client.clone()));

        let result = aggregator.aggregate(options()).collect_all().await;
        match result {
            Err(PlaylistError::AllSourcesFailed(messages)) => assert_eq!(messages.len(), 2),
            other => panic!("expected AllSourcesFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_aggregator_yields_nothing() {
        let mut albums = Aggregator::new().aggregate(options());
        assert!(albums.next().await.unwrap().is_none());
        assert!(albums.next().await.unwrap().is_none());
    }
}
