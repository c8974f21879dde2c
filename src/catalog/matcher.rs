use super::{CatalogClient, CatalogEntry, CatalogTrack};
use crate::fuzzy::token_set_ratio;
use crate::Result;

/// Minimum similarity a candidate must strictly exceed to be accepted.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 90;

/// A catalog album accepted for a query, with the tracks that qualified it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    pub entry: CatalogEntry,
    pub score: u8,
    pub tracks: Vec<CatalogTrack>,
}

/// Resolves free-text album queries against catalog search results.
///
/// A candidate is accepted when its "{title} {artist}" text scores above the
/// threshold against the query and it has more than one track; singles are
/// never matched. Among accepted candidates the highest score wins, earlier
/// candidates winning ties. Finding nothing is an ordinary outcome.
pub struct CatalogMatcher<'a> {
    client: &'a dyn CatalogClient,
    threshold: u8,
}

impl<'a> CatalogMatcher<'a> {
    pub fn new(client: &'a dyn CatalogClient) -> Self {
        Self {
            client,
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        self.client.search_albums(query).await
    }

    /// Pick the best candidate for `query`, or `None` if nothing qualifies.
    pub async fn best_match(
        &self,
        query: &str,
        candidates: &[CatalogEntry],
    ) -> Result<Option<CatalogEntry>> {
        Ok(self
            .select(query, candidates)
            .await?
            .map(|matched| matched.entry))
    }

    /// Search for `query` and pick the best result, keeping its tracks.
    pub async fn find(&self, query: &str) -> Result<Option<CatalogMatch>> {
        let candidates = self.search(query).await?;
        log::debug!("'{query}': {} search results", candidates.len());
        self.select(query, &candidates).await
    }

    async fn select(&self, query: &str, candidates: &[CatalogEntry]) -> Result<Option<CatalogMatch>> {
        let mut best: Option<CatalogMatch> = None;

        for candidate in candidates {
            // Score before fetching tracks so low scorers cost no requests
            let score = token_set_ratio(query, &candidate.match_text());
            if score <= self.threshold {
                log::debug!("Rejecting {candidate}: score {score}");
                continue;
            }
            if best.as_ref().is_some_and(|b| b.score >= score) {
                continue;
            }

            let tracks = self.client.album_tracks(&candidate.external_id).await?;
            if tracks.len() <= 1 {
                log::debug!("Rejecting {candidate}: single with {} track(s)", tracks.len());
                continue;
            }

            best = Some(CatalogMatch {
                entry: candidate.clone(),
                score,
                tracks,
            });
        }

        match &best {
            Some(matched) => log::debug!("'{query}' matched {} ({})", matched.entry, matched.score),
            None => log::debug!("'{query}' has no match above {}", self.threshold),
        }
        Ok(best)
    }
}
