use super::AlbumSource;
use crate::album::{RawRelease, MAX_RATING};
use crate::fetch::PageFetcher;
use crate::parsing::{element_text, selector};
use crate::{PlaylistError, Result};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};

pub const PITCHFORK_URL: &str = "https://pitchfork.com/best";

/// Pitchfork's "Best New Albums" shelf.
///
/// The shelf prints neither scores nor release dates. Every entry is an
/// editorial pick, so albums are given the maximum rating and dated on the
/// day of the scrape.
pub struct PitchforkSource {
    url: String,
    fetcher: PageFetcher,
}

impl PitchforkSource {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self::with_url(fetcher, PITCHFORK_URL)
    }

    pub fn with_url(fetcher: PageFetcher, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }

    fn parse_entry(anchor: &ElementRef, today: NaiveDate) -> Result<Option<RawRelease>> {
        // Anchors without an artist list are navigation, not albums
        let Some(artist) = anchor.select(&selector("li")?).next() else {
            return Ok(None);
        };
        let title = anchor
            .select(&selector("h2")?)
            .next()
            .map(|h| element_text(&h))
            .ok_or_else(|| PlaylistError::Parse("Missing 'h2' album title".to_string()))?;
        let image_url = anchor
            .select(&selector("img")?)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| {
                urlencoding::decode(src)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| src.to_string())
            })
            .unwrap_or_default();

        Ok(Some(RawRelease {
            title,
            artist: element_text(&artist),
            rating: MAX_RATING,
            release_date: today,
            image_url,
        }))
    }
}

impl AlbumSource for PitchforkSource {
    fn name(&self) -> &str {
        "Pitchfork"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    fn parse(&self, raw: &str, today: NaiveDate) -> Result<Vec<RawRelease>> {
        let document = Html::parse_document(raw);
        let section = document
            .select(&selector("#best-new-albums")?)
            .next()
            .ok_or_else(|| {
                PlaylistError::Parse("No '#best-new-albums' section on the Pitchfork page".to_string())
            })?;

        let mut releases = Vec::new();
        for anchor in section.select(&selector("ul li div a")?) {
            match Self::parse_entry(&anchor, today) {
                Ok(Some(release)) => releases.push(release),
                Ok(None) => {}
                Err(e) => log::debug!("Skipping Pitchfork entry: {e}"),
            }
        }
        Ok(releases)
    }
}
