use super::AlbumSource;
use crate::album::RawRelease;
use crate::dates::parse_long_date;
use crate::fetch::PageFetcher;
use crate::parsing::{clean_artist, parse_rating, select_attr, select_text, selector};
use crate::{PlaylistError, Result};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};

pub const DETAILED_METACRITIC_URL: &str =
    "https://www.metacritic.com/browse/albums/release-date/new-releases/date?view=detailed";

/// Metacritic's detailed new releases view.
///
/// Unlike the compact list this view prints full dates ("July 24, 2020"),
/// artwork, and artist names prefixed with "- ".
pub struct DetailedMetacriticSource {
    url: String,
    fetcher: PageFetcher,
}

impl DetailedMetacriticSource {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self::with_url(fetcher, DETAILED_METACRITIC_URL)
    }

    pub fn with_url(fetcher: PageFetcher, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }

    fn parse_row(row: &ElementRef) -> Result<RawRelease> {
        let title = select_text(row, "a.title > h3")?;
        let artist = clean_artist(&select_text(row, "div.artist")?);
        let release_date = parse_long_date(&select_text(row, "div.clamp-details > span")?)?;
        let rating = select_text(row, "div.clamp-score-wrap div.metascore_w")
            .map(|s| parse_rating(&s))
            .unwrap_or(0);
        let image_url = select_attr(row, "img", "src")?.unwrap_or_default();

        Ok(RawRelease {
            title,
            artist,
            rating,
            release_date,
            image_url,
        })
    }
}

impl AlbumSource for DetailedMetacriticSource {
    fn name(&self) -> &str {
        "Metacritic (detailed)"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    fn parse(&self, raw: &str, _today: NaiveDate) -> Result<Vec<RawRelease>> {
        let document = Html::parse_document(raw);
        let row_selector = selector("td.clamp-summary-wrap")?;
        let image_selector = selector("td.clamp-image-wrap img")?;

        let rows: Vec<_> = document.select(&row_selector).collect();
        if rows.is_empty() {
            return Err(PlaylistError::Parse(
                "No 'td.clamp-summary-wrap' rows on the detailed Metacritic page".to_string(),
            ));
        }

        let mut releases = Vec::with_capacity(rows.len());
        for row in rows {
            match Self::parse_row(&row) {
                Ok(mut release) => {
                    // Artwork lives in a sibling cell of the same table row
                    if release.image_url.is_empty() {
                        release.image_url = row
                            .parent()
                            .and_then(ElementRef::wrap)
                            .and_then(|tr| tr.select(&image_selector).next())
                            .and_then(|img| img.value().attr("src"))
                            .unwrap_or_default()
                            .to_string();
                    }
                    releases.push(release);
                }
                Err(e) => log::debug!("Skipping detailed Metacritic row: {e}"),
            }
        }
        Ok(releases)
    }
}
