use super::AlbumSource;
use crate::album::RawRelease;
use crate::dates::DateNormalizer;
use crate::fetch::PageFetcher;
use crate::parsing::{clean_artist, parse_rating, select_attr, select_text, selector, strip_label};
use crate::{PlaylistError, Result};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};

pub const METACRITIC_URL: &str =
    "https://www.metacritic.com/browse/albums/release-date/new-releases/date";

/// Metacritic's new releases list.
///
/// Rows only carry a month and a day; the year is inferred with
/// [`DateNormalizer`].
pub struct MetacriticSource {
    url: String,
    fetcher: PageFetcher,
}

impl MetacriticSource {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self::with_url(fetcher, METACRITIC_URL)
    }

    pub fn with_url(fetcher: PageFetcher, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }

    fn parse_row(row: &ElementRef, dates: &DateNormalizer) -> Result<RawRelease> {
        let title = select_text(row, "div.product_title > a")?;
        let artist = clean_artist(&select_text(row, "li.product_artist > span.data")?);
        let date_text = select_text(row, "li.release_date")?;
        let release_date = dates.normalize(strip_label(&date_text, "Release Date:"))?;
        // A missing score is treated like "tbd"
        let rating = select_text(row, "div.metascore_w")
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

impl AlbumSource for MetacriticSource {
    fn name(&self) -> &str {
        "Metacritic"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    fn parse(&self, raw: &str, today: NaiveDate) -> Result<Vec<RawRelease>> {
        let document = Html::parse_document(raw);
        let dates = DateNormalizer::new(today);
        let row_selector = selector("div.product_wrap")?;

        let rows: Vec<_> = document.select(&row_selector).collect();
        if rows.is_empty() {
            return Err(PlaylistError::Parse(
                "No 'div.product_wrap' rows on the Metacritic page".to_string(),
            ));
        }

        let mut releases = Vec::with_capacity(rows.len());
        for row in rows {
            match Self::parse_row(&row, &dates) {
                Ok(release) => releases.push(release),
                Err(e) => log::debug!("Skipping Metacritic row: {e}"),
            }
        }
        Ok(releases)
    }
}
