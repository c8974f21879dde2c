use crate::iterator::AsyncAlbumIterator;
use crate::{Album, Result};
use std::collections::HashSet;

/// Collapse albums sharing a title and artist, keeping the first one seen.
///
/// Later copies are dropped even when their rating, date or source differ,
/// so the earliest registered source wins. Output keeps first-seen order.
pub fn deduplicate(albums: impl IntoIterator<Item = Album>) -> Vec<Album> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for album in albums {
        if seen.insert((album.title.clone(), album.artist.clone())) {
            unique.push(album);
        } else {
            log::debug!("Dropping duplicate {} from {}", album, album.source);
        }
    }
    unique
}

/// Drain a lazy album sequence and deduplicate it.
pub async fn deduplicate_stream(albums: &mut dyn AsyncAlbumIterator) -> Result<Vec<Album>> {
    let collected = albums.collect_all().await?;
    let total = collected.len();
    let unique = deduplicate(collected);
    log::info!("{} albums scraped, {} after removing duplicates", total, unique.len());
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn album(title: &str, artist: &str, source: &str, rating: u8) -> Album {
        Album::new(
            title,
            artist,
            source,
            "",
            rating,
            NaiveDate::from_ymd_opt(2020, 7, 24).unwrap(),
        )
    }

    #[test]
    fn test_first_seen_wins() {
        let albums = vec![
            album("Folklore", "Taylor Swift", "Metacritic", 88),
            album("Folklore", "Taylor Swift", "Pitchfork", 100),
            album("RTJ4", "Run the Jewels", "Metacritic", 91),
            album("Punisher", "Phoebe Bridgers", "Metacritic", 92),
            album("Women in Music Pt. III", "HAIM", "Metacritic", 85),
        ];
        let unique = deduplicate(albums.clone());

        assert_eq!(unique.len(), 4);
        assert_eq!(unique[0], albums[0]);
        assert_eq!(unique[1..], albums[2..]);
    }

    #[test]
    fn test_same_title_different_artist_is_kept() {
        let unique = deduplicate(vec![
            album("Untitled", "Artist One", "Metacritic", 80),
            album("Untitled", "Artist Two", "Metacritic", 80),
        ]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(deduplicate(Vec::new()).is_empty());
    }
}
