use crate::{Album, Result};

use async_trait::async_trait;

/// Pull-based async cursor over albums.
///
/// Implemented by a single source's albums ([`SourceAlbums`](crate::sources::SourceAlbums))
/// and by the aggregate over every registered source
/// ([`AggregatedAlbums`](crate::aggregator::AggregatedAlbums)). Network I/O happens
/// inside `next`, so nothing is fetched until the caller starts pulling.
/// Cursors are forward-only and finite; once exhausted they keep returning
/// `Ok(None)`.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait AsyncAlbumIterator {
    /// Fetch the next album.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(album))` - Next album in the sequence
    /// - `Ok(None)` - No more albums available
    /// - `Err(...)` - Network or parsing error occurred
    async fn next(&mut self) -> Result<Option<Album>>;

    /// Collect all remaining albums into a Vec.
    async fn collect_all(&mut self) -> Result<Vec<Album>> {
        let mut albums = Vec::new();
        while let Some(album) = self.next().await? {
            albums.push(album);
        }
        Ok(albums)
    }

    /// Take up to n albums from the iterator.
    async fn take(&mut self, n: usize) -> Result<Vec<Album>> {
        let mut albums = Vec::new();
        for _ in 0..n {
            match self.next().await? {
                Some(album) => albums.push(album),
                None => break,
            }
        }
        Ok(albums)
    }
}
