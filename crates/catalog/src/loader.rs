// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashSet;

use tracing::info;

use crate::client::Catalog;
use crate::error::CatalogError;
use crate::model::{Album, AlbumDetails, Artist, ArtistCatalog};

/// Loads everything needed to rank an artist's songs.
///
/// Fetches the artist, its album listing and the details of every listed
/// album. Album ids repeated in the listing are requested once. Details
/// are returned in listing order.
///
/// # Arguments
///
/// * `catalog` - The catalog to read from
/// * `artist_id` - The artist to load
///
/// # Errors
///
/// Returns the first error from the catalog. Authentication failures are
/// never retried and abort the load.
pub async fn load_artist_catalog<C: Catalog + Sync>(
    catalog: &C,
    artist_id: &str,
) -> Result<ArtistCatalog, CatalogError> {
    let artist: Artist = catalog.fetch_artist(artist_id).await?;
    let albums: Vec<Album> = catalog.fetch_albums(artist_id).await?;

    let mut seen: HashSet<&str> = HashSet::new();
    let album_ids: Vec<String> = albums
        .iter()
        .filter(|album| seen.insert(album.id.as_str()))
        .map(|album| album.id.clone())
        .collect();

    let mut details: Vec<AlbumDetails> = catalog.fetch_album_details(&album_ids).await?;
    details.sort_by_key(|d| {
        album_ids
            .iter()
            .position(|id| id == &d.id)
            .unwrap_or(usize::MAX)
    });

    let loaded: ArtistCatalog = ArtistCatalog {
        artist,
        albums,
        details,
    };
    info!(
        artist_id,
        artist = %loaded.artist.name,
        albums = loaded.albums.len(),
        tracks = loaded.track_count(),
        "Loaded artist catalog"
    );
    Ok(loaded)
}
