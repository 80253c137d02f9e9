// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog response shapes.
//!
//! Only the fields the ranking flow uses are modeled; unknown fields are
//! ignored when decoding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use songrank_domain::{CoverArt, SourceTrack};

/// An image reference as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
}

impl From<&Image> for CoverArt {
    fn from(image: &Image) -> Self {
        Self {
            url: image.url.clone(),
            width: image.width,
            height: image.height,
        }
    }
}

/// An artist credit on an album or track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Artist id.
    pub id: String,
    /// Artist name.
    pub name: String,
}

/// Follower counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Followers {
    /// Total followers.
    pub total: u64,
}

/// A full artist record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Artist id.
    pub id: String,
    /// Artist name.
    pub name: String,
    /// Profile images, largest first.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Popularity from 0 to 100.
    #[serde(default)]
    pub popularity: u32,
    /// Followers.
    #[serde(default)]
    pub followers: Followers,
}

/// An album as listed under an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Album id.
    pub id: String,
    /// Album name.
    pub name: String,
    /// `album`, `single` or `compilation`.
    pub album_type: String,
    /// Number of tracks.
    #[serde(default)]
    pub total_tracks: u32,
    /// Release date as given by the API (year, month or day precision).
    #[serde(default)]
    pub release_date: String,
    /// Cover images, largest first.
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A track within an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track id.
    pub id: String,
    /// Track name.
    pub name: String,
    /// Position on its disc.
    pub track_number: u32,
    /// Credited artists.
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Absolute URL of the next page, if there is one.
    #[serde(default)]
    pub next: Option<String>,
    /// Total items across all pages.
    #[serde(default)]
    pub total: u32,
}

/// An album with its track listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDetails {
    /// Album id.
    pub id: String,
    /// Album name.
    pub name: String,
    /// Cover images, largest first.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Release date.
    #[serde(default)]
    pub release_date: String,
    /// Track listing. The client follows `next` so this holds every track.
    pub tracks: Page<Track>,
}

/// Response of the batched album lookup. Unknown ids come back as `null`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AlbumBatch {
    pub(crate) albums: Vec<Option<AlbumDetails>>,
}

/// Everything needed to build a candidate pool for one artist.
///
/// This is the value cached in the key-value store, so it round-trips
/// through serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCatalog {
    /// The artist.
    pub artist: Artist,
    /// Albums, singles and compilations in listing order.
    pub albums: Vec<Album>,
    /// Album details in listing order.
    pub details: Vec<AlbumDetails>,
}

impl ArtistCatalog {
    /// Returns the number of tracks across all album details.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.details.iter().map(|d| d.tracks.items.len()).sum()
    }

    /// Flattens the catalog into source tracks and a cover lookup.
    ///
    /// Tracks keep album listing order. Deduplication is left to the pool
    /// builder.
    #[must_use]
    pub fn to_source(&self) -> (Vec<SourceTrack>, HashMap<String, CoverArt>) {
        let mut tracks: Vec<SourceTrack> = Vec::with_capacity(self.track_count());
        let mut covers: HashMap<String, CoverArt> = HashMap::new();

        for album in &self.details {
            if let Some(image) = album.images.first() {
                covers.insert(album.id.clone(), CoverArt::from(image));
            }
            tracks.extend(album.tracks.items.iter().map(|track| SourceTrack {
                id: track.id.clone(),
                name: track.name.clone(),
                track_number: track.track_number,
                artists: track.artists.iter().map(|a| a.name.clone()).collect(),
                group_id: album.id.clone(),
                group_name: album.name.clone(),
            }));
        }

        (tracks, covers)
    }
}
