// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog collaborator for SongRank.
//!
//! Reads an artist's albums and tracks from the Spotify Web API and turns
//! them into the source tracks the candidate pool builder consumes.
//!
//! - `SpotifyClient` implements the `Catalog` trait over HTTP
//! - `load_artist_catalog` gathers artist, albums and album details
//! - `ArtistCatalog::to_source` flattens the result for `build_pool`
//!
//! Network failures, rate limiting and 5xx responses are retried with
//! exponential backoff. Token failures are fatal.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod client;
mod error;
mod loader;
mod model;
mod retry;

#[cfg(test)]
mod tests;

pub use client::{
    ALBUM_BATCH_LIMIT, ALBUM_GROUPS, ALBUM_PAGE_LIMIT, Catalog, SpotifyClient,
    SpotifyCredentials, SpotifyEndpoints,
};
pub use error::CatalogError;
pub use loader::load_artist_catalog;
pub use model::{
    Album, AlbumDetails, Artist, ArtistCatalog, ArtistRef, Followers, Image, Page, Track,
};
pub use retry::{Backoff, with_retry};
