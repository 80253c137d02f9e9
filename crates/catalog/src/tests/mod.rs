// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod retry_tests;

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    Album, AlbumDetails, Artist, ArtistRef, Catalog, CatalogError, Followers, Image, Page, Track,
};

pub fn create_test_artist(id: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: format!("Artist {id}"),
        images: vec![],
        genres: vec![String::from("indie")],
        popularity: 50,
        followers: Followers { total: 1000 },
    }
}

pub fn create_test_album(id: &str, album_type: &str) -> Album {
    Album {
        id: id.to_string(),
        name: format!("Album {id}"),
        album_type: album_type.to_string(),
        total_tracks: 2,
        release_date: String::from("2020-01-01"),
        images: vec![create_test_image(id)],
    }
}

pub fn create_test_image(album_id: &str) -> Image {
    Image {
        url: format!("https://img.example/{album_id}/640.jpg"),
        width: Some(640),
        height: Some(640),
    }
}

pub fn create_test_track(id: &str, track_number: u32) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Song {id}"),
        track_number,
        artists: vec![ArtistRef {
            id: String::from("artist-1"),
            name: String::from("Artist artist-1"),
        }],
    }
}

pub fn create_test_details(album_id: &str, track_ids: &[&str]) -> AlbumDetails {
    let items: Vec<Track> = track_ids
        .iter()
        .enumerate()
        .map(|(i, id)| create_test_track(id, u32::try_from(i + 1).unwrap()))
        .collect();
    AlbumDetails {
        id: album_id.to_string(),
        name: format!("Album {album_id}"),
        images: vec![create_test_image(album_id)],
        release_date: String::from("2020-01-01"),
        tracks: Page {
            total: u32::try_from(items.len()).unwrap(),
            items,
            next: None,
        },
    }
}

/// An in-process catalog with canned data and call recording.
pub struct FakeCatalog {
    pub artist: Artist,
    pub albums: Vec<Album>,
    pub details: Vec<AlbumDetails>,
    pub fail_albums_with: Option<CatalogError>,
    pub detail_requests: Mutex<Vec<Vec<String>>>,
    pub artist_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(albums: Vec<Album>, details: Vec<AlbumDetails>) -> Self {
        Self {
            artist: create_test_artist("artist-1"),
            albums,
            details,
            fail_albums_with: None,
            detail_requests: Mutex::new(vec![]),
            artist_calls: AtomicUsize::new(0),
        }
    }
}

impl Catalog for FakeCatalog {
    async fn fetch_artist(&self, artist_id: &str) -> Result<Artist, CatalogError> {
        self.artist_calls.fetch_add(1, Ordering::SeqCst);
        if artist_id == self.artist.id {
            Ok(self.artist.clone())
        } else {
            Err(CatalogError::NotFound(format!("artist '{artist_id}'")))
        }
    }

    async fn fetch_albums(&self, _artist_id: &str) -> Result<Vec<Album>, CatalogError> {
        match &self.fail_albums_with {
            Some(err) => Err(err.clone()),
            None => Ok(self.albums.clone()),
        }
    }

    async fn fetch_album_details(
        &self,
        album_ids: &[String],
    ) -> Result<Vec<AlbumDetails>, CatalogError> {
        self.detail_requests.lock().unwrap().push(album_ids.to_vec());
        // Reverse to check that callers restore listing order.
        Ok(self
            .details
            .iter()
            .rev()
            .filter(|d| album_ids.contains(&d.id))
            .cloned()
            .collect())
    }
}
