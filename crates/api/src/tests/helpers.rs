// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use songrank_catalog::{
    Album, AlbumDetails, Artist, ArtistCatalog, ArtistRef, Catalog, CatalogError, Followers,
    Image, Page, Track,
};
use songrank_domain::TournamentConfig;
use songrank_persistence::{
    KeyValueStore, MemoryStore, PersistenceError, RetryPolicy, SessionRepository,
};

use crate::{CurrentPairResponse, Engine, PairInfo, StartSessionRequest, SubmitDecisionRequest};

pub const TEST_SEED: u64 = 0x00C0_FFEE;

/// A memory store shared between engines, with a switch to fail writes.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    pub inner: Arc<Mutex<MemoryStore>>,
    pub fail_writes: Arc<AtomicBool>,
}

impl SharedStore {
    fn check_writable(&self) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(String::from("disk full")));
        }
        Ok(())
    }
}

impl KeyValueStore for SharedStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.inner.lock().unwrap().get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.inner.lock().unwrap().put(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, PersistenceError> {
        self.check_writable()?;
        self.inner.lock().unwrap().remove(key)
    }

    fn keys_with_prefix(&mut self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        self.inner.lock().unwrap().keys_with_prefix(prefix)
    }
}

pub fn create_test_engine(store: &SharedStore) -> Engine<SharedStore> {
    Engine::new(
        SessionRepository::new(store.clone(), RetryPolicy::immediate(2)),
        TournamentConfig::default(),
    )
}

fn track(id: &str, number: u32) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Song {id}"),
        track_number: number,
        artists: vec![ArtistRef {
            id: String::from("artist-1"),
            name: String::from("The Testers"),
        }],
    }
}

fn album(id: &str) -> Album {
    Album {
        id: id.to_string(),
        name: format!("Album {id}"),
        album_type: String::from("album"),
        total_tracks: 0,
        release_date: String::from("2019-05-01"),
        images: vec![Image {
            url: format!("https://img.example/{id}.jpg"),
            width: Some(640),
            height: Some(640),
        }],
    }
}

fn details(id: &str, track_ids: &[String]) -> AlbumDetails {
    let items: Vec<Track> = track_ids
        .iter()
        .enumerate()
        .map(|(i, t)| track(t, u32::try_from(i + 1).unwrap()))
        .collect();
    AlbumDetails {
        id: id.to_string(),
        name: format!("Album {id}"),
        images: album(id).images,
        release_date: String::from("2019-05-01"),
        tracks: Page {
            total: u32::try_from(items.len()).unwrap(),
            items,
            next: None,
        },
    }
}

/// A catalog with one album holding `songs` tracks, plus a single that
/// re-releases the first track.
pub fn create_test_catalog(songs: usize) -> ArtistCatalog {
    let ids: Vec<String> = (1..=songs).map(|i| format!("t{i:02}")).collect();
    let single: Vec<String> = ids.iter().take(1).cloned().collect();
    ArtistCatalog {
        artist: Artist {
            id: String::from("artist-1"),
            name: String::from("The Testers"),
            images: vec![],
            genres: vec![],
            popularity: 42,
            followers: Followers { total: 7 },
        },
        albums: vec![album("lp-1"), album("single-1")],
        details: vec![details("lp-1", &ids), details("single-1", &single)],
    }
}

pub fn start_request() -> StartSessionRequest {
    StartSessionRequest {
        artist_id: String::from("artist-1"),
        seed: Some(TEST_SEED),
        refresh_catalog: false,
    }
}

pub fn create_started_engine(store: &SharedStore, songs: usize) -> Engine<SharedStore> {
    let mut engine: Engine<SharedStore> = create_test_engine(store);
    engine
        .start_session(&create_test_catalog(songs), &start_request())
        .unwrap();
    engine
}

pub fn create_comparing_engine(store: &SharedStore, songs: usize) -> Engine<SharedStore> {
    let mut engine: Engine<SharedStore> = create_started_engine(store, songs);
    engine.begin_comparing().unwrap();
    engine
}

pub fn live_pair(engine: &Engine<SharedStore>) -> PairInfo {
    let current: CurrentPairResponse = engine.get_current_pair().unwrap();
    current.pair.unwrap()
}

/// Picks the member with the smaller id, so outcomes are deterministic.
pub fn smaller_wins(pair: &PairInfo) -> SubmitDecisionRequest {
    let winner: &str = pair
        .members
        .iter()
        .map(|m| m.candidate_id.as_str())
        .min()
        .unwrap();
    SubmitDecisionRequest {
        pair_id: pair.pair_id.clone(),
        winner_id: Some(winner.to_string()),
    }
}

/// Decides pairs until the tournament is exhausted; returns the count.
pub fn decide_all(engine: &mut Engine<SharedStore>) -> usize {
    let mut decided: usize = 0;
    while let Some(pair) = engine.get_current_pair().unwrap().pair {
        engine.submit_decision(&smaller_wins(&pair)).unwrap();
        decided += 1;
        assert!(decided < 500, "tournament did not terminate");
    }
    decided
}

/// An in-process catalog that counts fetches.
pub struct FakeCatalog {
    pub catalog: ArtistCatalog,
    pub fail_with: Option<CatalogError>,
    pub artist_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(songs: usize) -> Self {
        Self {
            catalog: create_test_catalog(songs),
            fail_with: None,
            artist_calls: AtomicUsize::new(0),
        }
    }
}

impl Catalog for FakeCatalog {
    async fn fetch_artist(&self, artist_id: &str) -> Result<Artist, CatalogError> {
        self.artist_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        if artist_id == self.catalog.artist.id {
            Ok(self.catalog.artist.clone())
        } else {
            Err(CatalogError::NotFound(format!("artist '{artist_id}'")))
        }
    }

    async fn fetch_albums(&self, _artist_id: &str) -> Result<Vec<Album>, CatalogError> {
        Ok(self.catalog.albums.clone())
    }

    async fn fetch_album_details(
        &self,
        album_ids: &[String],
    ) -> Result<Vec<AlbumDetails>, CatalogError> {
        Ok(self
            .catalog
            .details
            .iter()
            .filter(|d| album_ids.contains(&d.id))
            .cloned()
            .collect())
    }
}
