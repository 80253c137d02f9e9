// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use songrank_catalog::{
    Album, AlbumDetails, Artist, ArtistRef, CatalogError, Followers, Image, Page, Track,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

/// An in-process catalog for one artist with a single album.
struct FakeCatalog {
    songs: u32,
    fail_with: Option<CatalogError>,
    artist_calls: AtomicUsize,
}

impl FakeCatalog {
    fn new(songs: u32) -> Self {
        Self {
            songs,
            fail_with: None,
            artist_calls: AtomicUsize::new(0),
        }
    }

    fn images() -> Vec<Image> {
        vec![Image {
            url: String::from("https://img.example/lp-1.jpg"),
            width: Some(300),
            height: Some(300),
        }]
    }
}

impl Catalog for FakeCatalog {
    async fn fetch_artist(&self, artist_id: &str) -> Result<Artist, CatalogError> {
        self.artist_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        if artist_id != "artist-1" {
            return Err(CatalogError::NotFound(format!("artist '{artist_id}'")));
        }
        Ok(Artist {
            id: String::from("artist-1"),
            name: String::from("The Testers"),
            images: vec![],
            genres: vec![],
            popularity: 10,
            followers: Followers { total: 3 },
        })
    }

    async fn fetch_albums(&self, _artist_id: &str) -> Result<Vec<Album>, CatalogError> {
        Ok(vec![Album {
            id: String::from("lp-1"),
            name: String::from("First Record"),
            album_type: String::from("album"),
            total_tracks: self.songs,
            release_date: String::from("2021"),
            images: Self::images(),
        }])
    }

    async fn fetch_album_details(
        &self,
        _album_ids: &[String],
    ) -> Result<Vec<AlbumDetails>, CatalogError> {
        let items: Vec<Track> = (1..=self.songs)
            .map(|n| Track {
                id: format!("t{n:02}"),
                name: format!("Song {n}"),
                track_number: n,
                artists: vec![ArtistRef {
                    id: String::from("artist-1"),
                    name: String::from("The Testers"),
                }],
            })
            .collect();
        Ok(vec![AlbumDetails {
            id: String::from("lp-1"),
            name: String::from("First Record"),
            images: Self::images(),
            release_date: String::from("2021"),
            tracks: Page {
                total: self.songs,
                items,
                next: None,
            },
        }])
    }
}

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state(catalog: FakeCatalog) -> AppState<FakeCatalog> {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    let engine: Engine<Persistence> = Engine::new(
        SessionRepository::new(persistence, RetryPolicy::immediate(2)),
        TournamentConfig::default(),
    );
    AppState {
        engine: Arc::new(Mutex::new(engine)),
        catalog: Arc::new(catalog),
    }
}

fn create_test_app(songs: u32) -> Router {
    build_router(create_test_app_state(FakeCatalog::new(songs)))
}

/// Sends one request and returns the status and body bytes.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (HttpStatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request: Request<Body> = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn start_session(app: &Router) -> SessionResponse {
    let (status, body) = send(
        app,
        "POST",
        "/sessions",
        Some(serde_json::json!({
            "artist_id": "artist-1",
            "seed": 7,
            "refresh_catalog": false
        })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{}", String::from_utf8_lossy(&body));
    serde_json::from_slice(&body).unwrap()
}

/// Decides every offered pair in favor of the smaller id.
async fn decide_all(app: &Router) -> usize {
    let mut decided: usize = 0;
    loop {
        let (status, body) = send(app, "GET", "/pair", None).await;
        assert_eq!(status, HttpStatusCode::OK);
        let current: CurrentPairResponse = serde_json::from_slice(&body).unwrap();
        let Some(pair) = current.pair else {
            return decided;
        };
        let winner: String = pair
            .members
            .iter()
            .map(|m| m.candidate_id.clone())
            .min()
            .unwrap();
        let (status, _) = send(
            app,
            "POST",
            "/decisions",
            Some(serde_json::json!({ "pair_id": pair.pair_id, "winner_id": winner })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        decided += 1;
        assert!(decided < 200, "tournament did not terminate");
    }
}

#[test]
fn test_args_defaults() {
    let args: Args = Args::try_parse_from([
        "songrank-server",
        "--spotify-client-id",
        "id",
        "--spotify-client-secret",
        "secret",
    ])
    .unwrap();

    assert_eq!(args.port, 3000);
    let config: TournamentConfig = args.tournament_config();
    assert_eq!(config.min_comparisons, 3);
    assert_eq!(config.max_tie_breaks, 1);
    assert_eq!(config.max_rounds, None);
}

#[tokio::test]
async fn test_start_session_loads_catalog() {
    let app: Router = create_test_app(5);

    let session: SessionResponse = start_session(&app).await;

    assert_eq!(session.artist_id, "artist-1");
    assert_eq!(session.candidate_count, 5);
    assert_eq!(session.stage.step, 1);
    assert!(session.durability.durable);

    let (status, body) = send(&app, "GET", "/catalogs", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    let cached: CachedCatalogsResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(cached.artist_ids, vec![String::from("artist-1")]);
}

#[tokio::test]
async fn test_second_start_uses_cached_catalog() {
    let app_state: AppState<FakeCatalog> = create_test_app_state(FakeCatalog::new(4));
    let app: Router = build_router(app_state.clone());

    start_session(&app).await;
    start_session(&app).await;

    assert_eq!(app_state.catalog.artist_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_endpoints_without_session() {
    let app: Router = create_test_app(4);

    for uri in ["/session", "/stage", "/pair", "/ranking", "/progress"] {
        let (status, _) = send(&app, "GET", uri, None).await;
        assert_eq!(status, HttpStatusCode::CONFLICT, "{uri}");
    }
}

#[tokio::test]
async fn test_catalog_auth_failure_is_bad_gateway() {
    let mut catalog: FakeCatalog = FakeCatalog::new(4);
    catalog.fail_with = Some(CatalogError::Auth(String::from("invalid_client")));
    let app: Router = build_router(create_test_app_state(catalog));

    let (status, body) = send(
        &app,
        "POST",
        "/sessions",
        Some(serde_json::json!({ "artist_id": "artist-1", "seed": null, "refresh_catalog": false })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::BAD_GATEWAY);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert!(error.error);
    assert!(error.message.contains("invalid_client"));
}

#[tokio::test]
async fn test_unknown_artist_is_not_found() {
    let app: Router = create_test_app(4);

    let (status, _) = send(
        &app,
        "POST",
        "/sessions",
        Some(serde_json::json!({ "artist_id": "nobody", "seed": 1, "refresh_catalog": false })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_single_song_catalog_is_rejected() {
    let app: Router = create_test_app(1);

    let (status, _) = send(
        &app,
        "POST",
        "/sessions",
        Some(serde_json::json!({ "artist_id": "artist-1", "seed": 1, "refresh_catalog": false })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_selection_endpoints() {
    let app: Router = create_test_app(5);
    start_session(&app).await;

    let (status, body) = send(&app, "GET", "/candidates", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    let page: CandidatePageResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(page.page, 0);
    assert_eq!(page.candidates.len(), 5);

    let (status, body) = send(&app, "POST", "/candidates/t02/toggle", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    let toggled: ToggleCandidateResponse = serde_json::from_slice(&body).unwrap();
    assert!(!toggled.eligible);
    assert_eq!(toggled.eligible_count, 4);

    let (status, _) = send(&app, "POST", "/candidates/t99/toggle", None).await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_tournament_over_http() {
    let app: Router = create_test_app(4);
    start_session(&app).await;

    let (status, body) = send(&app, "POST", "/compare", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    let comparing: SessionResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(comparing.stage.title, "Songs Showdown");

    let decided: usize = decide_all(&app).await;
    assert!(decided >= 6);

    let (status, body) = send(&app, "POST", "/results", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    let finished: FinishResponse = serde_json::from_slice(&body).unwrap();
    assert!(finished.ranking.is_final);
    assert_eq!(finished.ranking.entries.len(), 4);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/ranking.csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv: String = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("rank,song,album,score"));
    assert_eq!(csv.lines().count(), 5);
}

#[tokio::test]
async fn test_decision_errors_map_to_status_codes() {
    let app: Router = create_test_app(4);
    start_session(&app).await;
    send(&app, "POST", "/compare", None).await;

    let (status, _) = send(
        &app,
        "POST",
        "/decisions",
        Some(serde_json::json!({ "pair_id": "r9-p9", "winner_id": null })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/results", None).await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_skip_and_duplicate_decision() {
    let app: Router = create_test_app(4);
    start_session(&app).await;
    send(&app, "POST", "/compare", None).await;

    let (_, body) = send(&app, "GET", "/pair", None).await;
    let current: CurrentPairResponse = serde_json::from_slice(&body).unwrap();
    let pair_id: String = current.pair.unwrap().pair_id;

    let (status, body) = send(&app, "POST", &format!("/pairs/{pair_id}/skip"), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    let skipped: DecisionResponse = serde_json::from_slice(&body).unwrap();
    assert!(skipped.accepted);

    let (status, body) = send(
        &app,
        "POST",
        "/decisions",
        Some(serde_json::json!({ "pair_id": pair_id, "winner_id": null })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    let duplicate: DecisionResponse = serde_json::from_slice(&body).unwrap();
    assert!(!duplicate.accepted);
    assert_eq!(duplicate.next.progress.decisions, 1);
}

#[tokio::test]
async fn test_restart_clears_session() {
    let app: Router = create_test_app(4);
    start_session(&app).await;

    let (status, body) = send(&app, "DELETE", "/session", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    let durability: Durability = serde_json::from_slice(&body).unwrap();
    assert!(durability.durable);

    let (status, _) = send(&app, "GET", "/session", None).await;
    assert_eq!(status, HttpStatusCode::CONFLICT);
}

#[tokio::test]
async fn test_stored_session_resumes_on_startup() {
    let path: std::path::PathBuf =
        std::env::temp_dir().join(format!("songrank-resume-{}.db", std::process::id()));
    let open_engine = || -> Engine<Persistence> {
        Engine::new(
            SessionRepository::new(
                Persistence::new_with_file(&path).unwrap(),
                RetryPolicy::immediate(2),
            ),
            TournamentConfig::default(),
        )
    };

    let app_state: AppState<FakeCatalog> = AppState {
        engine: Arc::new(Mutex::new(open_engine())),
        catalog: Arc::new(FakeCatalog::new(4)),
    };
    let app: Router = build_router(app_state);
    let started: SessionResponse = start_session(&app).await;
    send(&app, "POST", "/candidates/t04/toggle", None).await;
    drop(app);

    let mut engine: Engine<Persistence> = open_engine();
    resume_session(&mut engine);
    let resumed: SessionResponse = engine.get_session().unwrap();
    drop(engine);

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
    assert_eq!(resumed.session_id, started.session_id);
    assert_eq!(resumed.eligible_count, 3);
}
