// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use songrank_api::{
    ApiError, CandidatePageResponse, CurrentPairResponse, DecisionResponse, Durability, Engine,
    FinishResponse, ProgressResponse, RankingResponse, SessionResponse, StageResponse,
    StartSessionRequest, SubmitDecisionRequest, ToggleCandidateResponse,
};
use songrank_catalog::{ArtistCatalog, Catalog, SpotifyClient, SpotifyCredentials};
use songrank_domain::{TournamentConfig, validate_tournament_config};
use songrank_persistence::{Persistence, RetryPolicy, SessionRepository};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// `SongRank` Server - HTTP server for ranking an artist's songs by pairwise comparison
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "SONGRANK_DATABASE")]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Spotify application client id
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    spotify_client_id: String,

    /// Spotify application client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    spotify_client_secret: String,

    /// Comparisons each song should receive before results are available
    #[arg(long, default_value_t = songrank_domain::DEFAULT_MIN_COMPARISONS)]
    min_comparisons: u32,

    /// Hard cap on rounds; derived from the pool size when absent
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Rematches allowed for a pair that drew or was skipped
    #[arg(long, default_value_t = songrank_domain::DEFAULT_MAX_TIE_BREAKS)]
    max_tie_breaks: u32,
}

impl Args {
    /// Builds the tournament tuning from the command line.
    fn tournament_config(&self) -> TournamentConfig {
        TournamentConfig {
            min_comparisons: self.min_comparisons,
            max_rounds: self.max_rounds,
            max_tie_breaks: self.max_tie_breaks,
            ..TournamentConfig::default()
        }
    }
}

/// Application state shared across handlers.
///
/// The engine sits behind a single async mutex, so commands against the
/// session are processed one at a time.
struct AppState<C> {
    /// The ranking engine and its store.
    engine: Arc<Mutex<Engine<Persistence>>>,
    /// The catalog used to build candidate pools.
    catalog: Arc<C>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

/// Query parameters for listing candidates.
#[derive(Debug, Deserialize)]
struct CandidatePageQuery {
    /// Zero-based page index.
    #[serde(default)]
    page: usize,
}

/// API response for listing cached catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedCatalogsResponse {
    /// Artist ids with a cached catalog.
    artist_ids: Vec<String>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::NoActiveSession | ApiError::StoredSessionUnusable { .. } => {
                StatusCode::CONFLICT
            }
            ApiError::CatalogAuthenticationFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::CatalogUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Handler for POST /sessions endpoint.
///
/// Loads the artist's catalog (from cache unless a refresh is requested)
/// and replaces any active session with a fresh one.
async fn handle_start_session<C: Catalog + Send + Sync + 'static>(
    AxumState(app_state): AxumState<AppState<C>>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<SessionResponse>, HttpError> {
    info!(
        artist_id = %req.artist_id,
        refresh = req.refresh_catalog,
        "Handling start_session request"
    );

    let mut engine = app_state.engine.lock().await;
    let catalog: ArtistCatalog = engine
        .load_catalog(app_state.catalog.as_ref(), &req.artist_id, req.refresh_catalog)
        .await?;
    let response: SessionResponse = engine.start_session(&catalog, &req)?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for GET /session endpoint.
async fn handle_get_session<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Json<SessionResponse>, HttpError> {
    let engine = app_state.engine.lock().await;
    let response: SessionResponse = engine.get_session()?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for DELETE /session endpoint.
///
/// Discards the active session. Always succeeds; the body reports whether
/// the stored copy was removed too.
async fn handle_restart<C>(AxumState(app_state): AxumState<AppState<C>>) -> Json<Durability> {
    info!("Handling restart request");

    let mut engine = app_state.engine.lock().await;
    let durability: Durability = engine.restart();
    drop(engine);

    Json(durability)
}

/// Handler for GET /stage endpoint.
async fn handle_get_stage<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Json<StageResponse>, HttpError> {
    let engine = app_state.engine.lock().await;
    let response: StageResponse = engine.get_stage()?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for GET /candidates endpoint.
async fn handle_list_candidates<C>(
    AxumState(app_state): AxumState<AppState<C>>,
    Query(params): Query<CandidatePageQuery>,
) -> Result<Json<CandidatePageResponse>, HttpError> {
    let engine = app_state.engine.lock().await;
    let response: CandidatePageResponse = engine.list_candidates(params.page)?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for POST `/candidates/{candidate_id}/toggle` endpoint.
async fn handle_toggle_candidate<C>(
    AxumState(app_state): AxumState<AppState<C>>,
    Path(candidate_id): Path<String>,
) -> Result<Json<ToggleCandidateResponse>, HttpError> {
    info!(candidate_id = %candidate_id, "Handling toggle_candidate request");

    let mut engine = app_state.engine.lock().await;
    let response: ToggleCandidateResponse = engine.toggle_candidate(&candidate_id)?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for POST /compare endpoint.
///
/// Locks the lineup and opens the first round.
async fn handle_begin_comparing<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Json<SessionResponse>, HttpError> {
    info!("Handling begin_comparing request");

    let mut engine = app_state.engine.lock().await;
    let response: SessionResponse = engine.begin_comparing()?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for GET /pair endpoint.
async fn handle_get_current_pair<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Json<CurrentPairResponse>, HttpError> {
    let engine = app_state.engine.lock().await;
    let response: CurrentPairResponse = engine.get_current_pair()?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for POST /decisions endpoint.
///
/// A `null` winner records a tie.
async fn handle_submit_decision<C>(
    AxumState(app_state): AxumState<AppState<C>>,
    Json(req): Json<SubmitDecisionRequest>,
) -> Result<Json<DecisionResponse>, HttpError> {
    info!(
        pair_id = %req.pair_id,
        winner_id = ?req.winner_id,
        "Handling submit_decision request"
    );

    let mut engine = app_state.engine.lock().await;
    let response: DecisionResponse = engine.submit_decision(&req)?;
    drop(engine);

    if !response.durability.durable {
        warn!(pair_id = %response.pair_id, "Decision recorded in memory only");
    }

    Ok(Json(response))
}

/// Handler for POST `/pairs/{pair_id}/skip` endpoint.
async fn handle_skip_pair<C>(
    AxumState(app_state): AxumState<AppState<C>>,
    Path(pair_id): Path<String>,
) -> Result<Json<DecisionResponse>, HttpError> {
    info!(pair_id = %pair_id, "Handling skip_pair request");

    let mut engine = app_state.engine.lock().await;
    let response: DecisionResponse = engine.skip_pair(&pair_id)?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for GET /ranking endpoint.
///
/// Partial standings while comparing, final standings once results are shown.
async fn handle_get_ranking<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Json<RankingResponse>, HttpError> {
    let engine = app_state.engine.lock().await;
    let response: RankingResponse = engine.get_ranking()?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for GET /ranking.csv endpoint.
async fn handle_export_ranking<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Response, HttpError> {
    let engine = app_state.engine.lock().await;
    let csv: String = engine.export_ranking_csv()?;
    drop(engine);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ranking.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// Handler for GET /progress endpoint.
async fn handle_get_progress<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Json<ProgressResponse>, HttpError> {
    let engine = app_state.engine.lock().await;
    let response: ProgressResponse = engine.progress()?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for POST /results endpoint.
async fn handle_finish<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Json<FinishResponse>, HttpError> {
    info!("Handling finish request");

    let mut engine = app_state.engine.lock().await;
    let response: FinishResponse = engine.finish()?;
    drop(engine);

    Ok(Json(response))
}

/// Handler for GET /catalogs endpoint.
async fn handle_list_cached_catalogs<C>(
    AxumState(app_state): AxumState<AppState<C>>,
) -> Result<Json<CachedCatalogsResponse>, HttpError> {
    let mut engine = app_state.engine.lock().await;
    let artist_ids: Vec<String> = engine.cached_artists()?;
    drop(engine);

    Ok(Json(CachedCatalogsResponse { artist_ids }))
}

/// Builds the application router with all endpoints.
fn build_router<C: Catalog + Send + Sync + 'static>(app_state: AppState<C>) -> Router {
    Router::new()
        .route("/sessions", post(handle_start_session::<C>))
        .route(
            "/session",
            get(handle_get_session::<C>).delete(handle_restart::<C>),
        )
        .route("/stage", get(handle_get_stage::<C>))
        .route("/candidates", get(handle_list_candidates::<C>))
        .route(
            "/candidates/{candidate_id}/toggle",
            post(handle_toggle_candidate::<C>),
        )
        .route("/compare", post(handle_begin_comparing::<C>))
        .route("/pair", get(handle_get_current_pair::<C>))
        .route("/decisions", post(handle_submit_decision::<C>))
        .route("/pairs/{pair_id}/skip", post(handle_skip_pair::<C>))
        .route("/ranking", get(handle_get_ranking::<C>))
        .route("/ranking.csv", get(handle_export_ranking::<C>))
        .route("/progress", get(handle_get_progress::<C>))
        .route("/results", post(handle_finish::<C>))
        .route("/catalogs", get(handle_list_cached_catalogs::<C>))
        .with_state(app_state)
}

/// Restores the stored session, if any.
///
/// An unreadable snapshot is logged and left in place; the server starts
/// without a session and a new one can be started over it.
fn resume_session(engine: &mut Engine<Persistence>) {
    match engine.resume() {
        Ok(Some(session)) => info!(
            session_id = %session.session_id,
            artist_id = %session.artist_id,
            stage = %session.stage.stage,
            decisions = session.decisions,
            "Resumed stored session"
        ),
        Ok(None) => info!("No stored session to resume"),
        Err(err) => error!(error = %err, "Stored session could not be resumed"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing SongRank Server");

    let config: TournamentConfig = args.tournament_config();
    validate_tournament_config(&config)?;

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database; sessions will not survive a restart");
        Persistence::new_in_memory()?
    };

    let mut engine: Engine<Persistence> = Engine::new(
        SessionRepository::new(persistence, RetryPolicy::default()),
        config,
    );
    resume_session(&mut engine);

    let catalog: SpotifyClient = SpotifyClient::new(SpotifyCredentials {
        client_id: args.spotify_client_id.clone(),
        client_secret: args.spotify_client_secret.clone(),
    })?;

    let app_state: AppState<SpotifyClient> = AppState {
        engine: Arc::new(Mutex::new(engine)),
        catalog: Arc::new(catalog),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
