// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The presentation boundary.
//!
//! `Engine` owns the live session and its repository. Every mutating
//! operation follows the same path:
//!
//! 1. Translate the request into a core `Command`
//! 2. Apply it to the current session via `apply`
//! 3. Checkpoint the new session through the repository
//! 4. Report the outcome with its durability
//!
//! A failed checkpoint never rolls back the transition; the session keeps
//! running in memory and the response says so.

use std::collections::HashMap;

use songrank::{Command, CoreError, Next, Session, Transition, apply};
use songrank_catalog::{ArtistCatalog, Catalog, load_artist_catalog};
use songrank_domain::{
    CandidateId, CandidatePool, CoverArt, PairId, SELECTION_PAGE_SIZE, SelectionPage,
    SourceTrack, Stage, TournamentConfig, build_pool, parse_candidate_id,
};
use songrank_ledger::LedgerError;
use songrank_persistence::{KeyValueStore, SessionRepository};
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::csv_export::ranking_to_csv;
use crate::error::{
    ApiError, translate_catalog_error, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
use crate::request_response::{
    CandidateInfo, CandidatePageResponse, CurrentPairResponse, DecisionResponse, Durability,
    FinishResponse, PairInfo, ProgressResponse, RankingEntry, RankingResponse, SessionResponse,
    StageResponse, StartSessionRequest, SubmitDecisionRequest, ToggleCandidateResponse,
};

/// Drives one ranking session on behalf of the presentation layer.
#[derive(Debug)]
pub struct Engine<S: KeyValueStore> {
    repository: SessionRepository<S>,
    config: TournamentConfig,
    session: Option<Session>,
    durability: Durability,
}

impl<S: KeyValueStore> Engine<S> {
    /// Creates an engine with no active session.
    ///
    /// # Arguments
    ///
    /// * `repository` - Where sessions and catalogs are stored
    /// * `config` - Tuning for sessions started by this engine
    #[must_use]
    pub fn new(repository: SessionRepository<S>, config: TournamentConfig) -> Self {
        Self {
            repository,
            config,
            session: None,
            durability: Durability::default(),
        }
    }

    /// Returns the active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns the tuning used for new sessions.
    #[must_use]
    pub const fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Restores the persisted session, replaying its ledger.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SessionResponse))` when a session was restored
    /// * `Ok(None)` when nothing was stored
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read, or the stored session
    /// has an unsupported schema version or fails to replay.
    pub fn resume(&mut self) -> Result<Option<SessionResponse>, ApiError> {
        let Some(session) = self
            .repository
            .load_session()
            .map_err(translate_persistence_error)?
        else {
            return Ok(None);
        };

        self.durability = Durability::persisted();
        let response: SessionResponse = describe(&session, self.durability.clone());
        self.session = Some(session);
        Ok(Some(response))
    }

    /// Returns the catalog for an artist, from cache when possible.
    ///
    /// A freshly fetched catalog is written to the cache. Cache failures
    /// are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the artist id is empty, or the catalog cannot be
    /// fetched. Authentication failures are reported as such and need new
    /// credentials.
    pub async fn load_catalog<C: Catalog + Sync>(
        &mut self,
        catalog: &C,
        artist_id: &str,
        refresh: bool,
    ) -> Result<ArtistCatalog, ApiError> {
        let artist_id: &str = artist_id.trim();
        if artist_id.is_empty() {
            return Err(ApiError::InvalidInput {
                field: String::from("artist_id"),
                message: String::from("Artist id cannot be empty"),
            });
        }

        if !refresh {
            match self.repository.cached_catalog::<ArtistCatalog>(artist_id) {
                Ok(Some(cached)) => {
                    debug!(artist_id, "Using cached catalog");
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(err) => warn!(artist_id, error = %err, "Catalog cache read failed"),
            }
        }

        let loaded: ArtistCatalog = load_artist_catalog(catalog, artist_id)
            .await
            .map_err(|err| {
                if err.is_auth() {
                    error!(artist_id, error = %err, "Catalog authentication failed");
                }
                translate_catalog_error(err)
            })?;

        if let Err(err) = self.repository.cache_catalog(artist_id, &loaded) {
            warn!(artist_id, error = %err, "Catalog cache write failed");
        }
        Ok(loaded)
    }

    /// Starts a new session from a loaded catalog, replacing any current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog yields fewer than two distinct songs.
    /// The current session, if any, is left untouched in that case.
    pub fn start_session(
        &mut self,
        catalog: &ArtistCatalog,
        request: &StartSessionRequest,
    ) -> Result<SessionResponse, ApiError> {
        let (tracks, covers): (Vec<SourceTrack>, HashMap<String, CoverArt>) =
            catalog.to_source();
        let pool: CandidatePool = build_pool(&tracks, &covers).map_err(translate_domain_error)?;

        let seed: u64 = request.seed.unwrap_or_else(rand::random::<u64>);
        let session_id: String = format!("{:016x}", rand::random::<u64>());
        let session: Session = Session::new(
            session_id,
            catalog.artist.id.clone(),
            pool,
            self.config,
            seed,
        )
        .map_err(translate_core_error)?;

        info!(
            session_id = %session.id,
            artist_id = %session.artist_id,
            candidates = session.pool.len(),
            seed,
            "Session started"
        );
        let durability: Durability = self.commit(session);
        self.active().map(|session| describe(session, durability))
    }

    /// Returns the current stage.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active.
    pub fn get_stage(&self) -> Result<StageResponse, ApiError> {
        Ok(StageResponse::from(self.active()?.stage))
    }

    /// Returns a summary of the active session.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active.
    pub fn get_session(&self) -> Result<SessionResponse, ApiError> {
        Ok(describe(self.active()?, self.durability.clone()))
    }

    /// Returns one page of the shuffled selection view.
    ///
    /// The order is fixed by the session seed, so pages are stable across
    /// requests and restarts of the server.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active.
    pub fn list_candidates(&self, page: usize) -> Result<CandidatePageResponse, ApiError> {
        let session: &Session = self.active()?;
        let view: SelectionPage<'_> = session
            .pool
            .selection_page(session.seed, page, SELECTION_PAGE_SIZE)
            .map_err(translate_domain_error)?;

        Ok(CandidatePageResponse {
            page: view.page,
            page_count: view.page_count,
            candidates: view.candidates.into_iter().map(CandidateInfo::from).collect(),
            eligible_count: session.pool.eligible_count(),
        })
    }

    /// Adds a song to the lineup or removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No session is active
    /// - The candidate id is empty or unknown
    /// - The lineup is locked because comparing has begun
    pub fn toggle_candidate(
        &mut self,
        candidate_id: &str,
    ) -> Result<ToggleCandidateResponse, ApiError> {
        let candidate_id: CandidateId =
            parse_candidate_id(candidate_id).map_err(translate_domain_error)?;
        let session: &Session = self.active()?;
        let currently_eligible: bool = session
            .pool
            .get(&candidate_id)
            .map(|c| c.eligible)
            .ok_or_else(|| ApiError::ResourceNotFound {
                resource_type: String::from("Candidate"),
                message: format!("Candidate '{candidate_id}' is not in this session"),
            })?;

        let command: Command = if currently_eligible {
            Command::ExcludeCandidate {
                candidate_id: candidate_id.clone(),
            }
        } else {
            Command::IncludeCandidate {
                candidate_id: candidate_id.clone(),
            }
        };
        let transition: Transition = apply(session, command, OffsetDateTime::now_utc())
            .map_err(translate_core_error)?;
        debug!(candidate_id = %candidate_id, event = transition.event.name(), "Lineup changed");

        let durability: Durability = self.commit(transition.session);
        let session: &Session = self.active()?;
        Ok(ToggleCandidateResponse {
            candidate_id: candidate_id.value().to_string(),
            eligible: !currently_eligible,
            eligible_count: session.pool.eligible_count(),
            durability,
        })
    }

    /// Locks the lineup and starts the showdown.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active, the session is past
    /// selection, or fewer than two songs are selected.
    pub fn begin_comparing(&mut self) -> Result<SessionResponse, ApiError> {
        let transition: Transition = apply(
            self.active()?,
            Command::BeginComparing,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_core_error)?;

        let durability: Durability = self.commit(transition.session);
        self.active().map(|session| describe(session, durability))
    }

    /// Returns the pair awaiting a decision, or that the tournament is over.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active or it is still selecting.
    pub fn get_current_pair(&self) -> Result<CurrentPairResponse, ApiError> {
        let session: &Session = self.active()?;
        if session.stage == Stage::Selecting {
            return Err(translate_core_error(CoreError::WrongStage {
                expected: Stage::Comparing,
                actual: session.stage,
            }));
        }
        Ok(current_pair(session))
    }

    /// Records the user's verdict on a pair.
    ///
    /// Deciding a pair that was already decided is not an error: nothing
    /// changes and the response has `accepted: false`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No session is active or it is not comparing
    /// - The pair id or winner id is empty
    /// - The pair is not awaiting a decision
    /// - The winner is not a member of the pair
    pub fn submit_decision(
        &mut self,
        request: &SubmitDecisionRequest,
    ) -> Result<DecisionResponse, ApiError> {
        let pair_id: PairId = parse_pair_id(&request.pair_id)?;
        let winner: Option<CandidateId> = request
            .winner_id
            .as_deref()
            .map(parse_candidate_id)
            .transpose()
            .map_err(translate_domain_error)?;

        self.record(
            Command::SubmitDecision {
                pair_id: pair_id.clone(),
                winner,
            },
            &pair_id,
        )
    }

    /// Records that the user declined to judge a pair.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as `submit_decision`.
    pub fn skip_pair(&mut self, pair_id: &str) -> Result<DecisionResponse, ApiError> {
        let pair_id: PairId = parse_pair_id(pair_id)?;
        self.record(
            Command::SkipPair {
                pair_id: pair_id.clone(),
            },
            &pair_id,
        )
    }

    /// Returns the ranking, partial until the session reaches results.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active.
    pub fn get_ranking(&self) -> Result<RankingResponse, ApiError> {
        Ok(ranking(self.active()?))
    }

    /// Returns progress through the session.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active.
    pub fn progress(&self) -> Result<ProgressResponse, ApiError> {
        Ok(ProgressResponse::from(self.active()?.progress()))
    }

    /// Moves to results once the tournament is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active, it is not comparing, or
    /// pairs are still outstanding.
    pub fn finish(&mut self) -> Result<FinishResponse, ApiError> {
        let transition: Transition = apply(
            self.active()?,
            Command::FinishTournament,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_core_error)?;

        let durability: Durability = self.commit(transition.session);
        Ok(FinishResponse {
            ranking: ranking(self.active()?),
            durability,
        })
    }

    /// Discards the session, in memory and in the store.
    ///
    /// Cached catalogs are kept.
    ///
    /// # Returns
    ///
    /// Whether the stored copy was removed. A stored copy that could not be
    /// removed will be offered again by `resume`.
    pub fn restart(&mut self) -> Durability {
        if let Some(session) = self.session.take() {
            info!(session_id = %session.id, "Session discarded");
        }
        self.durability = match self.repository.clear_session() {
            Ok(_) => Durability::persisted(),
            Err(err) => {
                warn!(error = %err, "Failed to remove stored session");
                Durability::in_memory_only(format!(
                    "The previous session could not be removed from storage: {err}"
                ))
            }
        };
        self.durability.clone()
    }

    /// Renders the current ranking as CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active or the CSV writer fails.
    pub fn export_ranking_csv(&self) -> Result<String, ApiError> {
        ranking_to_csv(&ranking(self.active()?).entries)
    }

    /// Lists artists whose catalogs are cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn cached_artists(&mut self) -> Result<Vec<String>, ApiError> {
        self.repository
            .cached_artists()
            .map_err(translate_persistence_error)
    }

    fn active(&self) -> Result<&Session, ApiError> {
        self.session.as_ref().ok_or(ApiError::NoActiveSession)
    }

    /// Applies a decision or skip and reports the next pair.
    fn record(&mut self, command: Command, pair_id: &PairId) -> Result<DecisionResponse, ApiError> {
        let outcome: Result<Transition, CoreError> =
            apply(self.active()?, command, OffsetDateTime::now_utc());

        let (accepted, durability): (bool, Durability) = match outcome {
            Ok(transition) => {
                debug!(pair_id = %pair_id, event = transition.event.name(), "Decision applied");
                (true, self.commit(transition.session))
            }
            Err(CoreError::Ledger(LedgerError::DuplicatePair(duplicate))) => {
                warn!(pair_id = %duplicate, "Ignoring duplicate decision");
                (false, self.durability.clone())
            }
            Err(err) => return Err(translate_core_error(err)),
        };

        Ok(DecisionResponse {
            accepted,
            pair_id: pair_id.value().to_string(),
            next: current_pair(self.active()?),
            durability,
        })
    }

    /// Makes `session` current and checkpoints it.
    fn commit(&mut self, session: Session) -> Durability {
        let durability: Durability = match self.repository.save_session(&session) {
            Ok(()) => Durability::persisted(),
            Err(err) => {
                warn!(
                    session_id = %session.id,
                    error = %err,
                    "Session change kept in memory only"
                );
                Durability::in_memory_only(format!("Progress could not be saved: {err}"))
            }
        };
        self.session = Some(session);
        self.durability = durability.clone();
        durability
    }
}

fn parse_pair_id(value: &str) -> Result<PairId, ApiError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("pair_id"),
            message: String::from("Pair id cannot be empty"),
        });
    }
    Ok(PairId::new(trimmed))
}

fn describe(session: &Session, durability: Durability) -> SessionResponse {
    SessionResponse {
        session_id: session.id.clone(),
        artist_id: session.artist_id.clone(),
        stage: StageResponse::from(session.stage),
        candidate_count: session.pool.len(),
        eligible_count: session.pool.eligible_count(),
        decisions: session.ledger.len(),
        durability,
    }
}

fn current_pair(session: &Session) -> CurrentPairResponse {
    let pair: Option<PairInfo> = match session.current_pair() {
        Next::Pair(pair) => Some(PairInfo::from_pair(pair, &session.pool)),
        Next::Exhausted => None,
    };
    CurrentPairResponse {
        exhausted: pair.is_none(),
        pair,
        progress: ProgressResponse::from(session.progress()),
    }
}

fn ranking(session: &Session) -> RankingResponse {
    let entries: Vec<RankingEntry> = session
        .ranking()
        .iter()
        .enumerate()
        .map(|(i, rating)| RankingEntry::new(i + 1, rating, session.pool.get(&rating.candidate_id)))
        .collect();
    RankingResponse {
        stage: session.stage,
        is_final: session.stage == Stage::Results,
        entries,
    }
}
