// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::aggregator::{Rating, Standings};
use crate::error::CoreError;
use crate::scheduler::{Next, PairingScheduler};
use serde::{Deserialize, Serialize};
use songrank_domain::{
    CandidateId, CandidatePool, Decision, Stage, TournamentConfig, validate_tournament_config,
};
use songrank_ledger::Ledger;

/// Scheduler and standings of a session that has started comparing.
///
/// Neither is persisted; both are rebuilt from the pool and the ledger.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tournament {
    pub(crate) scheduler: PairingScheduler,
    pub(crate) standings: Standings,
}

impl Tournament {
    pub(crate) fn start(session: &Session) -> Self {
        let candidates: Vec<CandidateId> = session.pool.eligible_ids();
        let standings: Standings = Standings::new(&candidates, &session.config);
        let scheduler: PairingScheduler =
            PairingScheduler::new(candidates, session.config, session.seed);
        Self {
            scheduler,
            standings,
        }
    }

    pub(crate) fn rebuild(session: &Session) -> Result<Self, CoreError> {
        let (scheduler, standings) = PairingScheduler::replay(
            session.pool.eligible_ids(),
            session.config,
            session.seed,
            session.ledger.replay(),
        )?;
        Ok(Self {
            scheduler,
            standings,
        })
    }
}

/// One user's ranking session for one artist.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Session identifier.
    pub id: String,
    /// The artist whose catalog is being ranked.
    pub artist_id: String,
    /// Seed for every shuffle in this session.
    pub seed: u64,
    /// Current stage.
    pub stage: Stage,
    /// The candidate pool.
    pub pool: CandidatePool,
    /// Every decision so far.
    pub ledger: Ledger,
    /// Tournament tuning, fixed at creation.
    pub config: TournamentConfig,
    pub(crate) tournament: Option<Tournament>,
}

impl Session {
    /// Creates a session in the selection stage.
    ///
    /// # Arguments
    ///
    /// * `id` - Session identifier
    /// * `artist_id` - The artist being ranked
    /// * `pool` - Candidates built from the artist's catalog
    /// * `config` - Tournament tuning
    /// * `seed` - Shuffle seed
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        id: String,
        artist_id: String,
        pool: CandidatePool,
        config: TournamentConfig,
        seed: u64,
    ) -> Result<Self, CoreError> {
        validate_tournament_config(&config)?;
        Ok(Self {
            id,
            artist_id,
            seed,
            stage: Stage::Selecting,
            pool,
            ledger: Ledger::new(),
            config,
            tournament: None,
        })
    }

    /// Returns the scheduler once comparing has begun.
    #[must_use]
    pub fn scheduler(&self) -> Option<&PairingScheduler> {
        self.tournament.as_ref().map(|t| &t.scheduler)
    }

    /// Returns the standings once comparing has begun.
    #[must_use]
    pub fn standings(&self) -> Option<&Standings> {
        self.tournament.as_ref().map(|t| &t.standings)
    }

    /// Returns the pair awaiting a decision.
    ///
    /// Before comparing begins there is nothing to offer, which reads as
    /// `Exhausted` to callers that only poll.
    #[must_use]
    pub fn current_pair(&self) -> Next<'_> {
        self.scheduler().map_or(Next::Exhausted, PairingScheduler::poll)
    }

    /// Returns the current ranking.
    ///
    /// During selection every eligible candidate is listed at the base
    /// score; afterwards the standings are partial until results.
    #[must_use]
    pub fn ranking(&self) -> Vec<Rating> {
        match self.standings() {
            Some(standings) => standings.ranking(),
            None => Standings::new(&self.pool.eligible_ids(), &self.config).ranking(),
        }
    }

    /// Returns a progress summary.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let eligible: usize = self.pool.eligible_count();
        let (round, round_limit, satisfied, exhausted) = self.scheduler().map_or_else(
            || (0, self.config.round_limit(eligible), 0, false),
            |s| {
                (
                    s.round(),
                    s.round_limit(),
                    s.satisfied_count(),
                    s.is_exhausted(),
                )
            },
        );
        Progress {
            stage: self.stage,
            step: self.stage.step(),
            round,
            round_limit,
            decisions: self.ledger.len(),
            eligible,
            satisfied,
            min_comparisons: self.config.min_comparisons,
            exhausted,
        }
    }

    /// Returns the decisions in ledger order.
    #[must_use]
    pub fn decisions(&self) -> &[Decision] {
        self.ledger.replay()
    }
}

/// A summary of how far along a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Current stage.
    pub stage: Stage,
    /// Visible step number of the stage (1-3).
    pub step: u8,
    /// Current round (0 before comparing).
    pub round: u32,
    /// Round cap.
    pub round_limit: u32,
    /// Decisions recorded.
    pub decisions: usize,
    /// Eligible candidates.
    pub eligible: usize,
    /// Candidates that reached `min_comparisons`.
    pub satisfied: usize,
    /// The configured minimum.
    pub min_comparisons: u32,
    /// Whether the scheduler is exhausted.
    pub exhausted: bool,
}

/// What a successful transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A candidate left the lineup.
    CandidateExcluded(CandidateId),
    /// A candidate returned to the lineup.
    CandidateIncluded(CandidateId),
    /// The lineup was locked and the first round planned.
    ComparingBegan {
        /// Eligible candidates.
        eligible: usize,
        /// Round cap.
        round_limit: u32,
    },
    /// A decision was appended to the ledger.
    DecisionRecorded {
        /// The decision.
        decision: Decision,
        /// Whether the scheduler is now exhausted.
        exhausted: bool,
    },
    /// The session moved to results.
    TournamentFinished {
        /// Decisions recorded.
        decisions: usize,
    },
}

impl SessionEvent {
    /// Returns the event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CandidateExcluded(_) => "CandidateExcluded",
            Self::CandidateIncluded(_) => "CandidateIncluded",
            Self::ComparingBegan { .. } => "ComparingBegan",
            Self::DecisionRecorded { .. } => "DecisionRecorded",
            Self::TournamentFinished { .. } => "TournamentFinished",
        }
    }

    /// Returns whether the event changed the stage.
    #[must_use]
    pub const fn is_stage_change(&self) -> bool {
        matches!(
            self,
            Self::ComparingBegan { .. } | Self::TournamentFinished { .. }
        )
    }
}

/// The result of a successful transition.
///
/// Transitions are atomic: they either succeed completely or fail without
/// side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The session after the transition.
    pub session: Session,
    /// What happened.
    pub event: SessionEvent,
}
