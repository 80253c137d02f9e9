// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use serde::{Deserialize, Serialize};
use songrank::{Progress, Rating};
use songrank_domain::{Candidate, CandidatePool, Pair, PairPhase, Stage};

/// API request to start a ranking session for an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    /// The catalog artist id.
    pub artist_id: String,
    /// Shuffle seed. A random seed is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Re-fetch the catalog even when a cached copy exists.
    #[serde(default)]
    pub refresh_catalog: bool,
}

/// Whether a state change reached the store.
///
/// When persistence fails after retries the session keeps running in
/// memory; `durable` is then false and `warning` explains why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Durability {
    /// Whether the change was persisted.
    pub durable: bool,
    /// Set when the change was not persisted.
    pub warning: Option<String>,
}

impl Durability {
    /// A change that was persisted.
    #[must_use]
    pub const fn persisted() -> Self {
        Self {
            durable: true,
            warning: None,
        }
    }

    /// A change that only lives in memory.
    #[must_use]
    pub const fn in_memory_only(warning: String) -> Self {
        Self {
            durable: false,
            warning: Some(warning),
        }
    }
}

/// API response describing the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The session identifier.
    pub session_id: String,
    /// The artist being ranked.
    pub artist_id: String,
    /// The current stage.
    pub stage: StageResponse,
    /// Number of candidates in the pool.
    pub candidate_count: usize,
    /// Number of eligible candidates.
    pub eligible_count: usize,
    /// Number of decisions recorded.
    pub decisions: usize,
    /// Persistence status of the last change.
    pub durability: Durability,
}

/// API response for the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResponse {
    /// Stage name.
    pub stage: Stage,
    /// 1-based step number.
    pub step: u8,
    /// Heading shown for the stage.
    pub title: String,
    /// Instruction shown for the stage.
    pub instruction: String,
}

impl From<Stage> for StageResponse {
    fn from(stage: Stage) -> Self {
        let (title, instruction): (&str, &str) = match stage {
            Stage::Selecting => (
                "Assemble the Lineup",
                "First, select the songs you like!",
            ),
            Stage::Comparing => ("Songs Showdown", "Now, choose the better songs!"),
            Stage::Results => ("Crown the Best!", "Compile the results!"),
        };
        Self {
            stage,
            step: stage.step(),
            title: title.to_string(),
            instruction: instruction.to_string(),
        }
    }
}

/// A candidate as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateInfo {
    /// Candidate identifier.
    pub candidate_id: String,
    /// Song title.
    pub display_name: String,
    /// Album (or single) the song came from.
    pub group_name: String,
    /// Position on that album.
    pub track_number: u32,
    /// Credited artists.
    pub artists: Vec<String>,
    /// Cover art URL, if any.
    pub cover_url: Option<String>,
    /// Whether the song is in the lineup.
    pub eligible: bool,
}

impl From<&Candidate> for CandidateInfo {
    fn from(candidate: &Candidate) -> Self {
        Self {
            candidate_id: candidate.id.value().to_string(),
            display_name: candidate.display_name.clone(),
            group_name: candidate.metadata.group_name.clone(),
            track_number: candidate.metadata.track_number,
            artists: candidate.metadata.artists.clone(),
            cover_url: candidate.metadata.cover.as_ref().map(|c| c.url.clone()),
            eligible: candidate.eligible,
        }
    }
}

/// API response for one page of the selection view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePageResponse {
    /// Zero-based page index.
    pub page: usize,
    /// Total number of pages.
    pub page_count: usize,
    /// Candidates on this page.
    pub candidates: Vec<CandidateInfo>,
    /// Number of eligible candidates across all pages.
    pub eligible_count: usize,
}

/// API response after toggling a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleCandidateResponse {
    /// The candidate that changed.
    pub candidate_id: String,
    /// Its new eligibility.
    pub eligible: bool,
    /// Number of eligible candidates after the change.
    pub eligible_count: usize,
    /// Persistence status.
    pub durability: Durability,
}

/// A pair as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairInfo {
    /// Pair identifier to send back with the decision.
    pub pair_id: String,
    /// The round that issued the pair.
    pub round: u32,
    /// Whether this is a regular or tie-break pair.
    pub phase: PairPhase,
    /// Members in presentation order.
    pub members: Vec<CandidateInfo>,
}

impl PairInfo {
    /// Builds the presentation form of a pair.
    ///
    /// Members missing from `pool` are dropped, which cannot happen for
    /// pairs issued from the same session.
    #[must_use]
    pub fn from_pair(pair: &Pair, pool: &CandidatePool) -> Self {
        Self {
            pair_id: pair.id.value().to_string(),
            round: pair.round,
            phase: pair.phase,
            members: pair
                .members
                .iter()
                .filter_map(|id| pool.get(id))
                .map(CandidateInfo::from)
                .collect(),
        }
    }
}

/// API response for the pair awaiting a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPairResponse {
    /// The pair, absent once the tournament is exhausted.
    pub pair: Option<PairInfo>,
    /// True when no further pair will be offered.
    pub exhausted: bool,
    /// Progress at this point.
    pub progress: ProgressResponse,
}

/// API request to decide a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitDecisionRequest {
    /// The pair being decided.
    pub pair_id: String,
    /// The preferred candidate, or `None` for a tie.
    #[serde(default)]
    pub winner_id: Option<String>,
}

/// API response after a decision or skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    /// False when the pair had already been decided; nothing changed.
    pub accepted: bool,
    /// The pair the request named.
    pub pair_id: String,
    /// The next pair to show, if any.
    pub next: CurrentPairResponse,
    /// Persistence status.
    pub durability: Durability,
}

/// One row of the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// 1-based rank.
    pub position: usize,
    /// Candidate identifier.
    pub candidate_id: String,
    /// Song title.
    pub display_name: String,
    /// Album the song came from.
    pub group_name: String,
    /// Cover art URL, if any.
    pub cover_url: Option<String>,
    /// Current score.
    pub score: f64,
    /// Decisions this song took part in.
    pub comparisons: u32,
    /// Decisive wins.
    pub wins: u32,
    /// Decisive losses.
    pub losses: u32,
    /// Ties.
    pub ties: u32,
}

impl RankingEntry {
    /// Combines a rating with its candidate's presentation fields.
    #[must_use]
    pub fn new(position: usize, rating: &Rating, candidate: Option<&Candidate>) -> Self {
        Self {
            position,
            candidate_id: rating.candidate_id.value().to_string(),
            display_name: candidate.map_or_else(
                || rating.candidate_id.value().to_string(),
                |c| c.display_name.clone(),
            ),
            group_name: candidate
                .map(|c| c.metadata.group_name.clone())
                .unwrap_or_default(),
            cover_url: candidate.and_then(|c| c.metadata.cover.as_ref().map(|a| a.url.clone())),
            score: rating.score,
            comparisons: rating.comparisons,
            wins: rating.wins,
            losses: rating.losses,
            ties: rating.ties,
        }
    }
}

/// API response for the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    /// The stage the ranking was taken in.
    pub stage: Stage,
    /// True once the session reached results.
    pub is_final: bool,
    /// Entries, best first.
    pub entries: Vec<RankingEntry>,
}

/// API response after finishing the tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishResponse {
    /// The final ranking.
    pub ranking: RankingResponse,
    /// Persistence status.
    pub durability: Durability,
}

/// API response for progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressResponse {
    /// Current stage.
    pub stage: Stage,
    /// 1-based step number.
    pub step: u8,
    /// Current round, zero before comparing.
    pub round: u32,
    /// Round cap.
    pub round_limit: u32,
    /// Decisions recorded.
    pub decisions: usize,
    /// Eligible candidates.
    pub eligible: usize,
    /// Candidates that reached the comparison target.
    pub satisfied: usize,
    /// The comparison target per candidate.
    pub min_comparisons: u32,
    /// True when no further pair will be offered.
    pub exhausted: bool,
    /// Share of candidates that reached the target, from 0 to 100.
    pub percent_complete: u8,
}

impl From<Progress> for ProgressResponse {
    fn from(progress: Progress) -> Self {
        let percent_complete: u8 = if progress.exhausted {
            100
        } else if progress.eligible == 0 {
            0
        } else {
            u8::try_from(progress.satisfied.saturating_mul(100) / progress.eligible)
                .unwrap_or(100)
                .min(99)
        };
        Self {
            stage: progress.stage,
            step: progress.step,
            round: progress.round,
            round_limit: progress.round_limit,
            decisions: progress.decisions,
            eligible: progress.eligible,
            satisfied: progress.satisfied,
            min_comparisons: progress.min_comparisons,
            exhausted: progress.exhausted,
            percent_complete,
        }
    }
}
