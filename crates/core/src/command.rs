// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use songrank_domain::{CandidateId, PairId};

/// A command represents user intent as data only.
///
/// Commands are the only way to request session changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Remove a candidate from the lineup during selection.
    ExcludeCandidate {
        /// The candidate to exclude.
        candidate_id: CandidateId,
    },
    /// Return an excluded candidate to the lineup during selection.
    IncludeCandidate {
        /// The candidate to include.
        candidate_id: CandidateId,
    },
    /// Lock the lineup and start comparing.
    BeginComparing,
    /// Record the user's verdict on a live pair.
    SubmitDecision {
        /// The pair being decided.
        pair_id: PairId,
        /// The winner, or `None` for a tie.
        winner: Option<CandidateId>,
    },
    /// Record that the user declined to judge a live pair.
    SkipPair {
        /// The pair being skipped.
        pair_id: PairId,
    },
    /// Move to the results stage once the tournament is exhausted.
    FinishTournament,
}

impl Command {
    /// Returns the command name used in logs and events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ExcludeCandidate { .. } => "ExcludeCandidate",
            Self::IncludeCandidate { .. } => "IncludeCandidate",
            Self::BeginComparing => "BeginComparing",
            Self::SubmitDecision { .. } => "SubmitDecision",
            Self::SkipPair { .. } => "SkipPair",
            Self::FinishTournament => "FinishTournament",
        }
    }
}
