// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use songrank_domain::{CandidateId, DomainError, PairId, Stage};
use songrank_ledger::LedgerError;

/// Errors raised by the pairing scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The tournament is over and no further pair will be issued.
    Exhausted,
    /// The pair is not currently live (never issued, or already decided).
    PairNotLive(PairId),
    /// A decision names different members than the pair that was issued.
    MembersMismatch(PairId),
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted => write!(f, "The tournament has no further pairs to compare"),
            Self::PairNotLive(id) => write!(f, "Pair '{id}' is not awaiting a decision"),
            Self::MembersMismatch(id) => {
                write!(f, "Decision members do not match issued pair '{id}'")
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Errors that can occur during session transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The ledger rejected a decision.
    Ledger(LedgerError),
    /// The scheduler rejected a request.
    Scheduler(SchedulerError),
    /// Comparing cannot begin with fewer than two eligible candidates.
    InsufficientCandidates {
        /// Number of eligible candidates.
        eligible: usize,
    },
    /// Results cannot be shown before the scheduler is exhausted.
    TournamentIncomplete {
        /// The round in progress.
        round: u32,
        /// Decisions recorded so far.
        decisions: usize,
    },
    /// The command is not valid in the current stage.
    WrongStage {
        /// The stage the command requires.
        expected: Stage,
        /// The session's stage.
        actual: Stage,
    },
    /// The pair id does not name a pair that was issued.
    UnknownPair(PairId),
    /// The submitted winner is not a member of the pair.
    WinnerNotInPair {
        /// The pair being decided.
        pair_id: PairId,
        /// The submitted winner.
        winner: CandidateId,
    },
    /// A stored snapshot was written by an unknown schema version.
    UnsupportedSchemaVersion {
        /// The version found in the snapshot.
        found: u32,
        /// The newest version this build reads.
        supported: u32,
    },
    /// A stored snapshot could not be decoded or is inconsistent.
    InvalidSnapshot(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Ledger(err) => write!(f, "Ledger error: {err}"),
            Self::Scheduler(err) => write!(f, "Scheduler error: {err}"),
            Self::InsufficientCandidates { eligible } => write!(
                f,
                "At least 2 eligible candidates are required to start comparing, found {eligible}"
            ),
            Self::TournamentIncomplete { round, decisions } => write!(
                f,
                "Tournament is still in progress (round {round}, {decisions} decisions)"
            ),
            Self::WrongStage { expected, actual } => {
                write!(f, "Operation requires stage {expected}, session is in {actual}")
            }
            Self::UnknownPair(id) => write!(f, "Pair '{id}' was not issued"),
            Self::WinnerNotInPair { pair_id, winner } => {
                write!(f, "Candidate '{winner}' is not a member of pair '{pair_id}'")
            }
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "Session snapshot schema version {found} is not supported (newest supported: {supported})"
            ),
            Self::InvalidSnapshot(msg) => write!(f, "Invalid session snapshot: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<LedgerError> for CoreError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<SchedulerError> for CoreError {
    fn from(err: SchedulerError) -> Self {
        Self::Scheduler(err)
    }
}
