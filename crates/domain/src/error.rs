// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{CandidateId, Stage};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The pool has fewer than two eligible candidates.
    EmptyPool {
        /// The number of eligible candidates found.
        eligible: usize,
    },
    /// A source track is missing a required field.
    InvalidSourceTrack {
        /// The offending track id (may be empty).
        track_id: String,
        /// Description of the problem.
        reason: String,
    },
    /// Candidate identifier is empty or invalid.
    InvalidCandidateId(String),
    /// The candidate does not exist in the pool.
    CandidateNotFound(CandidateId),
    /// A stage name could not be parsed.
    InvalidStage(String),
    /// The requested stage transition is not allowed.
    InvalidStageTransition {
        /// The current stage.
        from: Stage,
        /// The requested stage.
        to: Stage,
    },
    /// The candidate set can no longer be changed.
    SelectionLocked {
        /// The current stage.
        stage: Stage,
    },
    /// Tournament configuration is invalid.
    InvalidConfig {
        /// The offending field.
        field: &'static str,
        /// Description of the problem.
        reason: String,
    },
    /// Selection page size must be positive.
    InvalidPageSize(usize),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPool { eligible } => write!(
                f,
                "Candidate pool needs at least 2 eligible candidates, found {eligible}"
            ),
            Self::InvalidSourceTrack { track_id, reason } => {
                write!(f, "Invalid source track '{track_id}': {reason}")
            }
            Self::InvalidCandidateId(msg) => write!(f, "Invalid candidate id: {msg}"),
            Self::CandidateNotFound(id) => write!(f, "Candidate '{id}' not found"),
            Self::InvalidStage(s) => write!(f, "Invalid stage: {s}"),
            Self::InvalidStageTransition { from, to } => {
                write!(f, "Cannot transition from {from} to {to}")
            }
            Self::SelectionLocked { stage } => {
                write!(f, "Candidate selection is locked in stage {stage}")
            }
            Self::InvalidConfig { field, reason } => {
                write!(f, "Invalid tournament config '{field}': {reason}")
            }
            Self::InvalidPageSize(size) => write!(f, "Invalid page size: {size}"),
        }
    }
}

impl std::error::Error for DomainError {}
