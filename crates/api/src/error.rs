// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use songrank::{CoreError, SchedulerError};
use songrank_catalog::CatalogError;
use songrank_domain::DomainError;
use songrank_ledger::LedgerError;
use songrank_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// No session has been started, or it was restarted.
    NoActiveSession,
    /// The catalog rejected our credentials.
    CatalogAuthenticationFailed {
        /// A description of the failure.
        message: String,
    },
    /// The catalog could not be reached or kept failing.
    CatalogUnavailable {
        /// A description of the failure.
        message: String,
    },
    /// A stored session could not be used.
    StoredSessionUnusable {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::NoActiveSession => write!(f, "No ranking session is active"),
            Self::CatalogAuthenticationFailed { message } => {
                write!(f, "Catalog authentication failed: {message}")
            }
            Self::CatalogUnavailable { message } => {
                write!(f, "Catalog unavailable: {message}")
            }
            Self::StoredSessionUnusable { message } => {
                write!(f, "Stored session cannot be resumed: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::EmptyPool { eligible } => ApiError::DomainRuleViolation {
            rule: String::from("minimum_lineup"),
            message: format!("At least 2 songs must be selected, found {eligible}"),
        },
        DomainError::InvalidSourceTrack { track_id, reason } => ApiError::InvalidInput {
            field: String::from("track"),
            message: format!("Track '{track_id}': {reason}"),
        },
        DomainError::InvalidCandidateId(msg) => ApiError::InvalidInput {
            field: String::from("candidate_id"),
            message: msg,
        },
        DomainError::CandidateNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Candidate"),
            message: format!("Candidate '{id}' is not in this session"),
        },
        DomainError::InvalidStage(stage) => ApiError::InvalidInput {
            field: String::from("stage"),
            message: format!("Unknown stage '{stage}'"),
        },
        DomainError::InvalidStageTransition { from, to } => ApiError::DomainRuleViolation {
            rule: String::from("stage_order"),
            message: format!("Cannot move from {from} to {to}"),
        },
        DomainError::SelectionLocked { stage } => ApiError::DomainRuleViolation {
            rule: String::from("selection_locked"),
            message: format!("The lineup cannot change during {stage}"),
        },
        DomainError::InvalidConfig { field, reason } => ApiError::InvalidInput {
            field: field.to_string(),
            message: reason,
        },
        DomainError::InvalidPageSize(size) => ApiError::InvalidInput {
            field: String::from("page_size"),
            message: format!("Page size must be positive, got {size}"),
        },
    }
}

/// Translates a ledger error into an API error.
#[must_use]
pub fn translate_ledger_error(err: LedgerError) -> ApiError {
    match err {
        LedgerError::DuplicatePair(pair_id) => ApiError::DomainRuleViolation {
            rule: String::from("single_decision_per_pair"),
            message: format!("Pair '{pair_id}' has already been decided"),
        },
        LedgerError::IncompleteDecision(pair_id) => ApiError::InvalidInput {
            field: String::from("pair_id"),
            message: format!("Pair '{pair_id}' has fewer than two members"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Ledger(ledger_err) => translate_ledger_error(ledger_err),
        CoreError::Scheduler(SchedulerError::Exhausted) => ApiError::DomainRuleViolation {
            rule: String::from("tournament_exhausted"),
            message: String::from("No further pairs will be offered"),
        },
        CoreError::Scheduler(
            SchedulerError::PairNotLive(pair_id) | SchedulerError::MembersMismatch(pair_id),
        )
        | CoreError::UnknownPair(pair_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Pair"),
            message: format!("Pair '{pair_id}' is not awaiting a decision"),
        },
        CoreError::InsufficientCandidates { eligible } => ApiError::DomainRuleViolation {
            rule: String::from("minimum_lineup"),
            message: format!("At least 2 songs must be selected, found {eligible}"),
        },
        CoreError::TournamentIncomplete { round, decisions } => ApiError::DomainRuleViolation {
            rule: String::from("tournament_incomplete"),
            message: format!(
                "The showdown is still running (round {round}, {decisions} decisions so far)"
            ),
        },
        CoreError::WrongStage { expected, actual } => ApiError::DomainRuleViolation {
            rule: String::from("stage_required"),
            message: format!("This action needs {expected}, but the session is in {actual}"),
        },
        CoreError::WinnerNotInPair { pair_id, winner } => ApiError::InvalidInput {
            field: String::from("winner_id"),
            message: format!("Candidate '{winner}' is not part of pair '{pair_id}'"),
        },
        err @ (CoreError::UnsupportedSchemaVersion { .. } | CoreError::InvalidSnapshot(_)) => {
            ApiError::StoredSessionUnusable {
                message: err.to_string(),
            }
        }
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::ReconstructionError(message) => {
            ApiError::StoredSessionUnusable { message }
        }
        other => ApiError::Internal {
            message: format!("Storage failure: {other}"),
        },
    }
}

/// Translates a catalog error into an API error.
#[must_use]
pub fn translate_catalog_error(err: CatalogError) -> ApiError {
    match err {
        CatalogError::Auth(message) => ApiError::CatalogAuthenticationFailed { message },
        CatalogError::NotFound(what) => ApiError::ResourceNotFound {
            resource_type: String::from("Catalog entry"),
            message: what,
        },
        CatalogError::Client { status, message } => ApiError::InvalidInput {
            field: String::from("artist_id"),
            message: format!("Catalog rejected the request ({status}): {message}"),
        },
        other @ (CatalogError::Network(_)
        | CatalogError::RateLimited { .. }
        | CatalogError::Server { .. }
        | CatalogError::Parse(_)) => ApiError::CatalogUnavailable {
            message: other.to_string(),
        },
    }
}
