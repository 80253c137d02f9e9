// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use songrank::{CoreError, SchedulerError};
use songrank_catalog::CatalogError;
use songrank_domain::{CandidateId, DomainError, PairId, Stage};
use songrank_ledger::LedgerError;
use songrank_persistence::PersistenceError;

use crate::{
    ApiError, translate_catalog_error, translate_core_error, translate_domain_error,
    translate_persistence_error,
};

fn rule_of(err: &ApiError) -> &str {
    match err {
        ApiError::DomainRuleViolation { rule, .. } => rule,
        other => panic!("expected a rule violation, got {other}"),
    }
}

#[test]
fn test_domain_errors_translate() {
    let empty: ApiError = translate_domain_error(DomainError::EmptyPool { eligible: 1 });
    assert_eq!(rule_of(&empty), "minimum_lineup");

    let missing: ApiError =
        translate_domain_error(DomainError::CandidateNotFound(CandidateId::new("t9")));
    assert!(matches!(missing, ApiError::ResourceNotFound { .. }));

    let config: ApiError = translate_domain_error(DomainError::InvalidConfig {
        field: "k_factor",
        reason: String::from("Must be finite"),
    });
    assert!(matches!(config, ApiError::InvalidInput { ref field, .. } if field == "k_factor"));
}

#[test]
fn test_core_errors_translate() {
    let duplicate: ApiError =
        translate_core_error(CoreError::Ledger(LedgerError::DuplicatePair(PairId::new("r1-p0"))));
    assert_eq!(rule_of(&duplicate), "single_decision_per_pair");

    let not_live: ApiError = translate_core_error(CoreError::Scheduler(
        SchedulerError::PairNotLive(PairId::new("r1-p0")),
    ));
    assert!(matches!(not_live, ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "Pair"));

    let exhausted: ApiError = translate_core_error(CoreError::Scheduler(SchedulerError::Exhausted));
    assert_eq!(rule_of(&exhausted), "tournament_exhausted");

    let stage: ApiError = translate_core_error(CoreError::WrongStage {
        expected: Stage::Comparing,
        actual: Stage::Results,
    });
    assert_eq!(rule_of(&stage), "stage_required");

    let version: ApiError = translate_core_error(CoreError::UnsupportedSchemaVersion {
        found: 7,
        supported: 1,
    });
    assert!(matches!(version, ApiError::StoredSessionUnusable { .. }));
}

#[test]
fn test_catalog_errors_translate() {
    assert!(matches!(
        translate_catalog_error(CatalogError::Auth(String::from("expired"))),
        ApiError::CatalogAuthenticationFailed { .. }
    ));
    assert!(matches!(
        translate_catalog_error(CatalogError::RateLimited {
            retry_after: Some(Duration::from_secs(3))
        }),
        ApiError::CatalogUnavailable { .. }
    ));
    assert!(matches!(
        translate_catalog_error(CatalogError::Client {
            status: 400,
            message: String::from("invalid id")
        }),
        ApiError::InvalidInput { .. }
    ));
}

#[test]
fn test_persistence_errors_translate() {
    assert!(matches!(
        translate_persistence_error(PersistenceError::ReconstructionError(String::from("bad"))),
        ApiError::StoredSessionUnusable { .. }
    ));
    assert!(matches!(
        translate_persistence_error(PersistenceError::QueryFailed(String::from("locked"))),
        ApiError::Internal { .. }
    ));
}
