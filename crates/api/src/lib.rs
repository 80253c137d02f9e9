// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Presentation boundary for SongRank.
//!
//! The `Engine` exposes the ranking flow as plain request/response calls:
//! start or resume a session, curate the lineup, decide pairs, and read
//! the ranking. Core and domain errors are translated into `ApiError`
//! here and never leak to callers.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod csv_export;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use csv_export::{RANKING_CSV_HEADERS, ranking_to_csv};
pub use error::{
    ApiError, translate_catalog_error, translate_core_error, translate_domain_error,
    translate_ledger_error, translate_persistence_error,
};
pub use handlers::Engine;
pub use request_response::{
    CandidateInfo, CandidatePageResponse, CurrentPairResponse, DecisionResponse, Durability,
    FinishResponse, PairInfo, ProgressResponse, RankingEntry, RankingResponse, SessionResponse,
    StageResponse, StartSessionRequest, SubmitDecisionRequest, ToggleCandidateResponse,
};
