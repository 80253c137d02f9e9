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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod config;
mod error;
mod pool;
mod shuffle;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use config::{
    DEFAULT_BASE_SCORE, DEFAULT_K_FACTOR, DEFAULT_MAX_TIE_BREAKS, DEFAULT_MIN_COMPARISONS,
    DEFAULT_TIE_FACTOR, TournamentConfig,
};
pub use error::DomainError;
pub use pool::{CandidatePool, SELECTION_PAGE_SIZE, SelectionPage, SourceTrack, build_pool};
pub use shuffle::{SeededSequence, derive_seed, seeded_shuffle};
pub use types::{
    Candidate, CandidateId, CandidateMetadata, CoverArt, Decision, Outcome, Pair, PairId,
    PairKey, PairPhase, Stage,
};
pub use validation::{parse_candidate_id, validate_source_track, validate_tournament_config};
