// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tournament tuning parameters.

use serde::{Deserialize, Serialize};

/// Default number of decisions every candidate should take part in.
pub const DEFAULT_MIN_COMPARISONS: u32 = 3;

/// Default number of tie-break rematches allowed per unordered pair.
pub const DEFAULT_MAX_TIE_BREAKS: u32 = 1;

/// Score every candidate starts from.
pub const DEFAULT_BASE_SCORE: f64 = 1500.0;

/// Elo K-factor applied to decisive outcomes.
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Scale of the symmetric adjustment applied to ties.
pub const DEFAULT_TIE_FACTOR: f64 = 8.0;

/// Tuning parameters for one tournament.
///
/// The configuration is fixed when the session is created and stored with
/// it, so a rehydrated session schedules and scores exactly as before.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Decisions each candidate should accumulate before the tournament ends.
    pub min_comparisons: u32,
    /// Hard cap on rounds. `None` derives `⌈N/2⌉ × min_comparisons`.
    pub max_rounds: Option<u32>,
    /// Tie-break rematches allowed per unordered pair.
    pub max_tie_breaks: u32,
    /// Starting score.
    pub base_score: f64,
    /// K-factor for wins and losses.
    pub k_factor: f64,
    /// Scale of the tie adjustment. A tie moves a score by at most half this.
    pub tie_factor: f64,
}

impl TournamentConfig {
    /// Returns the round cap for a pool of `eligible` candidates.
    #[must_use]
    pub fn round_limit(&self, eligible: usize) -> u32 {
        self.max_rounds.unwrap_or_else(|| {
            let half: u32 = u32::try_from(eligible.div_ceil(2)).unwrap_or(u32::MAX);
            half.saturating_mul(self.min_comparisons).max(1)
        })
    }
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            min_comparisons: DEFAULT_MIN_COMPARISONS,
            max_rounds: None,
            max_tie_breaks: DEFAULT_MAX_TIE_BREAKS,
            base_score: DEFAULT_BASE_SCORE,
            k_factor: DEFAULT_K_FACTOR,
            tie_factor: DEFAULT_TIE_FACTOR,
        }
    }
}
