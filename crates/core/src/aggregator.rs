// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Elo-style score aggregation.
//!
//! Standings are a pure function of the ledger. Live updates and a full
//! replay call the same `apply`, in the same order, so both produce
//! bit-identical scores.

use serde::{Deserialize, Serialize};
use songrank_domain::{CandidateId, Decision, Outcome, TournamentConfig};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Derived standing of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// The candidate.
    pub candidate_id: CandidateId,
    /// Current Elo-style score.
    pub score: f64,
    /// Decisions this candidate took part in, skips included.
    pub comparisons: u32,
    /// Decisive wins.
    pub wins: u32,
    /// Decisive losses.
    pub losses: u32,
    /// Tied decisions.
    pub ties: u32,
}

impl Rating {
    /// Creates a rating with no history.
    #[must_use]
    pub const fn new(candidate_id: CandidateId, score: f64) -> Self {
        Self {
            candidate_id,
            score,
            comparisons: 0,
            wins: 0,
            losses: 0,
            ties: 0,
        }
    }
}

/// Probability that a candidate scored `a` beats one scored `b`.
#[must_use]
pub fn expected_score(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + 10_f64.powf((b - a) / 400.0))
}

/// Ratings for every candidate in a tournament.
#[derive(Debug, Clone, PartialEq)]
pub struct Standings {
    base_score: f64,
    k_factor: f64,
    tie_factor: f64,
    ratings: BTreeMap<CandidateId, Rating>,
    applied: usize,
}

impl Standings {
    /// Creates standings with every candidate at the base score.
    #[must_use]
    pub fn new(candidates: &[CandidateId], config: &TournamentConfig) -> Self {
        let ratings: BTreeMap<CandidateId, Rating> = candidates
            .iter()
            .map(|id| (id.clone(), Rating::new(id.clone(), config.base_score)))
            .collect();
        Self {
            base_score: config.base_score,
            k_factor: config.k_factor,
            tie_factor: config.tie_factor,
            ratings,
            applied: 0,
        }
    }

    /// Rebuilds standings by replaying decisions from empty state.
    #[must_use]
    pub fn replay(
        candidates: &[CandidateId],
        config: &TournamentConfig,
        decisions: &[Decision],
    ) -> Self {
        let mut standings: Self = Self::new(candidates, config);
        for decision in decisions {
            standings.apply(decision);
        }
        standings
    }

    /// Folds one decision into the standings.
    ///
    /// Decisions whose winner is not one of the first two members are
    /// ignored; the session validates winners before they reach the ledger.
    pub fn apply(&mut self, decision: &Decision) {
        let [a, b, ..] = decision.members.as_slice() else {
            return;
        };

        match &decision.outcome {
            Outcome::Winner(winner) => {
                let loser: &CandidateId = if winner == a {
                    b
                } else if winner == b {
                    a
                } else {
                    return;
                };
                let delta: f64 =
                    self.k_factor * (1.0 - expected_score(self.score(winner), self.score(loser)));

                let w: &mut Rating = self.rating_mut(winner);
                w.score += delta;
                w.wins += 1;
                w.comparisons += 1;

                let l: &mut Rating = self.rating_mut(loser);
                l.score -= delta;
                l.losses += 1;
                l.comparisons += 1;
            }
            Outcome::Tie => {
                let score_a: f64 = self.score(a);
                let score_b: f64 = self.score(b);
                let delta_a: f64 = self.tie_factor * (0.5 - expected_score(score_a, score_b));
                let delta_b: f64 = self.tie_factor * (0.5 - expected_score(score_b, score_a));

                for (id, delta) in [(a, delta_a), (b, delta_b)] {
                    let rating: &mut Rating = self.rating_mut(id);
                    rating.score += delta;
                    rating.ties += 1;
                    rating.comparisons += 1;
                }
            }
            Outcome::Skip => {
                for id in [a, b] {
                    self.rating_mut(id).comparisons += 1;
                }
            }
        }

        self.applied += 1;
    }

    /// Returns the rating of one candidate.
    #[must_use]
    pub fn rating(&self, id: &CandidateId) -> Option<&Rating> {
        self.ratings.get(id)
    }

    /// Returns the number of decisions folded in.
    #[must_use]
    pub const fn decisions_applied(&self) -> usize {
        self.applied
    }

    /// Returns all ratings ordered by score desc, wins desc, id asc.
    #[must_use]
    pub fn ranking(&self) -> Vec<Rating> {
        let mut ranking: Vec<Rating> = self.ratings.values().cloned().collect();
        ranking.sort_by(|x, y| {
            y.score
                .total_cmp(&x.score)
                .then_with(|| y.wins.cmp(&x.wins))
                .then_with(|| x.candidate_id.cmp(&y.candidate_id))
        });
        ranking
    }

    /// Returns neighbouring candidates in the ranking whose scores are
    /// exactly equal, higher-ranked member first.
    #[must_use]
    pub fn adjacent_ties(&self) -> Vec<(CandidateId, CandidateId)> {
        self.ranking()
            .windows(2)
            .filter(|w| w[0].score.total_cmp(&w[1].score) == Ordering::Equal)
            .map(|w| (w[0].candidate_id.clone(), w[1].candidate_id.clone()))
            .collect()
    }

    fn score(&self, id: &CandidateId) -> f64 {
        self.ratings.get(id).map_or(self.base_score, |r| r.score)
    }

    fn rating_mut(&mut self, id: &CandidateId) -> &mut Rating {
        let base: f64 = self.base_score;
        self.ratings
            .entry(id.clone())
            .or_insert_with(|| Rating::new(id.clone(), base))
    }
}
