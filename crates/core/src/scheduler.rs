// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The pairing scheduler.
//!
//! The scheduler plans one round at a time. A round is a matching over the
//! eligible candidates: no candidate appears in two pairs of the same round,
//! and the next round is planned only once every pair of the current round
//! has been decided. Planning depends only on the seed and the decisions
//! recorded so far, so replaying the ledger into a fresh scheduler issues
//! the same pairs with the same ids.
//!
//! Regular rounds never repeat an unordered pair that already has a
//! decision, and never pair two candidates that both reached
//! `min_comparisons`. When no regular pair can be formed, the scheduler
//! looks for neighbours in the standings with exactly equal scores whose
//! previous meeting was a tie or a skip, and issues them as a tie-break
//! round. When that also yields nothing, or the round cap is
//! reached, the scheduler is exhausted.

use crate::aggregator::Standings;
use crate::error::SchedulerError;
use songrank_domain::{
    CandidateId, Decision, Outcome, Pair, PairId, PairKey, PairPhase, TournamentConfig,
    derive_seed, seeded_shuffle,
};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// What the scheduler offers next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next<'a> {
    /// A pair awaiting a decision.
    Pair(&'a Pair),
    /// The tournament is over.
    Exhausted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PairHistory {
    decisive: bool,
    tie_breaks: u32,
}

/// Round-based pair planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PairingScheduler {
    candidates: Vec<CandidateId>,
    config: TournamentConfig,
    seed: u64,
    round: u32,
    round_limit: u32,
    plan: Vec<Pair>,
    decided: HashSet<PairId>,
    comparisons: HashMap<CandidateId, u32>,
    byes: HashMap<CandidateId, u32>,
    last_byes: HashSet<CandidateId>,
    history: HashMap<PairKey, PairHistory>,
    exhausted: bool,
}

impl PairingScheduler {
    /// Creates a scheduler and plans its first round.
    ///
    /// # Arguments
    ///
    /// * `candidates` - Eligible candidate ids in pool order
    /// * `config` - Tournament tuning
    /// * `seed` - Shuffle seed of the session
    #[must_use]
    pub fn new(candidates: Vec<CandidateId>, config: TournamentConfig, seed: u64) -> Self {
        let round_limit: u32 = config.round_limit(candidates.len());
        let comparisons: HashMap<CandidateId, u32> =
            candidates.iter().map(|id| (id.clone(), 0)).collect();
        let byes: HashMap<CandidateId, u32> = comparisons.clone();
        let standings: Standings = Standings::new(&candidates, &config);

        let mut scheduler: Self = Self {
            candidates,
            config,
            seed,
            round: 0,
            round_limit,
            plan: Vec::new(),
            decided: HashSet::new(),
            comparisons,
            byes,
            last_byes: HashSet::new(),
            history: HashMap::new(),
            exhausted: false,
        };
        scheduler.advance(&standings);
        scheduler
    }

    /// Rebuilds a scheduler by replaying decisions in ledger order.
    ///
    /// `standings` must already reflect `decisions`; it is replayed in step
    /// so that tie-break planning sees the same scores it saw live.
    ///
    /// # Errors
    ///
    /// Returns an error if a decision does not match the pair the scheduler
    /// would have issued at that point.
    pub fn replay(
        candidates: Vec<CandidateId>,
        config: TournamentConfig,
        seed: u64,
        decisions: &[Decision],
    ) -> Result<(Self, Standings), SchedulerError> {
        let mut standings: Standings = Standings::new(&candidates, &config);
        let mut scheduler: Self = Self::new(candidates, config, seed);
        for decision in decisions {
            standings.apply(decision);
            scheduler.record(decision, &standings)?;
        }
        Ok((scheduler, standings))
    }

    /// Returns the next pair, or `Exhausted`.
    #[must_use]
    pub fn poll(&self) -> Next<'_> {
        self.live_pairs().next().map_or(Next::Exhausted, Next::Pair)
    }

    /// Returns the next pair awaiting a decision.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Exhausted` once the tournament is over.
    pub fn next_pair(&self) -> Result<&Pair, SchedulerError> {
        self.live_pairs().next().ok_or(SchedulerError::Exhausted)
    }

    /// Iterates over issued pairs that have no decision yet.
    pub fn live_pairs(&self) -> impl Iterator<Item = &Pair> {
        self.plan.iter().filter(|p| !self.decided.contains(&p.id))
    }

    /// Looks up a live pair by id.
    #[must_use]
    pub fn find_live(&self, pair_id: &PairId) -> Option<&Pair> {
        self.live_pairs().find(|p| &p.id == pair_id)
    }

    /// Records a decision for a live pair and plans the next round when the
    /// current one is complete.
    ///
    /// # Arguments
    ///
    /// * `decision` - The decision, already appended to the ledger
    /// * `standings` - Standings including this decision
    ///
    /// # Errors
    ///
    /// Returns an error if the pair is not live or the members differ from
    /// the issued pair.
    pub fn record(
        &mut self,
        decision: &Decision,
        standings: &Standings,
    ) -> Result<(), SchedulerError> {
        let members_match: bool = match self.find_live(&decision.pair_id) {
            Some(pair) => pair.members == decision.members,
            None => return Err(SchedulerError::PairNotLive(decision.pair_id.clone())),
        };
        if !members_match {
            return Err(SchedulerError::MembersMismatch(decision.pair_id.clone()));
        }

        self.decided.insert(decision.pair_id.clone());
        for member in &decision.members {
            *self.comparisons.entry(member.clone()).or_insert(0) += 1;
        }
        if let Some(key) = decision.key() {
            let history: &mut PairHistory = self.history.entry(key).or_default();
            history.decisive |= matches!(decision.outcome, Outcome::Winner(_));
        }

        if self.live_pairs().next().is_none() {
            self.advance(standings);
        }
        Ok(())
    }

    /// Returns the current round number (1-based).
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Returns the round cap for this tournament.
    #[must_use]
    pub const fn round_limit(&self) -> u32 {
        self.round_limit
    }

    /// Returns whether the tournament is over.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns how many decisions a candidate took part in.
    #[must_use]
    pub fn comparisons(&self, id: &CandidateId) -> u32 {
        self.comparisons.get(id).copied().unwrap_or(0)
    }

    /// Returns how many regular rounds a candidate sat out.
    #[must_use]
    pub fn byes(&self, id: &CandidateId) -> u32 {
        self.byes.get(id).copied().unwrap_or(0)
    }

    /// Returns the number of candidates that reached `min_comparisons`.
    #[must_use]
    pub fn satisfied_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|id| self.comparisons(id) >= self.config.min_comparisons)
            .count()
    }

    /// Returns the eligible candidates in pool order.
    #[must_use]
    pub fn candidates(&self) -> &[CandidateId] {
        &self.candidates
    }

    fn advance(&mut self, standings: &Standings) {
        self.plan.clear();
        if self.exhausted {
            return;
        }

        let round: u32 = self.round + 1;
        if round > self.round_limit {
            debug!(round_limit = self.round_limit, "Round cap reached");
            self.exhausted = true;
            return;
        }

        let regular: Vec<(CandidateId, CandidateId)> = self.plan_regular(round);
        let (matches, phase) = if regular.is_empty() {
            (self.plan_tie_breaks(standings), PairPhase::TieBreak)
        } else {
            (regular, PairPhase::Regular)
        };

        if matches.is_empty() {
            debug!(round, "No helpful pairing remains");
            self.exhausted = true;
            return;
        }

        let playing: HashSet<&CandidateId> = matches.iter().flat_map(|(a, b)| [a, b]).collect();
        let sitting_out: HashSet<CandidateId> = if phase == PairPhase::Regular {
            self.candidates
                .iter()
                .filter(|id| !playing.contains(id))
                .cloned()
                .collect()
        } else {
            HashSet::new()
        };
        for id in &sitting_out {
            *self.byes.entry(id.clone()).or_insert(0) += 1;
        }

        self.plan = matches
            .into_iter()
            .enumerate()
            .map(|(slot, (a, b))| Pair::new(PairId::for_slot(round, slot), a, b, round, phase))
            .collect();
        if phase == PairPhase::TieBreak {
            for pair in &self.plan {
                if let Some(key) = pair.key() {
                    self.history.entry(key).or_default().tie_breaks += 1;
                }
            }
        }

        self.last_byes = sitting_out;
        self.round = round;
        debug!(
            round,
            pairs = self.plan.len(),
            byes = self.last_byes.len(),
            ?phase,
            "Planned round"
        );
    }

    fn plan_regular(&self, round: u32) -> Vec<(CandidateId, CandidateId)> {
        let min: u32 = self.config.min_comparisons;
        let mut order: Vec<CandidateId> = self.candidates.clone();
        seeded_shuffle(&mut order, derive_seed(self.seed, u64::from(round)));
        // Sat out last round first, then fewest comparisons, then most byes,
        // so whoever is left over tends to have had the fewest byes.
        order.sort_by_key(|id| {
            (
                !self.last_byes.contains(id),
                self.comparisons(id),
                Reverse(self.byes(id)),
            )
        });

        let mut matched: Vec<bool> = vec![false; order.len()];
        let mut pairs: Vec<(CandidateId, CandidateId)> = Vec::new();
        for (i, a) in order.iter().enumerate() {
            if matched[i] {
                continue;
            }
            let a_needy: bool = self.comparisons(a) < min;
            let partner: Option<usize> = (i + 1..order.len()).find(|&j| {
                let b: &CandidateId = &order[j];
                !matched[j]
                    && (a_needy || self.comparisons(b) < min)
                    && !self.history.contains_key(&PairKey::new(a, b))
            });
            if let Some(j) = partner {
                matched[i] = true;
                matched[j] = true;
                pairs.push((a.clone(), order[j].clone()));
            }
        }
        pairs
    }

    fn plan_tie_breaks(&self, standings: &Standings) -> Vec<(CandidateId, CandidateId)> {
        let mut used: HashSet<CandidateId> = HashSet::new();
        let mut pairs: Vec<(CandidateId, CandidateId)> = Vec::new();

        for (a, b) in standings.adjacent_ties() {
            if used.contains(&a) || used.contains(&b) {
                continue;
            }
            // Only pairs that already met without a winner are rematched.
            let Some(history) = self.history.get(&PairKey::new(&a, &b)) else {
                continue;
            };
            if history.decisive || history.tie_breaks >= self.config.max_tie_breaks {
                continue;
            }
            used.insert(a.clone());
            used.insert(b.clone());
            pairs.push((a, b));
        }
        pairs
    }
}
