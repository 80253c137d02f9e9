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

//! The comparison ledger.
//!
//! Every user decision is appended here exactly once and never modified.
//! The ledger is the source of truth for scoring and for rebuilding a
//! session after a reload: replaying it from empty state reproduces every
//! rating and the scheduler's history.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use songrank_domain::{Decision, PairId};
use std::collections::HashSet;

#[cfg(test)]
mod tests;

/// Errors raised when appending to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A decision for this pair was already recorded.
    DuplicatePair(PairId),
    /// A decision must name at least two members.
    IncompleteDecision(PairId),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicatePair(id) => {
                write!(f, "A decision for pair '{id}' has already been recorded")
            }
            Self::IncompleteDecision(id) => {
                write!(f, "Decision for pair '{id}' must name at least two members")
            }
        }
    }
}

impl std::error::Error for LedgerError {}

/// An append-only, insertion-ordered list of decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<Decision>,
    decided: HashSet<PairId>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted decisions, in their stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the decisions contain a duplicate pair id or an
    /// incomplete decision.
    pub fn from_decisions(decisions: Vec<Decision>) -> Result<Self, LedgerError> {
        let mut ledger: Self = Self::new();
        for decision in decisions {
            ledger.append(decision)?;
        }
        Ok(ledger)
    }

    /// Appends a decision.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DuplicatePair` if the pair was already decided.
    /// The ledger is unchanged on error.
    pub fn append(&mut self, decision: Decision) -> Result<(), LedgerError> {
        if decision.members.len() < 2 {
            return Err(LedgerError::IncompleteDecision(decision.pair_id));
        }
        if self.decided.contains(&decision.pair_id) {
            return Err(LedgerError::DuplicatePair(decision.pair_id));
        }
        self.decided.insert(decision.pair_id.clone());
        self.entries.push(decision);
        Ok(())
    }

    /// Returns every decision in insertion order.
    #[must_use]
    pub fn replay(&self) -> &[Decision] {
        &self.entries
    }

    /// Checks whether a pair has been decided.
    #[must_use]
    pub fn contains(&self, pair_id: &PairId) -> bool {
        self.decided.contains(pair_id)
    }

    /// Returns the most recent decision.
    #[must_use]
    pub fn last(&self) -> Option<&Decision> {
        self.entries.last()
    }

    /// Returns the number of decisions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no decision has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Ledger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let decisions: Vec<Decision> = Vec::deserialize(deserializer)?;
        Self::from_decisions(decisions).map_err(serde::de::Error::custom)
    }
}
