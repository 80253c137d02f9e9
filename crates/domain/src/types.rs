// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// The visible stage of a ranking session.
///
/// Stages advance linearly. The only way back is an explicit restart,
/// which discards the session entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Stage {
    /// "Assemble the Lineup": the user picks which songs take part.
    #[default]
    Selecting,
    /// "Songs Showdown": pairwise comparisons are in progress.
    Comparing,
    /// "Crown the Best!": the tournament is over and the ranking is final.
    Results,
}

impl FromStr for Stage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Selecting" => Ok(Self::Selecting),
            "Comparing" => Ok(Self::Comparing),
            "Results" => Ok(Self::Results),
            _ => Err(DomainError::InvalidStage(s.to_string())),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Stage {
    /// Converts this stage to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Selecting => "Selecting",
            Self::Comparing => "Comparing",
            Self::Results => "Results",
        }
    }

    /// Returns the 1-based step number shown to the user.
    #[must_use]
    pub const fn step(&self) -> u8 {
        match self {
            Self::Selecting => 1,
            Self::Comparing => 2,
            Self::Results => 3,
        }
    }

    /// Checks if a transition from this stage to another is valid.
    ///
    /// Valid transitions are:
    /// - Selecting → Comparing
    /// - Comparing → Results
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Selecting, Self::Comparing) | (Self::Comparing, Self::Results)
        )
    }

    /// Returns whether the candidate set may still change in this stage.
    #[must_use]
    pub const fn allows_selection_changes(&self) -> bool {
        matches!(self, Self::Selecting)
    }
}

/// Identifies a candidate within a session.
///
/// The identifier is the source track id, so it is stable across reloads
/// of the same catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    /// Creates a new `CandidateId`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to cover art for a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverArt {
    /// Image URL.
    pub url: String,
    /// Width in pixels, when known.
    pub width: Option<u32>,
    /// Height in pixels, when known.
    pub height: Option<u32>,
}

/// Presentation metadata carried by a candidate.
///
/// The engine never interprets these fields; they are handed back to the
/// presentation layer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CandidateMetadata {
    /// The source group (album) the track was first seen in.
    pub group_id: String,
    /// The display name of the source group.
    pub group_name: String,
    /// Position of the track within its group.
    pub track_number: u32,
    /// Credited artist names, in credit order.
    pub artists: Vec<String>,
    /// Cover art of the source group, if any.
    pub cover: Option<CoverArt>,
}

/// A single rankable item in a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique identifier within the session.
    pub id: CandidateId,
    /// The name shown to the user.
    pub display_name: String,
    /// Opaque presentation metadata.
    pub metadata: CandidateMetadata,
    /// Whether this candidate takes part in the tournament.
    pub eligible: bool,
}

impl Candidate {
    /// Creates a new eligible candidate.
    ///
    /// # Arguments
    ///
    /// * `id` - The candidate identifier
    /// * `display_name` - The name shown to the user
    /// * `metadata` - Presentation metadata
    #[must_use]
    pub const fn new(id: CandidateId, display_name: String, metadata: CandidateMetadata) -> Self {
        Self {
            id,
            display_name,
            metadata,
            eligible: true,
        }
    }
}

/// Which phase of the tournament issued a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PairPhase {
    /// A regular round-robin round.
    #[default]
    Regular,
    /// A rematch round used to separate exact score ties.
    TieBreak,
}

/// Deterministic identifier of an issued pair.
///
/// Pair ids are derived from the round number and the slot within the
/// round, so a scheduler rebuilt from the ledger issues the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(String);

impl PairId {
    /// Creates the id for a slot within a round.
    #[must_use]
    pub fn for_slot(round: u32, slot: usize) -> Self {
        Self(format!("r{round}-p{slot}"))
    }

    /// Wraps an id received from the presentation layer.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unordered member set of a pair.
///
/// Two pairs with the same members in a different order share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(CandidateId, CandidateId);

impl PairKey {
    /// Creates the key for two candidates, independent of their order.
    #[must_use]
    pub fn new(a: &CandidateId, b: &CandidateId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }

    /// Returns the lower candidate id.
    #[must_use]
    pub const fn first(&self) -> &CandidateId {
        &self.0
    }

    /// Returns the higher candidate id.
    #[must_use]
    pub const fn second(&self) -> &CandidateId {
        &self.1
    }
}

/// A set of candidates presented together for one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// The pair identifier.
    pub id: PairId,
    /// Candidate ids in presentation order.
    pub members: Vec<CandidateId>,
    /// The round that issued this pair.
    pub round: u32,
    /// The phase that issued this pair.
    pub phase: PairPhase,
}

impl Pair {
    /// Creates a two-member pair.
    #[must_use]
    pub fn new(id: PairId, a: CandidateId, b: CandidateId, round: u32, phase: PairPhase) -> Self {
        Self {
            id,
            members: vec![a, b],
            round,
            phase,
        }
    }

    /// Returns the unordered key of the first two members.
    #[must_use]
    pub fn key(&self) -> Option<PairKey> {
        match self.members.as_slice() {
            [a, b, ..] => Some(PairKey::new(a, b)),
            _ => None,
        }
    }

    /// Checks whether a candidate is a member of this pair.
    #[must_use]
    pub fn contains(&self, id: &CandidateId) -> bool {
        self.members.contains(id)
    }
}

/// The user's verdict on a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "winner", rename_all = "snake_case")]
pub enum Outcome {
    /// One member beat the others.
    Winner(CandidateId),
    /// The user judged the members equal.
    Tie,
    /// The user declined to judge.
    Skip,
}

impl Outcome {
    /// Builds an outcome from an optional winner, treating absence as a tie.
    #[must_use]
    pub fn from_winner(winner: Option<CandidateId>) -> Self {
        winner.map_or(Self::Tie, Self::Winner)
    }

    /// Returns the winner, if any.
    #[must_use]
    pub const fn winner(&self) -> Option<&CandidateId> {
        match self {
            Self::Winner(id) => Some(id),
            Self::Tie | Self::Skip => None,
        }
    }
}

/// An immutable record of one comparison.
///
/// Decisions carry the members of the pair they settle, so the ledger on
/// its own is enough to replay the tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The pair this decision settles.
    pub pair_id: PairId,
    /// The members of that pair, in presentation order.
    pub members: Vec<CandidateId>,
    /// The user's verdict.
    pub outcome: Outcome,
    /// The round of the pair.
    pub round: u32,
    /// The phase of the pair.
    pub phase: PairPhase,
    /// When the decision was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl Decision {
    /// Records a decision for an issued pair.
    ///
    /// # Arguments
    ///
    /// * `pair` - The pair being decided
    /// * `outcome` - The user's verdict
    /// * `recorded_at` - The time of the decision
    #[must_use]
    pub fn for_pair(pair: &Pair, outcome: Outcome, recorded_at: OffsetDateTime) -> Self {
        Self {
            pair_id: pair.id.clone(),
            members: pair.members.clone(),
            outcome,
            round: pair.round,
            phase: pair.phase,
            recorded_at,
        }
    }

    /// Returns the winner id, absent for ties and skips.
    #[must_use]
    pub const fn winner_id(&self) -> Option<&CandidateId> {
        self.outcome.winner()
    }

    /// Returns the unordered key of the decided pair.
    #[must_use]
    pub fn key(&self) -> Option<PairKey> {
        match self.members.as_slice() {
            [a, b, ..] => Some(PairKey::new(a, b)),
            _ => None,
        }
    }
}
