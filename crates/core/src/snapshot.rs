// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Versioned session snapshots.
//!
//! A snapshot holds only the durable facts of a session: identity, seed,
//! stage, configuration, the pool and the ledger. Scheduler and standings
//! are rebuilt by replaying the ledger when the snapshot is restored.

use crate::error::CoreError;
use crate::state::{Session, Tournament};
use serde::{Deserialize, Serialize};
use songrank_domain::{CandidatePool, Decision, Stage, TournamentConfig, validate_tournament_config};
use songrank_ledger::Ledger;

/// Schema version written by this build.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// The persisted form of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Snapshot layout version.
    pub schema_version: u32,
    /// Session identifier.
    pub id: String,
    /// The artist being ranked.
    pub artist_id: String,
    /// Shuffle seed.
    pub seed: u64,
    /// Stage at the time of the snapshot.
    pub stage: Stage,
    /// Tournament tuning.
    pub config: TournamentConfig,
    /// Candidates and their eligibility.
    pub pool: CandidatePool,
    /// Decisions in ledger order.
    pub decisions: Vec<Decision>,
}

impl SessionSnapshot {
    /// Encodes the snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::InvalidSnapshot(e.to_string()))
    }

    /// Decodes a snapshot from JSON.
    ///
    /// The schema version is checked before the rest of the document is
    /// interpreted, so a snapshot from a newer build is rejected rather than
    /// misread.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the version is missing or
    /// unsupported, or the body does not match the current layout.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidSnapshot(e.to_string()))?;
        let found: u64 = value
            .get("schema_version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| CoreError::InvalidSnapshot(String::from("missing schema_version")))?;
        let found: u32 = u32::try_from(found).unwrap_or(u32::MAX);
        if found == 0 || found > SNAPSHOT_SCHEMA_VERSION {
            return Err(CoreError::UnsupportedSchemaVersion {
                found,
                supported: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        serde_json::from_value(value).map_err(|e| CoreError::InvalidSnapshot(e.to_string()))
    }
}

impl Session {
    /// Captures the durable state of the session.
    #[must_use]
    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            id: self.id.clone(),
            artist_id: self.artist_id.clone(),
            seed: self.seed,
            stage: self.stage,
            config: self.config,
            pool: self.pool.clone(),
            decisions: self.ledger.replay().to_vec(),
        }
    }

    /// Restores a session, rebuilding scheduler and standings from the
    /// pool and the ledger only.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The schema version is unsupported
    /// - The configuration is invalid
    /// - The ledger holds duplicates or decisions the scheduler would not
    ///   have issued
    /// - The stage contradicts the ledger
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Result<Self, CoreError> {
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(CoreError::UnsupportedSchemaVersion {
                found: snapshot.schema_version,
                supported: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        validate_tournament_config(&snapshot.config)?;
        let ledger: Ledger = Ledger::from_decisions(snapshot.decisions)?;

        if snapshot.stage == Stage::Selecting && !ledger.is_empty() {
            return Err(CoreError::InvalidSnapshot(String::from(
                "decisions recorded before comparing began",
            )));
        }

        let mut session: Self = Self {
            id: snapshot.id,
            artist_id: snapshot.artist_id,
            seed: snapshot.seed,
            stage: snapshot.stage,
            pool: snapshot.pool,
            ledger,
            config: snapshot.config,
            tournament: None,
        };

        if session.stage != Stage::Selecting {
            let tournament: Tournament = Tournament::rebuild(&session)?;
            if session.stage == Stage::Results && !tournament.scheduler.is_exhausted() {
                return Err(CoreError::InvalidSnapshot(String::from(
                    "results stage with an unfinished tournament",
                )));
            }
            session.tournament = Some(tournament);
        }
        Ok(session)
    }
}
