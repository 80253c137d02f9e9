// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::config::TournamentConfig;
use crate::error::DomainError;
use crate::pool::SourceTrack;
use crate::types::CandidateId;

/// Validates that a source track has the fields the pool builder needs.
///
/// # Arguments
///
/// * `track` - The track to validate
///
/// # Errors
///
/// Returns an error if:
/// - The track id is empty
/// - The track name is empty
pub fn validate_source_track(track: &SourceTrack) -> Result<(), DomainError> {
    if track.id.trim().is_empty() {
        return Err(DomainError::InvalidSourceTrack {
            track_id: track.id.clone(),
            reason: String::from("Track id cannot be empty"),
        });
    }

    if track.name.trim().is_empty() {
        return Err(DomainError::InvalidSourceTrack {
            track_id: track.id.clone(),
            reason: String::from("Track name cannot be empty"),
        });
    }

    Ok(())
}

/// Parses a candidate id received from the presentation layer.
///
/// # Errors
///
/// Returns an error if the id is empty after trimming.
pub fn parse_candidate_id(value: &str) -> Result<CandidateId, DomainError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidCandidateId(String::from(
            "Candidate id cannot be empty",
        )));
    }
    Ok(CandidateId::new(trimmed))
}

/// Validates tournament tuning parameters.
///
/// # Errors
///
/// Returns an error if:
/// - `min_comparisons` is zero
/// - `max_rounds` is zero
/// - Any scoring factor is not a finite number, or is negative
pub fn validate_tournament_config(config: &TournamentConfig) -> Result<(), DomainError> {
    if config.min_comparisons == 0 {
        return Err(DomainError::InvalidConfig {
            field: "min_comparisons",
            reason: String::from("Must be at least 1"),
        });
    }

    if config.max_rounds == Some(0) {
        return Err(DomainError::InvalidConfig {
            field: "max_rounds",
            reason: String::from("Must be at least 1 when set"),
        });
    }

    if !config.base_score.is_finite() {
        return Err(DomainError::InvalidConfig {
            field: "base_score",
            reason: String::from("Must be a finite number"),
        });
    }

    for (field, value) in [
        ("k_factor", config.k_factor),
        ("tie_factor", config.tie_factor),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::InvalidConfig {
                field,
                reason: format!("Must be a finite, non-negative number, got {value}"),
            });
        }
    }

    Ok(())
}
