// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Candidate pool construction and selection.
//!
//! The pool builder flattens the tracks of every source group (album,
//! single, compilation) into one list of candidates. A track that appears
//! in several groups (e.g., a single later re-released on an album) is kept
//! once: the first occurrence in input order wins.

use crate::error::DomainError;
use crate::shuffle::seeded_shuffle;
use crate::types::{Candidate, CandidateId, CandidateMetadata, CoverArt};
use crate::validation::validate_source_track;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Number of candidates shown per selection page.
pub const SELECTION_PAGE_SIZE: usize = 12;

/// A raw track record as delivered by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTrack {
    /// Stable track identity.
    pub id: String,
    /// Track title.
    pub name: String,
    /// Position within its group.
    pub track_number: u32,
    /// Credited artist names.
    pub artists: Vec<String>,
    /// The group (album) this record came from.
    pub group_id: String,
    /// The display name of that group.
    pub group_name: String,
}

/// The candidates of one session, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

/// One page of the shuffled selection view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPage<'a> {
    /// Zero-based page index.
    pub page: usize,
    /// Total number of pages.
    pub page_count: usize,
    /// Candidates on this page.
    pub candidates: Vec<&'a Candidate>,
}

/// Builds a candidate pool from raw source tracks.
///
/// # Arguments
///
/// * `tracks` - Source tracks in catalog order
/// * `cover_by_group` - Cover art keyed by group id
///
/// # Returns
///
/// A pool with one candidate per distinct track id.
///
/// # Errors
///
/// Returns an error if:
/// - A track has an empty id or name
/// - Fewer than two eligible candidates remain after deduplication
pub fn build_pool<S: std::hash::BuildHasher>(
    tracks: &[SourceTrack],
    cover_by_group: &HashMap<String, CoverArt, S>,
) -> Result<CandidatePool, DomainError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for track in tracks {
        validate_source_track(track)?;

        // First occurrence wins
        if !seen.insert(track.id.as_str()) {
            continue;
        }

        let metadata: CandidateMetadata = CandidateMetadata {
            group_id: track.group_id.clone(),
            group_name: track.group_name.clone(),
            track_number: track.track_number,
            artists: track.artists.clone(),
            cover: cover_by_group.get(&track.group_id).cloned(),
        };
        candidates.push(Candidate::new(
            CandidateId::new(&track.id),
            track.name.clone(),
            metadata,
        ));
    }

    let pool: CandidatePool = CandidatePool { candidates };
    pool.ensure_rankable()?;
    Ok(pool)
}

impl CandidatePool {
    /// Creates a pool from existing candidates (e.g., a rehydrated session).
    ///
    /// Duplicate ids are dropped, keeping the first occurrence.
    #[must_use]
    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        let mut seen: HashSet<CandidateId> = HashSet::new();
        let candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();
        Self { candidates }
    }

    /// Returns all candidates, eligible or not.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Returns the number of candidates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns whether the pool has no candidates.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Looks up a candidate by id.
    #[must_use]
    pub fn get(&self, id: &CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| &c.id == id)
    }

    /// Iterates over eligible candidates in pool order.
    pub fn eligible(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.eligible)
    }

    /// Returns the ids of eligible candidates in pool order.
    #[must_use]
    pub fn eligible_ids(&self) -> Vec<CandidateId> {
        self.eligible().map(|c| c.id.clone()).collect()
    }

    /// Returns the number of eligible candidates.
    #[must_use]
    pub fn eligible_count(&self) -> usize {
        self.eligible().count()
    }

    /// Checks that at least two candidates are eligible.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyPool` otherwise.
    pub fn ensure_rankable(&self) -> Result<(), DomainError> {
        let eligible: usize = self.eligible_count();
        if eligible < 2 {
            return Err(DomainError::EmptyPool { eligible });
        }
        Ok(())
    }

    /// Marks a candidate as eligible or excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate does not exist.
    pub fn set_eligible(&mut self, id: &CandidateId, eligible: bool) -> Result<(), DomainError> {
        let candidate: &mut Candidate = self
            .candidates
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| DomainError::CandidateNotFound(id.clone()))?;
        candidate.eligible = eligible;
        Ok(())
    }

    /// Flips a candidate's eligibility and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate does not exist.
    pub fn toggle(&mut self, id: &CandidateId) -> Result<bool, DomainError> {
        let current: bool = self
            .get(id)
            .map(|c| c.eligible)
            .ok_or_else(|| DomainError::CandidateNotFound(id.clone()))?;
        self.set_eligible(id, !current)?;
        Ok(!current)
    }

    /// Returns one page of the pool in a seeded shuffled order.
    ///
    /// The same seed always yields the same order, so paging is stable
    /// across requests and reloads.
    ///
    /// # Errors
    ///
    /// Returns an error if `page_size` is zero.
    pub fn selection_page(
        &self,
        seed: u64,
        page: usize,
        page_size: usize,
    ) -> Result<SelectionPage<'_>, DomainError> {
        if page_size == 0 {
            return Err(DomainError::InvalidPageSize(page_size));
        }

        let mut order: Vec<&Candidate> = self.candidates.iter().collect();
        seeded_shuffle(&mut order, seed);

        let page_count: usize = order.len().div_ceil(page_size);
        let candidates: Vec<&Candidate> = order
            .into_iter()
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .collect();

        Ok(SelectionPage {
            page,
            page_count,
            candidates,
        })
    }
}
