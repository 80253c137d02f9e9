// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use songrank::{Command, Session, apply};
use songrank_domain::{
    Candidate, CandidateId, CandidateMetadata, CandidatePool, TournamentConfig,
};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{KeyValueStore, PersistenceError};

pub fn test_time() -> OffsetDateTime {
    datetime!(2026-03-14 09:00 UTC)
}

pub fn create_test_session(values: &[&str]) -> Session {
    let pool: CandidatePool = CandidatePool::from_candidates(
        values
            .iter()
            .map(|v| {
                Candidate::new(
                    CandidateId::new(v),
                    format!("Track {v}"),
                    CandidateMetadata::default(),
                )
            })
            .collect(),
    );
    Session::new(
        String::from("session-42"),
        String::from("artist-7"),
        pool,
        TournamentConfig::default(),
        99,
    )
    .unwrap()
}

pub fn create_comparing_session(values: &[&str], decisions: usize) -> Session {
    let mut session: Session = apply(
        &create_test_session(values),
        Command::BeginComparing,
        test_time(),
    )
    .unwrap()
    .session;
    for _ in 0..decisions {
        let pair = session.scheduler().unwrap().next_pair().unwrap().clone();
        session = apply(
            &session,
            Command::SubmitDecision {
                pair_id: pair.id.clone(),
                winner: Some(pair.members[0].clone()),
            },
            test_time(),
        )
        .unwrap()
        .session;
    }
    session
}

/// A store whose operations fail a set number of times before succeeding.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: crate::MemoryStore,
    pub failures_left: u32,
    pub calls: u32,
    pub permanent: bool,
}

impl FlakyStore {
    fn attempt(&mut self) -> Result<(), PersistenceError> {
        self.calls += 1;
        if self.permanent {
            return Err(PersistenceError::InitializationError(String::from(
                "read-only volume",
            )));
        }
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(PersistenceError::Unavailable(String::from("database is locked")));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.attempt()?;
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.attempt()?;
        self.inner.put(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, PersistenceError> {
        self.attempt()?;
        self.inner.remove(key)
    }

    fn keys_with_prefix(&mut self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        self.attempt()?;
        self.inner.keys_with_prefix(prefix)
    }
}
