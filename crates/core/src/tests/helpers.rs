// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, Next, Session, apply};
use songrank_domain::{
    Candidate, CandidateId, CandidateMetadata, CandidatePool, Pair, TournamentConfig,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const TEST_SEED: u64 = 0x5EED_F00D_CAFE;

pub fn test_time() -> OffsetDateTime {
    datetime!(2026-04-12 20:15 UTC)
}

pub fn ids(values: &[&str]) -> Vec<CandidateId> {
    values.iter().map(|v| CandidateId::new(v)).collect()
}

pub fn create_test_pool(values: &[&str]) -> CandidatePool {
    CandidatePool::from_candidates(
        values
            .iter()
            .map(|v| {
                Candidate::new(
                    CandidateId::new(v),
                    format!("Song {v}"),
                    CandidateMetadata::default(),
                )
            })
            .collect(),
    )
}

pub fn create_test_session(values: &[&str]) -> Session {
    create_test_session_with_config(values, TournamentConfig::default())
}

pub fn create_test_session_with_config(values: &[&str], config: TournamentConfig) -> Session {
    Session::new(
        String::from("session-1"),
        String::from("artist-1"),
        create_test_pool(values),
        config,
        TEST_SEED,
    )
    .unwrap()
}

pub fn create_comparing_session(values: &[&str]) -> Session {
    apply(
        &create_test_session(values),
        Command::BeginComparing,
        test_time(),
    )
    .unwrap()
    .session
}

pub fn live_pair(session: &Session) -> Pair {
    match session.current_pair() {
        Next::Pair(pair) => pair.clone(),
        Next::Exhausted => panic!("expected a live pair"),
    }
}

/// The lexically smaller member wins.
pub fn smaller_wins(_step: usize, pair: &Pair) -> Command {
    let winner: CandidateId = pair.members.iter().min().unwrap().clone();
    Command::SubmitDecision {
        pair_id: pair.id.clone(),
        winner: Some(winner),
    }
}

/// A mix of wins, ties and skips.
pub fn mixed_outcomes(step: usize, pair: &Pair) -> Command {
    match step % 5 {
        2 => Command::SubmitDecision {
            pair_id: pair.id.clone(),
            winner: None,
        },
        4 => Command::SkipPair {
            pair_id: pair.id.clone(),
        },
        1 => Command::SubmitDecision {
            pair_id: pair.id.clone(),
            winner: Some(pair.members[1].clone()),
        },
        _ => Command::SubmitDecision {
            pair_id: pair.id.clone(),
            winner: Some(pair.members[0].clone()),
        },
    }
}

/// Decides pairs until the scheduler is exhausted, checking after every
/// step that no candidate sits in two live pairs.
pub fn run_to_exhaustion(session: Session, choose: fn(usize, &Pair) -> Command) -> Session {
    let mut session: Session = session;
    for step in 0..10_000 {
        assert_live_pairs_disjoint(&session);
        let pair: Pair = match session.current_pair() {
            Next::Pair(pair) => pair.clone(),
            Next::Exhausted => return session,
        };
        session = apply(&session, choose(step, &pair), test_time())
            .unwrap()
            .session;
    }
    panic!("tournament did not terminate");
}

pub fn assert_live_pairs_disjoint(session: &Session) {
    let Some(scheduler) = session.scheduler() else {
        return;
    };
    let mut seen: std::collections::HashSet<&CandidateId> = std::collections::HashSet::new();
    for pair in scheduler.live_pairs() {
        for member in &pair.members {
            assert!(seen.insert(member), "{member} is in two live pairs");
        }
    }
}
