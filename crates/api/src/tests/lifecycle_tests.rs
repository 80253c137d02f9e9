// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use songrank_domain::Stage;

use super::helpers::{SharedStore, create_comparing_engine, create_started_engine, decide_all};
use crate::{ApiError, Durability, Engine, FinishResponse, ProgressResponse, RankingResponse};

#[test]
fn test_full_session_reaches_results() {
    let store: SharedStore = SharedStore::default();
    let mut engine: Engine<SharedStore> = create_comparing_engine(&store, 6);

    let decided: usize = decide_all(&mut engine);
    assert!(decided >= 9, "each of 6 songs needs 3 comparisons");

    let finished: FinishResponse = engine.finish().unwrap();

    assert!(finished.durability.durable);
    assert!(finished.ranking.is_final);
    assert_eq!(finished.ranking.stage, Stage::Results);
    assert_eq!(finished.ranking.entries.len(), 6);
    assert_eq!(engine.get_stage().unwrap().title, "Crown the Best!");
    for entry in &finished.ranking.entries {
        assert!(entry.comparisons >= 3, "{} compared too little", entry.candidate_id);
    }
}

#[test]
fn test_unbeaten_song_outranks_winless_song() {
    let store: SharedStore = SharedStore::default();
    let mut engine: Engine<SharedStore> = create_comparing_engine(&store, 5);
    decide_all(&mut engine);

    let ranking: RankingResponse = engine.finish().unwrap().ranking;
    let position = |id: &str| -> usize {
        ranking
            .entries
            .iter()
            .find(|e| e.candidate_id == id)
            .unwrap()
            .position
    };

    let best = &ranking.entries[position("t01") - 1];
    let worst = &ranking.entries[position("t05") - 1];
    assert_eq!(best.losses, 0);
    assert_eq!(worst.wins, 0);
    assert!(best.score > worst.score);
    assert!(position("t01") < position("t05"));
}

#[test]
fn test_finish_before_exhausted_is_rejected() {
    let store: SharedStore = SharedStore::default();
    let mut engine: Engine<SharedStore> = create_comparing_engine(&store, 6);

    let err: ApiError = engine.finish().unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "tournament_incomplete"));
    assert_eq!(engine.get_stage().unwrap().stage, Stage::Comparing);
}

#[test]
fn test_finish_during_selection_is_rejected() {
    let store: SharedStore = SharedStore::default();
    let mut engine: Engine<SharedStore> = create_started_engine(&store, 3);

    let err: ApiError = engine.finish().unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "stage_order"));
}

#[test]
fn test_progress_tracks_completion() {
    let store: SharedStore = SharedStore::default();
    let mut engine: Engine<SharedStore> = create_started_engine(&store, 4);

    let selecting: ProgressResponse = engine.progress().unwrap();
    assert_eq!(selecting.step, 1);
    assert_eq!(selecting.round, 0);
    assert_eq!(selecting.eligible, 4);
    assert_eq!(selecting.percent_complete, 0);

    engine.begin_comparing().unwrap();
    decide_all(&mut engine);

    let done: ProgressResponse = engine.progress().unwrap();
    assert!(done.exhausted);
    assert_eq!(done.satisfied, 4);
    assert_eq!(done.percent_complete, 100);
}

#[test]
fn test_current_pair_after_results_is_exhausted() {
    let store: SharedStore = SharedStore::default();
    let mut engine: Engine<SharedStore> = create_comparing_engine(&store, 3);
    decide_all(&mut engine);
    engine.finish().unwrap();

    assert!(engine.get_current_pair().unwrap().exhausted);
}

#[test]
fn test_restart_discards_session() {
    let store: SharedStore = SharedStore::default();
    let mut engine: Engine<SharedStore> = create_comparing_engine(&store, 4);

    let durability: Durability = engine.restart();

    assert!(durability.durable);
    assert!(engine.session().is_none());
    assert_eq!(engine.get_stage().unwrap_err(), ApiError::NoActiveSession);
    assert!(engine.resume().unwrap().is_none());
}

#[test]
fn test_export_ranking_csv() {
    let store: SharedStore = SharedStore::default();
    let mut engine: Engine<SharedStore> = create_comparing_engine(&store, 3);
    decide_all(&mut engine);
    engine.finish().unwrap();

    let csv: String = engine.export_ranking_csv().unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "rank,song,album,score,comparisons,wins,losses,ties,candidate_id"
    );
    assert!(lines[1].starts_with("1,Song t01,Album lp-1,"));
    assert!(lines[1].ends_with(",t01"));
}
