// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{Session, SessionEvent, Tournament, Transition};
use songrank_domain::{CandidateId, Decision, DomainError, Outcome, Pair, PairId, Stage};
use songrank_ledger::LedgerError;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Applies a command to a session, producing a new session and an event.
///
/// # Arguments
///
/// * `session` - The current session (immutable)
/// * `command` - The command to apply
/// * `now` - Timestamp for any decision recorded
///
/// # Returns
///
/// * `Ok(Transition)` containing the new session and the event
/// * `Err(CoreError)` if the command is invalid; `session` is untouched
///
/// # Errors
///
/// Returns an error if:
/// - The command is not valid in the current stage
/// - Comparing would start with fewer than two eligible candidates
/// - The pair was already decided, never issued, or the winner is not a member
/// - Results are requested before the scheduler is exhausted
pub fn apply(
    session: &Session,
    command: Command,
    now: OffsetDateTime,
) -> Result<Transition, CoreError> {
    match command {
        Command::ExcludeCandidate { candidate_id } => {
            set_eligibility(session, candidate_id, false)
        }
        Command::IncludeCandidate { candidate_id } => set_eligibility(session, candidate_id, true),
        Command::BeginComparing => {
            if !session.stage.can_transition_to(Stage::Comparing) {
                return Err(CoreError::DomainViolation(
                    DomainError::InvalidStageTransition {
                        from: session.stage,
                        to: Stage::Comparing,
                    },
                ));
            }
            let eligible: usize = session.pool.eligible_count();
            if eligible < 2 {
                return Err(CoreError::InsufficientCandidates { eligible });
            }

            let mut new_session: Session = session.clone();
            new_session.stage = Stage::Comparing;
            let tournament: Tournament = Tournament::start(&new_session);
            let round_limit: u32 = tournament.scheduler.round_limit();
            new_session.tournament = Some(tournament);

            info!(
                session_id = %session.id,
                eligible,
                round_limit,
                "Comparing began"
            );
            Ok(Transition {
                session: new_session,
                event: SessionEvent::ComparingBegan {
                    eligible,
                    round_limit,
                },
            })
        }
        Command::SubmitDecision { pair_id, winner } => {
            record(session, &pair_id, Outcome::from_winner(winner), now)
        }
        Command::SkipPair { pair_id } => record(session, &pair_id, Outcome::Skip, now),
        Command::FinishTournament => {
            if !session.stage.can_transition_to(Stage::Results) {
                return Err(CoreError::DomainViolation(
                    DomainError::InvalidStageTransition {
                        from: session.stage,
                        to: Stage::Results,
                    },
                ));
            }
            let scheduler = session
                .scheduler()
                .ok_or_else(|| CoreError::InvalidSnapshot(String::from("missing scheduler")))?;
            if !scheduler.is_exhausted() {
                return Err(CoreError::TournamentIncomplete {
                    round: scheduler.round(),
                    decisions: session.ledger.len(),
                });
            }

            let mut new_session: Session = session.clone();
            new_session.stage = Stage::Results;
            info!(
                session_id = %session.id,
                decisions = session.ledger.len(),
                "Tournament finished"
            );
            Ok(Transition {
                session: new_session,
                event: SessionEvent::TournamentFinished {
                    decisions: session.ledger.len(),
                },
            })
        }
    }
}

fn set_eligibility(
    session: &Session,
    candidate_id: CandidateId,
    eligible: bool,
) -> Result<Transition, CoreError> {
    if !session.stage.allows_selection_changes() {
        return Err(CoreError::DomainViolation(DomainError::SelectionLocked {
            stage: session.stage,
        }));
    }

    let mut new_session: Session = session.clone();
    new_session.pool.set_eligible(&candidate_id, eligible)?;
    debug!(candidate_id = %candidate_id, eligible, "Candidate eligibility changed");

    let event: SessionEvent = if eligible {
        SessionEvent::CandidateIncluded(candidate_id)
    } else {
        SessionEvent::CandidateExcluded(candidate_id)
    };
    Ok(Transition {
        session: new_session,
        event,
    })
}

fn record(
    session: &Session,
    pair_id: &PairId,
    outcome: Outcome,
    now: OffsetDateTime,
) -> Result<Transition, CoreError> {
    if session.stage != Stage::Comparing {
        return Err(CoreError::WrongStage {
            expected: Stage::Comparing,
            actual: session.stage,
        });
    }
    if session.ledger.contains(pair_id) {
        return Err(CoreError::Ledger(LedgerError::DuplicatePair(pair_id.clone())));
    }

    let pair: &Pair = session
        .scheduler()
        .and_then(|s| s.find_live(pair_id))
        .ok_or_else(|| CoreError::UnknownPair(pair_id.clone()))?;
    if let Some(winner) = outcome.winner().filter(|w| !pair.contains(w)) {
        return Err(CoreError::WinnerNotInPair {
            pair_id: pair_id.clone(),
            winner: winner.clone(),
        });
    }
    let decision: Decision = Decision::for_pair(pair, outcome, now);

    let mut new_session: Session = session.clone();
    new_session.ledger.append(decision.clone())?;
    let tournament: &mut Tournament = new_session
        .tournament
        .as_mut()
        .ok_or_else(|| CoreError::InvalidSnapshot(String::from("missing scheduler")))?;
    tournament.standings.apply(&decision);
    tournament
        .scheduler
        .record(&decision, &tournament.standings)?;
    let exhausted: bool = tournament.scheduler.is_exhausted();

    debug!(
        pair_id = %decision.pair_id,
        outcome = ?decision.outcome,
        round = decision.round,
        exhausted,
        "Decision recorded"
    );
    Ok(Transition {
        session: new_session,
        event: SessionEvent::DecisionRecorded {
            decision,
            exhausted,
        },
    })
}
