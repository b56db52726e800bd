//! Match lifecycle: validated creation, completion, abandonment, and the
//! end-of-session sweep.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logic::daily::list_matches_today;
use crate::logic::occupancy::{busy_players, eligible_pool, is_court_busy};
use crate::logic::presence::list_eligible_players;
use crate::models::{
    EndReason, Match, MatchId, MatchMode, MatchState, PlayerId, ScheduleError, Score,
    ValidationError, VenueId,
};
use crate::store::{MatchPatch, StoreError, VenueStore};

/// Request to create a match. Slots are optional here so validation can
/// name the missing one; the stored match always has a1/b1.
#[derive(Clone, Copy, Debug, serde::Deserialize)]
pub struct CreateMatch {
    pub court: u32,
    pub mode: MatchMode,
    pub a1: Option<PlayerId>,
    pub a2: Option<PlayerId>,
    pub b1: Option<PlayerId>,
    pub b2: Option<PlayerId>,
}

/// Completion request: scores must come as a pair (both or neither).
#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
pub struct FinishOutcome {
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub ended_by: Option<Uuid>,
}

/// Outcome of a bulk sweep. Not atomic: `finished` counts matches done
/// before the first failure; prior successes are not rolled back.
#[derive(Debug)]
pub struct SweepReport {
    pub finished: usize,
    pub error: Option<ScheduleError>,
}

/// Validate and create a match in the live state.
///
/// Re-reads venue, players, and today's matches so a suggestion that went
/// stale between suggest and confirm is caught here, not persisted. A
/// store rejection on insert is the same race, reported as a conflict.
pub fn create_match(
    store: &impl VenueStore,
    venue_id: VenueId,
    req: CreateMatch,
    created_by: Uuid,
    now: DateTime<Utc>,
) -> Result<Match, ScheduleError> {
    let venue = store
        .venue_by_id(venue_id)?
        .ok_or(ScheduleError::NotFound("venue"))?;

    if req.court < 1 || req.court > venue.court_count {
        return Err(ValidationError::CourtOutOfRange {
            court: req.court,
            max: venue.court_count,
        }
        .into());
    }

    let todays = list_matches_today(store, venue_id, now)?;
    if is_court_busy(&todays, req.court) {
        return Err(ValidationError::CourtBusy(req.court).into());
    }

    let (a1, b1) = match (req.a1, req.b1) {
        (Some(a1), Some(b1)) => (a1, b1),
        (None, _) => return Err(ValidationError::MissingPlayerSlot("a1").into()),
        (_, None) => return Err(ValidationError::MissingPlayerSlot("b1").into()),
    };
    let (a2, b2) = match req.mode {
        MatchMode::Singles => {
            if req.a2.is_some() || req.b2.is_some() {
                return Err(ValidationError::SinglesWithPartners.into());
            }
            (None, None)
        }
        MatchMode::Doubles => {
            let a2 = req.a2.ok_or(ValidationError::MissingPlayerSlot("a2"))?;
            let b2 = req.b2.ok_or(ValidationError::MissingPlayerSlot("b2"))?;
            (Some(a2), Some(b2))
        }
    };

    let slots: Vec<PlayerId> = [Some(a1), a2, Some(b1), b2].into_iter().flatten().collect();
    for (i, &id) in slots.iter().enumerate() {
        if slots[..i].contains(&id) {
            return Err(ValidationError::DuplicatePlayer(id).into());
        }
    }

    let players = list_eligible_players(store, venue_id)?;
    let pool = eligible_pool(&players, &busy_players(&todays));
    for &id in &slots {
        if !players.iter().any(|p| p.player_id == id && p.present) {
            return Err(ValidationError::PlayerNotPresent(id).into());
        }
        if !pool.contains(&id) {
            return Err(ValidationError::PlayerBusy(id).into());
        }
    }

    let m = Match {
        id: Uuid::new_v4(),
        venue_id,
        court: req.court,
        state: MatchState::default(),
        a1,
        a2,
        b1,
        b2,
        created_at: now,
        created_by,
        ended_at: None,
        ended_by: None,
    };
    Ok(store.insert_match(m)?)
}

/// Finish a match, optionally with a score. Rejects partial score pairs
/// and transitions on already-terminal matches.
pub fn finish_match(
    store: &impl VenueStore,
    match_id: MatchId,
    outcome: FinishOutcome,
    now: DateTime<Utc>,
) -> Result<Match, ScheduleError> {
    let score = match (outcome.score_a, outcome.score_b) {
        (Some(a), Some(b)) => Some(Score { a, b }),
        (None, None) => None,
        _ => return Err(ValidationError::MismatchedScorePair.into()),
    };
    end_match(
        store,
        match_id,
        EndReason::Completed,
        score,
        outcome.ended_by,
        now,
    )
}

/// Stop a match without a normal finish. No score; reason recorded.
pub fn abandon_match(
    store: &impl VenueStore,
    match_id: MatchId,
    ended_by: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Match, ScheduleError> {
    end_match(store, match_id, EndReason::Abandoned, None, ended_by, now)
}

fn end_match(
    store: &impl VenueStore,
    match_id: MatchId,
    reason: EndReason,
    score: Option<Score>,
    ended_by: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Match, ScheduleError> {
    let current = store
        .match_by_id(match_id)?
        .ok_or(ScheduleError::NotFound("match"))?;
    if !current.state.is_live() {
        return Err(ScheduleError::InvalidState);
    }

    let patch = MatchPatch {
        state: MatchState::Done { reason, score },
        ended_at: Some(now),
        ended_by,
    };
    match store.update_match(match_id, patch) {
        Ok(_) => {}
        // Older schema without score columns: finishing must not be
        // blocked by an optional field, so retry without the score.
        Err(StoreError::MissingColumn(_)) if score.is_some() => {
            let fallback = MatchPatch {
                state: MatchState::Done {
                    reason,
                    score: None,
                },
                ended_at: Some(now),
                ended_by,
            };
            store.update_match(match_id, fallback)?;
        }
        Err(e) => return Err(e.into()),
    }

    store
        .match_by_id(match_id)?
        .ok_or(ScheduleError::NotFound("match"))
}

/// End-of-session sweep: finish every live match created today at the
/// venue, without scores. Stops at the first failure and reports how many
/// succeeded before it.
pub fn finish_all_open_today(
    store: &impl VenueStore,
    venue_id: VenueId,
    ended_by: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<SweepReport, ScheduleError> {
    let todays = list_matches_today(store, venue_id, now)?;
    let mut finished = 0;
    for m in todays.iter().filter(|m| m.state.is_live()) {
        let outcome = FinishOutcome {
            score_a: None,
            score_b: None,
            ended_by,
        };
        if let Err(e) = finish_match(store, m.id, outcome, now) {
            return Ok(SweepReport {
                finished,
                error: Some(e),
            });
        }
        finished += 1;
    }
    Ok(SweepReport {
        finished,
        error: None,
    })
}
