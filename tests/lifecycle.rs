//! Integration tests for match creation, completion, and the bulk sweep.

use chrono::Utc;
use matchday_web::{
    abandon_match, busy_players, create_match, eligible_pool, finish_all_open_today, finish_match,
    list_eligible_players, list_matches_today, register_player, set_presence, suggest_teams,
    CreateMatch, EndReason, FinishOutcome, MatchMode, MatchState, MemoryStore, PairingConfig,
    PlayerId, ScheduleError, Score, ValidationError, Venue, VenueId, VenueStore,
};
use uuid::Uuid;

fn setup(player_count: usize) -> (MemoryStore, VenueId, Vec<PlayerId>) {
    let store = MemoryStore::new();
    let now = Utc::now();
    let venue = store
        .create_venue(Venue::new("Club", Uuid::new_v4(), now))
        .unwrap();
    let ids = (0..player_count)
        .map(|i| {
            register_player(&store, venue.id, &format!("P{i}"), now)
                .unwrap()
                .id
        })
        .collect();
    (store, venue.id, ids)
}

fn doubles_request(court: u32, ids: &[PlayerId]) -> CreateMatch {
    CreateMatch {
        court,
        mode: MatchMode::Doubles,
        a1: Some(ids[0]),
        a2: Some(ids[1]),
        b1: Some(ids[2]),
        b2: Some(ids[3]),
    }
}

#[test]
fn create_doubles_occupies_players_and_court() {
    let (store, venue_id, ids) = setup(4);
    let m = create_match(&store, venue_id, doubles_request(3, &ids), Uuid::nil(), Utc::now())
        .unwrap();
    assert!(m.state.is_live());
    assert_eq!(m.court, 3);

    let todays = list_matches_today(&store, venue_id, Utc::now()).unwrap();
    let busy = busy_players(&todays);
    for id in &ids {
        assert!(busy.contains(id));
    }
}

#[test]
fn court_frees_up_after_finish() {
    let (store, venue_id, ids) = setup(8);
    let first =
        create_match(&store, venue_id, doubles_request(3, &ids[..4]), Uuid::nil(), Utc::now())
            .unwrap();

    let err = create_match(&store, venue_id, doubles_request(3, &ids[4..]), Uuid::nil(), Utc::now())
        .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Validation(ValidationError::CourtBusy(3))
    );

    finish_match(&store, first.id, FinishOutcome::default(), Utc::now()).unwrap();
    create_match(&store, venue_id, doubles_request(3, &ids[4..]), Uuid::nil(), Utc::now())
        .unwrap();
}

#[test]
fn court_out_of_range_rejected() {
    let (store, venue_id, ids) = setup(4);
    let err = create_match(&store, venue_id, doubles_request(13, &ids), Uuid::nil(), Utc::now())
        .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Validation(ValidationError::CourtOutOfRange { court: 13, max: 12 })
    );
}

#[test]
fn duplicate_player_rejected() {
    let (store, venue_id, ids) = setup(4);
    let req = CreateMatch {
        court: 1,
        mode: MatchMode::Doubles,
        a1: Some(ids[0]),
        a2: Some(ids[1]),
        b1: Some(ids[0]),
        b2: Some(ids[2]),
    };
    let err = create_match(&store, venue_id, req, Uuid::nil(), Utc::now()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Validation(ValidationError::DuplicatePlayer(ids[0]))
    );
}

#[test]
fn singles_rejects_partner_slots() {
    let (store, venue_id, ids) = setup(4);
    let req = CreateMatch {
        court: 1,
        mode: MatchMode::Singles,
        a1: Some(ids[0]),
        a2: Some(ids[1]),
        b1: Some(ids[2]),
        b2: None,
    };
    let err = create_match(&store, venue_id, req, Uuid::nil(), Utc::now()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Validation(ValidationError::SinglesWithPartners)
    );
}

#[test]
fn doubles_requires_all_four_slots() {
    let (store, venue_id, ids) = setup(4);
    let req = CreateMatch {
        court: 1,
        mode: MatchMode::Doubles,
        a1: Some(ids[0]),
        a2: None,
        b1: Some(ids[1]),
        b2: Some(ids[2]),
    };
    let err = create_match(&store, venue_id, req, Uuid::nil(), Utc::now()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Validation(ValidationError::MissingPlayerSlot("a2"))
    );
}

#[test]
fn busy_player_rejected_on_second_court() {
    let (store, venue_id, ids) = setup(7);
    create_match(&store, venue_id, doubles_request(1, &ids[..4]), Uuid::nil(), Utc::now())
        .unwrap();

    // ids[0] is already playing on court 1
    let req = CreateMatch {
        court: 2,
        mode: MatchMode::Doubles,
        a1: Some(ids[0]),
        a2: Some(ids[4]),
        b1: Some(ids[5]),
        b2: Some(ids[6]),
    };
    let err = create_match(&store, venue_id, req, Uuid::nil(), Utc::now()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Validation(ValidationError::PlayerBusy(ids[0]))
    );
}

#[test]
fn absent_player_rejected() {
    let (store, venue_id, ids) = setup(4);
    set_presence(&store, venue_id, ids[1], false).unwrap();
    let err = create_match(&store, venue_id, doubles_request(1, &ids), Uuid::nil(), Utc::now())
        .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Validation(ValidationError::PlayerNotPresent(ids[1]))
    );
}

#[test]
fn finish_rejects_partial_score_pair() {
    let (store, venue_id, ids) = setup(4);
    let m = create_match(&store, venue_id, doubles_request(1, &ids), Uuid::nil(), Utc::now())
        .unwrap();

    let partial = FinishOutcome {
        score_a: Some(11),
        score_b: None,
        ended_by: None,
    };
    let err = finish_match(&store, m.id, partial, Utc::now()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Validation(ValidationError::MismatchedScorePair)
    );

    let full = FinishOutcome {
        score_a: Some(11),
        score_b: Some(7),
        ended_by: None,
    };
    let finished = finish_match(&store, m.id, full, Utc::now()).unwrap();
    assert_eq!(
        finished.state,
        MatchState::Done {
            reason: EndReason::Completed,
            score: Some(Score { a: 11, b: 7 }),
        }
    );
    assert!(finished.ended_at.is_some());
}

#[test]
fn no_double_completion() {
    let (store, venue_id, ids) = setup(4);
    let m = create_match(&store, venue_id, doubles_request(1, &ids), Uuid::nil(), Utc::now())
        .unwrap();
    finish_match(&store, m.id, FinishOutcome::default(), Utc::now()).unwrap();

    let err = finish_match(&store, m.id, FinishOutcome::default(), Utc::now()).unwrap_err();
    assert_eq!(err, ScheduleError::InvalidState);
    let err = abandon_match(&store, m.id, None, Utc::now()).unwrap_err();
    assert_eq!(err, ScheduleError::InvalidState);
}

#[test]
fn abandon_records_reason_without_score() {
    let (store, venue_id, ids) = setup(4);
    let m = create_match(&store, venue_id, doubles_request(1, &ids), Uuid::nil(), Utc::now())
        .unwrap();
    let ended = abandon_match(&store, m.id, Some(Uuid::nil()), Utc::now()).unwrap();
    assert_eq!(
        ended.state,
        MatchState::Done {
            reason: EndReason::Abandoned,
            score: None,
        }
    );
}

#[test]
fn legacy_schema_finish_drops_score_instead_of_failing() {
    let store = MemoryStore::with_legacy_scores();
    let now = Utc::now();
    let venue = store
        .create_venue(Venue::new("Club", Uuid::new_v4(), now))
        .unwrap();
    let ids: Vec<PlayerId> = (0..4)
        .map(|i| register_player(&store, venue.id, &format!("P{i}"), now).unwrap().id)
        .collect();
    let m = create_match(&store, venue.id, doubles_request(1, &ids), Uuid::nil(), now).unwrap();

    let outcome = FinishOutcome {
        score_a: Some(11),
        score_b: Some(9),
        ended_by: None,
    };
    let finished = finish_match(&store, m.id, outcome, Utc::now()).unwrap();
    assert_eq!(
        finished.state,
        MatchState::Done {
            reason: EndReason::Completed,
            score: None,
        }
    );
}

#[test]
fn sweep_finishes_only_live_matches_and_counts() {
    let (store, venue_id, ids) = setup(8);
    let first =
        create_match(&store, venue_id, doubles_request(1, &ids[..4]), Uuid::nil(), Utc::now())
            .unwrap();
    finish_match(&store, first.id, FinishOutcome::default(), Utc::now()).unwrap();
    create_match(&store, venue_id, doubles_request(2, &ids[..4]), Uuid::nil(), Utc::now())
        .unwrap();
    create_match(&store, venue_id, doubles_request(3, &ids[4..]), Uuid::nil(), Utc::now())
        .unwrap();

    let report = finish_all_open_today(&store, venue_id, None, Utc::now()).unwrap();
    assert_eq!(report.finished, 2);
    assert!(report.error.is_none());

    let todays = list_matches_today(&store, venue_id, Utc::now()).unwrap();
    assert!(todays.iter().all(|m| !m.state.is_live()));

    let again = finish_all_open_today(&store, venue_id, None, Utc::now()).unwrap();
    assert_eq!(again.finished, 0);
}

#[test]
fn suggestion_then_create_then_empty_pool() {
    let (store, venue_id, _ids) = setup(4);
    let mut rng = rand::thread_rng();
    let cfg = PairingConfig::default();

    let players = list_eligible_players(&store, venue_id).unwrap();
    let todays = list_matches_today(&store, venue_id, Utc::now()).unwrap();
    let pool = eligible_pool(&players, &busy_players(&todays));
    let s = suggest_teams(&mut rng, &pool, &todays, MatchMode::Doubles, &cfg).unwrap();

    let req = CreateMatch {
        court: 1,
        mode: MatchMode::Doubles,
        a1: Some(s.a1),
        a2: s.a2,
        b1: Some(s.b1),
        b2: s.b2,
    };
    create_match(&store, venue_id, req, Uuid::nil(), Utc::now()).unwrap();

    // All four are now busy: the pool is empty and no suggestion exists.
    let todays = list_matches_today(&store, venue_id, Utc::now()).unwrap();
    let pool = eligible_pool(&players, &busy_players(&todays));
    assert!(pool.is_empty());
    assert!(suggest_teams(&mut rng, &pool, &todays, MatchMode::Doubles, &cfg).is_none());
}
