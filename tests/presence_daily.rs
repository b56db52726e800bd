//! Integration tests for the presence registry, the daily query/filters,
//! and the session cache's role gating.

use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use matchday_web::{
    add_player_to_venue, apply_filter, day_bounds, list_eligible_players, list_matches_today,
    register_player, remove_player_from_venue, resolve_my_player_id, set_presence, Match,
    MatchFilter, MatchState, MemoryStore, Player, PlayerId, Role, ScheduleError, ValidationError,
    Venue, VenueId, VenueSession, VenueStore,
};
use uuid::Uuid;

fn store_with_venue() -> (MemoryStore, VenueId) {
    let store = MemoryStore::new();
    let venue = store
        .create_venue(Venue::new("Club", Uuid::new_v4(), Utc::now()))
        .unwrap();
    (store, venue.id)
}

fn live_match(venue_id: VenueId, court: u32, ids: &[PlayerId; 4], created_at: chrono::DateTime<Utc>) -> Match {
    Match {
        id: Uuid::new_v4(),
        venue_id,
        court,
        state: MatchState::default(),
        a1: ids[0],
        a2: Some(ids[1]),
        b1: ids[2],
        b2: Some(ids[3]),
        created_at,
        created_by: Uuid::nil(),
        ended_at: None,
        ended_by: None,
    }
}

#[test]
fn players_sorted_by_creation_then_name() {
    let (store, venue_id) = store_with_venue();
    let t0 = Utc::now();
    let t1 = t0 + Duration::minutes(5);

    // Same creation instant: falls back to case-insensitive name order.
    for name in ["zoe", "Alice"] {
        let p = store.create_player(Player::new(name, t1)).unwrap();
        add_player_to_venue(&store, venue_id, p.id, t1).unwrap();
    }
    let oldest = store.create_player(Player::new("Mallory", t0)).unwrap();
    add_player_to_venue(&store, venue_id, oldest.id, t1).unwrap();

    let names: Vec<String> = list_eligible_players(&store, venue_id)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Mallory", "Alice", "zoe"]);
}

#[test]
fn add_player_is_idempotent() {
    let (store, venue_id) = store_with_venue();
    let p = register_player(&store, venue_id, "Ana", Utc::now()).unwrap();
    add_player_to_venue(&store, venue_id, p.id, Utc::now()).unwrap();
    add_player_to_venue(&store, venue_id, p.id, Utc::now()).unwrap();

    let listed = list_eligible_players(&store, venue_id).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].present);
}

#[test]
fn register_rejects_blank_names() {
    let (store, venue_id) = store_with_venue();
    let err = register_player(&store, venue_id, "   ", Utc::now()).unwrap_err();
    assert_eq!(err, ScheduleError::Validation(ValidationError::EmptyName));
}

#[test]
fn presence_toggle_requires_membership() {
    let (store, venue_id) = store_with_venue();
    let err = set_presence(&store, venue_id, Uuid::new_v4(), false).unwrap_err();
    assert_eq!(err, ScheduleError::NotFound("venue player"));

    let p = register_player(&store, venue_id, "Ana", Utc::now()).unwrap();
    set_presence(&store, venue_id, p.id, false).unwrap();
    // Idempotent: same value again is fine.
    set_presence(&store, venue_id, p.id, false).unwrap();
    assert!(!list_eligible_players(&store, venue_id).unwrap()[0].present);
}

#[test]
fn removal_keeps_global_player_for_readding() {
    let (store, venue_id) = store_with_venue();
    let p = register_player(&store, venue_id, "Ana", Utc::now()).unwrap();

    remove_player_from_venue(&store, venue_id, p.id).unwrap();
    assert!(list_eligible_players(&store, venue_id).unwrap().is_empty());

    add_player_to_venue(&store, venue_id, p.id, Utc::now()).unwrap();
    let listed = list_eligible_players(&store, venue_id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Ana");
}

#[test]
fn today_excludes_previous_local_day() {
    let (store, venue_id) = store_with_venue();
    let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

    let now = Utc::now();
    let (start, _next) = day_bounds(now.with_timezone(&Local));

    // One match just before local midnight, one just after.
    store
        .insert_match(live_match(venue_id, 1, &ids, start - Duration::seconds(1)))
        .unwrap();
    let today = store
        .insert_match(live_match(venue_id, 2, &ids, start))
        .unwrap();

    let listed = list_matches_today(&store, venue_id, now).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, today.id);
}

#[test]
fn today_is_ordered_newest_first() {
    let (store, venue_id) = store_with_venue();
    let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let now = Utc::now();

    let older = store
        .insert_match(live_match(venue_id, 1, &ids, now - Duration::minutes(10)))
        .unwrap();
    let newer = store
        .insert_match(live_match(venue_id, 2, &ids, now))
        .unwrap();

    let listed = list_matches_today(&store, venue_id, now).unwrap();
    assert_eq!(
        listed.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![newer.id, older.id]
    );
}

#[test]
fn filters_apply_over_fetched_set() {
    let venue_id = Uuid::new_v4();
    let mine = Uuid::new_v4();
    let others = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let now = Utc::now();

    let mut with_me = live_match(venue_id, 1, &others, now);
    with_me.b2 = Some(mine);
    let mut done = live_match(venue_id, 2, &others, now);
    done.state = MatchState::Done {
        reason: matchday_web::EndReason::Completed,
        score: None,
    };
    let matches = vec![with_me.clone(), done];

    assert_eq!(apply_filter(&matches, MatchFilter::All, None).len(), 2);

    let in_progress = apply_filter(&matches, MatchFilter::InProgress, None);
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id, with_me.id);

    let my_matches = apply_filter(&matches, MatchFilter::Mine, Some(mine));
    assert_eq!(my_matches.len(), 1);
    assert_eq!(my_matches[0].id, with_me.id);

    // Unresolved caller: empty, never silently everything.
    assert!(apply_filter(&matches, MatchFilter::Mine, None).is_empty());
}

#[test]
fn my_player_id_resolves_by_trimmed_name() {
    let (store, venue_id) = store_with_venue();
    register_player(&store, venue_id, "Ana Gauthier", Utc::now()).unwrap();
    let players = list_eligible_players(&store, venue_id).unwrap();

    let id = resolve_my_player_id(&players, "  Ana Gauthier ");
    assert_eq!(id, Some(players[0].player_id));
    assert_eq!(resolve_my_player_id(&players, "Someone Else"), None);
    assert_eq!(resolve_my_player_id(&players, "   "), None);
}

#[test]
fn session_gates_organiser_actions_by_role() {
    let (store, venue_id) = store_with_venue();
    let p = register_player(&store, venue_id, "Ana", Utc::now()).unwrap();
    let store = Arc::new(store);

    let mut as_player = VenueSession::open(
        store.clone(),
        venue_id,
        Uuid::new_v4(),
        Role::Player,
        "Ana",
    )
    .unwrap();
    assert_eq!(as_player.finish_all().unwrap_err(), ScheduleError::Forbidden);
    assert_eq!(
        as_player.set_presence(p.id, false).unwrap_err(),
        ScheduleError::Forbidden
    );

    let mut as_organiser = VenueSession::open(
        store,
        venue_id,
        Uuid::new_v4(),
        Role::Organiser,
        "Ana",
    )
    .unwrap();
    as_organiser.set_presence(p.id, false).unwrap();
    let report = as_organiser.finish_all().unwrap();
    assert_eq!(report.finished, 0);
}

#[test]
fn session_resolves_caller_player_from_display_name() {
    let (store, venue_id) = store_with_venue();
    let p = register_player(&store, venue_id, "Ana", Utc::now()).unwrap();

    let session = VenueSession::open(
        Arc::new(store),
        venue_id,
        Uuid::new_v4(),
        Role::Player,
        "Ana",
    )
    .unwrap();
    assert_eq!(session.my_player_id(), Some(p.id));
}
