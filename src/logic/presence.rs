//! Presence registry: who belongs to a venue and is marked present.
//!
//! The registry never inspects match state; busy/free is the occupancy
//! tracker's job.

use chrono::{DateTime, Utc};

use crate::models::{
    Player, PlayerId, ScheduleError, ValidationError, VenueId, VenuePlayer, VenuePlayerView,
};
use crate::store::VenueStore;

/// Venue players sorted by player creation time, ties broken by
/// case-insensitive name comparison.
pub fn list_eligible_players(
    store: &impl VenueStore,
    venue_id: VenueId,
) -> Result<Vec<VenuePlayerView>, ScheduleError> {
    let mut views: Vec<VenuePlayerView> = store
        .venue_players(venue_id)?
        .into_iter()
        .map(|(vp, p)| VenuePlayerView {
            player_id: p.id,
            name: p.name,
            present: vp.present,
            created_at: p.created_at,
        })
        .collect();
    views.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Ok(views)
}

/// Mark a player present/absent at a venue. Idempotent; fails with
/// NotFound when the player has no membership row at the venue.
pub fn set_presence(
    store: &impl VenueStore,
    venue_id: VenueId,
    player_id: PlayerId,
    present: bool,
) -> Result<(), ScheduleError> {
    let updated = store.set_presence(venue_id, player_id, present)?;
    if updated == 0 {
        return Err(ScheduleError::NotFound("venue player"));
    }
    Ok(())
}

/// Add an existing player to a venue. Keyed on (venue, player): duplicate
/// calls are no-ops. New memberships default to present.
pub fn add_player_to_venue(
    store: &impl VenueStore,
    venue_id: VenueId,
    player_id: PlayerId,
    now: DateTime<Utc>,
) -> Result<(), ScheduleError> {
    store.add_venue_player(VenuePlayer {
        venue_id,
        player_id,
        present: true,
        joined_at: now,
    })?;
    Ok(())
}

/// Remove a player's membership at a venue. The global player persists
/// and may be re-added later.
pub fn remove_player_from_venue(
    store: &impl VenueStore,
    venue_id: VenueId,
    player_id: PlayerId,
) -> Result<(), ScheduleError> {
    store.remove_venue_player(venue_id, player_id)?;
    Ok(())
}

/// Create a global player and register them at the venue in one flow
/// (the "add player" button). Returns the created player.
pub fn register_player(
    store: &impl VenueStore,
    venue_id: VenueId,
    name: &str,
    now: DateTime<Utc>,
) -> Result<Player, ScheduleError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    let player = store.create_player(Player::new(name, now))?;
    add_player_to_venue(store, venue_id, player.id, now)?;
    Ok(player)
}
