//! Occupancy: which players and courts are held by live matches.
//!
//! Pure derivation over a match list. Recomputed on every refresh; never
//! cached across a mutation.

use std::collections::HashSet;

use crate::models::{Match, PlayerId, VenuePlayerView};

/// Player ids appearing in any slot of a live match.
pub fn busy_players(matches: &[Match]) -> HashSet<PlayerId> {
    let mut busy = HashSet::new();
    for m in matches.iter().filter(|m| m.state.is_live()) {
        busy.extend(m.player_ids());
    }
    busy
}

/// True if a live match in the set holds this court.
pub fn is_court_busy(matches: &[Match], court: u32) -> bool {
    matches.iter().any(|m| m.state.is_live() && m.court == court)
}

/// Players marked present and not busy: the selectable pool for new
/// matches and the input to the pairing engine. Keeps the list's order.
pub fn eligible_pool(players: &[VenuePlayerView], busy: &HashSet<PlayerId>) -> Vec<PlayerId> {
    players
        .iter()
        .filter(|p| p.present && !busy.contains(&p.player_id))
        .map(|p| p.player_id)
        .collect()
}
