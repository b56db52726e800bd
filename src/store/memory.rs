//! In-memory store: the same capability surface as the remote store,
//! backed by vectors behind an RwLock. Used by the web binary and tests.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::models::{Match, MatchId, MatchState, Player, PlayerId, Venue, VenueId, VenuePlayer};
use crate::store::{MatchPatch, StoreError, VenueStore};

#[derive(Default)]
struct Tables {
    venues: Vec<Venue>,
    players: Vec<Player>,
    venue_players: Vec<VenuePlayer>,
    matches: Vec<Match>,
}

/// In-memory implementation of [`VenueStore`].
///
/// `legacy_scores` simulates a deployment whose matches table predates the
/// score columns: any patch carrying a score is rejected with
/// `MissingColumn`, which the lifecycle manager must negotiate around.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    legacy_scores: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            legacy_scores: false,
        }
    }

    /// A store whose schema has no score columns.
    pub fn with_legacy_scores() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            legacy_scores: true,
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Transport("store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Transport("store lock poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VenueStore for MemoryStore {
    fn list_venues(&self) -> Result<Vec<Venue>, StoreError> {
        let t = self.read()?;
        let mut venues = t.venues.clone();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    fn create_venue(&self, venue: Venue) -> Result<Venue, StoreError> {
        let mut t = self.write()?;
        t.venues.push(venue.clone());
        Ok(venue)
    }

    fn venue_by_id(&self, venue_id: VenueId) -> Result<Option<Venue>, StoreError> {
        let t = self.read()?;
        Ok(t.venues.iter().find(|v| v.id == venue_id).cloned())
    }

    fn create_player(&self, player: Player) -> Result<Player, StoreError> {
        let mut t = self.write()?;
        t.players.push(player.clone());
        Ok(player)
    }

    fn venue_players(&self, venue_id: VenueId) -> Result<Vec<(VenuePlayer, Player)>, StoreError> {
        let t = self.read()?;
        let mut rows = Vec::new();
        for vp in t.venue_players.iter().filter(|vp| vp.venue_id == venue_id) {
            let player = t
                .players
                .iter()
                .find(|p| p.id == vp.player_id)
                .ok_or_else(|| StoreError::Rejected("dangling player reference".into()))?;
            rows.push((vp.clone(), player.clone()));
        }
        Ok(rows)
    }

    fn add_venue_player(&self, row: VenuePlayer) -> Result<(), StoreError> {
        let mut t = self.write()?;
        // PK (venue_id, player_id): ignore duplicates
        let exists = t
            .venue_players
            .iter()
            .any(|vp| vp.venue_id == row.venue_id && vp.player_id == row.player_id);
        if !exists {
            t.venue_players.push(row);
        }
        Ok(())
    }

    fn set_presence(
        &self,
        venue_id: VenueId,
        player_id: PlayerId,
        present: bool,
    ) -> Result<usize, StoreError> {
        let mut t = self.write()?;
        let mut updated = 0;
        for vp in t
            .venue_players
            .iter_mut()
            .filter(|vp| vp.venue_id == venue_id && vp.player_id == player_id)
        {
            vp.present = present;
            updated += 1;
        }
        Ok(updated)
    }

    fn remove_venue_player(
        &self,
        venue_id: VenueId,
        player_id: PlayerId,
    ) -> Result<usize, StoreError> {
        let mut t = self.write()?;
        let before = t.venue_players.len();
        t.venue_players
            .retain(|vp| !(vp.venue_id == venue_id && vp.player_id == player_id));
        Ok(before - t.venue_players.len())
    }

    fn matches_between(
        &self,
        venue_id: VenueId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Match>, StoreError> {
        let t = self.read()?;
        let mut rows: Vec<Match> = t
            .matches
            .iter()
            .filter(|m| m.venue_id == venue_id && m.created_at >= from && m.created_at < to)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn match_by_id(&self, match_id: MatchId) -> Result<Option<Match>, StoreError> {
        let t = self.read()?;
        Ok(t.matches.iter().find(|m| m.id == match_id).cloned())
    }

    fn insert_match(&self, m: Match) -> Result<Match, StoreError> {
        let mut t = self.write()?;
        t.matches.push(m.clone());
        Ok(m)
    }

    fn update_match(&self, match_id: MatchId, patch: MatchPatch) -> Result<usize, StoreError> {
        if self.legacy_scores {
            if let MatchState::Done { score: Some(_), .. } = patch.state {
                return Err(StoreError::MissingColumn("score_a"));
            }
        }
        let mut t = self.write()?;
        let mut updated = 0;
        for m in t.matches.iter_mut().filter(|m| m.id == match_id) {
            m.state = patch.state;
            m.ended_at = patch.ended_at;
            m.ended_by = patch.ended_by;
            updated += 1;
        }
        Ok(updated)
    }
}
