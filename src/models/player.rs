//! Player and venue-membership data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::venue::VenueId;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// A player. Global identity: not owned by any venue; venues reference it
/// through [`VenuePlayer`] rows.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Create a new player with the given name, stamped now.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
        }
    }
}

/// Membership row relating a player to a venue. At most one row per
/// (venue, player) pair; removing it leaves the global player intact.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VenuePlayer {
    pub venue_id: VenueId,
    pub player_id: PlayerId,
    /// Whether the player is at the venue today. Defaults to true on join.
    pub present: bool,
    pub joined_at: DateTime<Utc>,
}

/// Flattened membership + player view returned by the presence registry
/// (what the UI gets as the selectable player list).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VenuePlayerView {
    pub player_id: PlayerId,
    pub name: String,
    pub present: bool,
    /// Creation time of the global player (sort key for the list).
    pub created_at: DateTime<Utc>,
}
