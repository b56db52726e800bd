//! Data-access capability the core talks to.
//!
//! The remote store is the only arbiter of concurrent-write safety; the
//! core treats its rejections as recoverable conflicts, not fatal errors.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Match, MatchId, MatchState, Player, PlayerId, Venue, VenueId, VenuePlayer,
};

/// Failures from the data store. The core must distinguish transport
/// problems (retryable by the caller) from rejections (not retryable).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// Network/timeout class; the request may never have reached the store.
    Transport(String),
    /// The store refused the operation (constraint, permission).
    Rejected(String),
    /// Schema-rejection: the payload referenced a column the deployed
    /// schema does not have. Used for capability negotiation on finish.
    MissingColumn(&'static str),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Transport(msg) => write!(f, "transport failure: {}", msg),
            StoreError::Rejected(msg) => write!(f, "store rejected: {}", msg),
            StoreError::MissingColumn(col) => write!(f, "unknown column: {}", col),
        }
    }
}

impl std::error::Error for StoreError {}

/// Partial update applied to a match row. Only status/end fields are ever
/// patched; team slots are immutable after creation.
#[derive(Clone, Debug)]
pub struct MatchPatch {
    pub state: MatchState,
    pub ended_at: Option<DateTime<Utc>>,
    pub ended_by: Option<Uuid>,
}

/// Typed view of the generic query/insert/update/delete capability the
/// core needs. Each call is a single round trip; no locks are held across
/// calls.
pub trait VenueStore {
    fn list_venues(&self) -> Result<Vec<Venue>, StoreError>;
    fn create_venue(&self, venue: Venue) -> Result<Venue, StoreError>;
    fn venue_by_id(&self, venue_id: VenueId) -> Result<Option<Venue>, StoreError>;

    fn create_player(&self, player: Player) -> Result<Player, StoreError>;
    /// Membership rows joined with player name/creation time, unsorted.
    fn venue_players(&self, venue_id: VenueId) -> Result<Vec<(VenuePlayer, Player)>, StoreError>;
    /// Idempotent insert keyed on (venue, player); duplicates are no-ops.
    fn add_venue_player(&self, row: VenuePlayer) -> Result<(), StoreError>;
    /// Returns the number of rows updated (0 when no membership exists).
    fn set_presence(
        &self,
        venue_id: VenueId,
        player_id: PlayerId,
        present: bool,
    ) -> Result<usize, StoreError>;
    /// Deletes the membership row only; returns rows deleted.
    fn remove_venue_player(
        &self,
        venue_id: VenueId,
        player_id: PlayerId,
    ) -> Result<usize, StoreError>;

    /// Matches for a venue with `created_at` in `[from, to)`, newest first.
    fn matches_between(
        &self,
        venue_id: VenueId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Match>, StoreError>;
    fn match_by_id(&self, match_id: MatchId) -> Result<Option<Match>, StoreError>;
    fn insert_match(&self, m: Match) -> Result<Match, StoreError>;
    /// Returns rows updated (0 when the match does not exist).
    fn update_match(&self, match_id: MatchId, patch: MatchPatch) -> Result<usize, StoreError>;
}
