//! Venue match scheduler: library with models, store capability, and
//! scheduling logic (presence, occupancy, fair pairing, match lifecycle).

pub mod logic;
pub mod models;
pub mod session;
pub mod store;

pub use logic::{
    abandon_match, add_player_to_venue, apply_filter, busy_players, create_match, day_bounds,
    eligible_pool, finish_all_open_today, finish_match, is_court_busy, list_eligible_players,
    list_matches_today, register_player, remove_player_from_venue, resolve_my_player_id,
    set_presence, suggest_teams, CreateMatch, FinishOutcome, MatchFilter, PairingConfig,
    SweepReport, TeamSuggestion,
};
pub use models::{
    EndReason, LivePhase, Match, MatchId, MatchMode, MatchState, Player, PlayerId, Role,
    ScheduleError, Score, ValidationError, Venue, VenueId, VenuePlayer, VenuePlayerView,
    DEFAULT_COURT_COUNT,
};
pub use session::VenueSession;
pub use store::{MatchPatch, MemoryStore, StoreError, VenueStore};
