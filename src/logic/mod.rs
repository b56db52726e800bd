//! Scheduling business logic: presence, occupancy, pairing, lifecycle,
//! daily queries.

mod daily;
mod lifecycle;
mod occupancy;
mod pairing;
mod presence;

pub use daily::{apply_filter, day_bounds, list_matches_today, resolve_my_player_id, MatchFilter};
pub use lifecycle::{
    abandon_match, create_match, finish_all_open_today, finish_match, CreateMatch, FinishOutcome,
    SweepReport,
};
pub use occupancy::{busy_players, eligible_pool, is_court_busy};
pub use pairing::{suggest_teams, PairingConfig, TeamSuggestion};
pub use presence::{
    add_player_to_venue, list_eligible_players, register_player, remove_player_from_venue,
    set_presence,
};
