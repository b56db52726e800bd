//! Data structures for the scheduler: players, venues, matches.

mod game;
mod player;
mod venue;

pub use game::{EndReason, LivePhase, Match, MatchId, MatchMode, MatchState, Score};
pub use player::{Player, PlayerId, VenuePlayer, VenuePlayerView};
pub use venue::{Role, ScheduleError, ValidationError, Venue, VenueId, DEFAULT_COURT_COUNT};
