//! Daily match query: scope matches to "today" at the venue and apply
//! client-side view filters.

use chrono::{DateTime, Days, Local, LocalResult, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Match, PlayerId, ScheduleError, VenueId, VenuePlayerView};
use crate::store::VenueStore;

/// `[start of day, start of next day)` in the given timezone, as UTC
/// instants usable against the store's `created_at` column.
pub fn day_bounds<Tz: TimeZone>(now: DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let date = now.date_naive();
    let start = date.and_time(NaiveTime::MIN);
    let next = date
        .checked_add_days(Days::new(1))
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(start);
    (resolve_local(&tz, start), resolve_local(&tz, next))
}

/// Map a naive local midnight to UTC. Midnight can be skipped or doubled
/// around DST changes; take the earliest reading, else the UTC reading.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: chrono::NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// All matches for the venue created today (venue-local calendar day),
/// newest first.
pub fn list_matches_today(
    store: &impl VenueStore,
    venue_id: VenueId,
    now: DateTime<Utc>,
) -> Result<Vec<Match>, ScheduleError> {
    let (from, to) = day_bounds(now.with_timezone(&Local));
    Ok(store.matches_between(venue_id, from, to)?)
}

/// View filter over the already-fetched "today" set; never refetches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFilter {
    #[default]
    All,
    InProgress,
    Mine,
}

/// Apply a view filter. `Mine` needs the caller's resolved player id; when
/// resolution failed the result is empty rather than silently everything.
pub fn apply_filter(
    matches: &[Match],
    filter: MatchFilter,
    my_player_id: Option<PlayerId>,
) -> Vec<Match> {
    match filter {
        MatchFilter::All => matches.to_vec(),
        MatchFilter::InProgress => matches
            .iter()
            .filter(|m| m.state.is_live())
            .cloned()
            .collect(),
        MatchFilter::Mine => match my_player_id {
            Some(id) => matches
                .iter()
                .filter(|m| m.player_ids().any(|p| p == id))
                .cloned()
                .collect(),
            None => Vec::new(),
        },
    }
}

/// Best-effort mapping from the caller's profile display name to a player
/// at the venue: trimmed exact name match. None means "mine" cannot be
/// resolved and the caller should be told, not shown everything.
pub fn resolve_my_player_id(
    players: &[VenuePlayerView],
    display_name: &str,
) -> Option<PlayerId> {
    let wanted = display_name.trim();
    if wanted.is_empty() {
        return None;
    }
    players
        .iter()
        .find(|p| p.name.trim() == wanted)
        .map(|p| p.player_id)
}
