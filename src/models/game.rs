//! Match, MatchState, and MatchMode for doubles / singles games.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::player::PlayerId;
use crate::models::venue::VenueId;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Singles (a1 vs b1) or doubles (a1+a2 vs b1+b2).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Singles,
    #[default]
    Doubles,
}

impl MatchMode {
    /// Number of player slots this mode fills (2 or 4).
    pub fn player_count(self) -> usize {
        match self {
            MatchMode::Singles => 2,
            MatchMode::Doubles => 4,
        }
    }
}

/// Phase of a live match. `Locked` means no further team changes are
/// expected; for occupancy both phases hold the court and players.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivePhase {
    #[default]
    Open,
    Locked,
}

/// How a finished match ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Played to a normal finish (with or without a recorded score).
    Completed,
    /// Stopped without a normal finish; never carries a score.
    Abandoned,
}

/// Final score. A single pair so "score A without score B" cannot exist.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub a: u32,
    pub b: u32,
}

/// Match state: live (court and players occupied) or done (released).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum MatchState {
    Live {
        phase: LivePhase,
    },
    Done {
        reason: EndReason,
        score: Option<Score>,
    },
}

impl MatchState {
    /// True while the match holds its court and players.
    pub fn is_live(&self) -> bool {
        matches!(self, MatchState::Live { .. })
    }
}

impl Default for MatchState {
    fn default() -> Self {
        MatchState::Live {
            phase: LivePhase::Open,
        }
    }
}

/// A match on one court: team A (a1, a2) versus team B (b1, b2).
/// `a2`/`b2` are None for singles. Never hard-deleted; history within a
/// day is append-only.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub venue_id: VenueId,
    /// Court number, 1-based, within the venue's configured range.
    pub court: u32,
    #[serde(flatten)]
    pub state: MatchState,
    pub a1: PlayerId,
    pub a2: Option<PlayerId>,
    pub b1: PlayerId,
    pub b2: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub ended_at: Option<DateTime<Utc>>,
    pub ended_by: Option<Uuid>,
}

impl Match {
    /// All filled player slots, in a1, a2, b1, b2 order.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        [Some(self.a1), self.a2, Some(self.b1), self.b2]
            .into_iter()
            .flatten()
    }

    /// Team A slots that are filled.
    pub fn team_a(&self) -> Vec<PlayerId> {
        [Some(self.a1), self.a2].into_iter().flatten().collect()
    }

    /// Team B slots that are filled.
    pub fn team_b(&self) -> Vec<PlayerId> {
        [Some(self.b1), self.b2].into_iter().flatten().collect()
    }
}
