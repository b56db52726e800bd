//! Venue, caller role, and the scheduling error taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::player::PlayerId;
use crate::store::StoreError;

/// Unique identifier for a venue.
pub type VenueId = Uuid;

/// Default number of courts when a venue does not configure one.
pub const DEFAULT_COURT_COUNT: u32 = 12;

/// A physical location hosting sessions; scopes players, courts, and
/// matches. Courts are not entities: just numbers in `1..=court_count`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    /// Highest valid court number at this venue.
    pub court_count: u32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Venue {
    pub fn new(name: impl Into<String>, created_by: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            court_count: DEFAULT_COURT_COUNT,
            created_by,
            created_at: now,
        }
    }
}

/// Caller's role at a venue, as handed to us by the authorization layer.
/// The core trusts it; it does not verify membership itself.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Player,
    Organiser,
    Admin,
}

impl Role {
    /// Organiser-level actions: presence toggling, bulk finish.
    pub fn can_manage(self) -> bool {
        self >= Role::Organiser
    }
}

/// Caller-correctable rule violations. Each variant names the rule that
/// was broken so the caller can fix the request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// Court number outside `1..=max` for the venue.
    CourtOutOfRange { court: u32, max: u32 },
    /// Another live match already holds this court.
    CourtBusy(u32),
    /// A required player slot was not supplied (e.g. "b1").
    MissingPlayerSlot(&'static str),
    /// Singles matches must leave a2/b2 empty.
    SinglesWithPartners,
    /// The same player appears in two slots.
    DuplicatePlayer(PlayerId),
    /// Player is not in the venue's list or not marked present.
    PlayerNotPresent(PlayerId),
    /// Player is already in a live match at this venue.
    PlayerBusy(PlayerId),
    /// Scores must be given as a pair: both or neither.
    MismatchedScorePair,
    /// The store rejected the write; another client likely raced us.
    Conflict,
    /// Player names cannot be empty or whitespace.
    EmptyName,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::CourtOutOfRange { court, max } => {
                write!(f, "Court {} is out of range (venue has courts 1-{})", court, max)
            }
            ValidationError::CourtBusy(c) => write!(f, "Court {} already has a live match", c),
            ValidationError::MissingPlayerSlot(slot) => {
                write!(f, "Player slot {} is required for this mode", slot)
            }
            ValidationError::SinglesWithPartners => {
                write!(f, "Singles matches take only a1 and b1")
            }
            ValidationError::DuplicatePlayer(_) => {
                write!(f, "A player cannot fill two slots in the same match")
            }
            ValidationError::PlayerNotPresent(_) => {
                write!(f, "A selected player is not present at the venue")
            }
            ValidationError::PlayerBusy(_) => {
                write!(f, "A selected player is already in a live match")
            }
            ValidationError::MismatchedScorePair => {
                write!(f, "Enter both scores, or neither")
            }
            ValidationError::Conflict => {
                write!(f, "The store rejected the write; reload and retry")
            }
            ValidationError::EmptyName => write!(f, "Name must not be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors that can occur during scheduling operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScheduleError {
    /// Caller-correctable rule violation; never retried automatically.
    Validation(ValidationError),
    /// Operation attempted on a match whose state forbids it
    /// (e.g. finishing an already-finished match).
    InvalidState,
    /// Referenced entity absent (names which one).
    NotFound(&'static str),
    /// Network/timeout talking to the store; caller may retry with backoff.
    Transport(String),
    /// Caller's role does not permit this operation.
    Forbidden,
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::Validation(v) => write!(f, "{}", v),
            ScheduleError::InvalidState => write!(f, "Match is already finished"),
            ScheduleError::NotFound(what) => write!(f, "{} not found", what),
            ScheduleError::Transport(msg) => write!(f, "Store unreachable: {}", msg),
            ScheduleError::Forbidden => write!(f, "This action requires organiser rights"),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<ValidationError> for ScheduleError {
    fn from(v: ValidationError) -> Self {
        ScheduleError::Validation(v)
    }
}

impl From<StoreError> for ScheduleError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Transport(msg) => ScheduleError::Transport(msg),
            // Constraint rejections surface as recoverable conflicts: a
            // second client may have written between our read and write.
            StoreError::Rejected(_) => ScheduleError::Validation(ValidationError::Conflict),
            StoreError::MissingColumn(_) => ScheduleError::Validation(ValidationError::Conflict),
        }
    }
}
