//! Per-venue session: a read-through cache of the venue's players and
//! today's matches, owned by one interactive client.
//!
//! Every mutating call invalidates and refreshes the affected cache before
//! returning, so callers always see post-write state. A session is bound
//! to one venue; switching venues means a new session.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::logic::{
    abandon_match, add_player_to_venue, apply_filter, busy_players, create_match, eligible_pool,
    finish_all_open_today, finish_match, list_eligible_players, list_matches_today,
    register_player, remove_player_from_venue, resolve_my_player_id, set_presence, suggest_teams,
    CreateMatch, FinishOutcome, MatchFilter, PairingConfig, SweepReport, TeamSuggestion,
};
use crate::models::{
    Match, MatchId, MatchMode, Player, PlayerId, Role, ScheduleError, VenueId, VenuePlayerView,
};
use crate::store::VenueStore;

pub struct VenueSession<S> {
    store: Arc<S>,
    pub venue_id: VenueId,
    pub user_id: Uuid,
    /// Role handed to us by the authorization layer; trusted as-is.
    pub role: Role,
    pub filter: MatchFilter,
    pairing: PairingConfig,
    players: Vec<VenuePlayerView>,
    matches: Vec<Match>,
    my_player_id: Option<PlayerId>,
    display_name: String,
}

impl<S: VenueStore> VenueSession<S> {
    /// Open a session for a venue, loading both caches.
    pub fn open(
        store: Arc<S>,
        venue_id: VenueId,
        user_id: Uuid,
        role: Role,
        display_name: impl Into<String>,
    ) -> Result<Self, ScheduleError> {
        let mut session = Self {
            store,
            venue_id,
            user_id,
            role,
            filter: MatchFilter::All,
            pairing: PairingConfig::default(),
            players: Vec::new(),
            matches: Vec::new(),
            my_player_id: None,
            display_name: display_name.into(),
        };
        session.refresh_players()?;
        session.refresh_matches()?;
        Ok(session)
    }

    pub fn refresh_players(&mut self) -> Result<(), ScheduleError> {
        self.players = list_eligible_players(self.store.as_ref(), self.venue_id)?;
        self.my_player_id = resolve_my_player_id(&self.players, &self.display_name);
        Ok(())
    }

    pub fn refresh_matches(&mut self) -> Result<(), ScheduleError> {
        self.matches = list_matches_today(self.store.as_ref(), self.venue_id, Utc::now())?;
        Ok(())
    }

    pub fn players(&self) -> &[VenuePlayerView] {
        &self.players
    }

    /// The caller's player id, when their display name matched a venue
    /// player. None degrades the "mine" filter to an empty result.
    pub fn my_player_id(&self) -> Option<PlayerId> {
        self.my_player_id
    }

    /// Today's matches through the session's view filter.
    pub fn visible_matches(&self) -> Vec<Match> {
        apply_filter(&self.matches, self.filter, self.my_player_id)
    }

    /// Present players not held by a live match (from cached state).
    pub fn eligible_ids(&self) -> Vec<PlayerId> {
        eligible_pool(&self.players, &busy_players(&self.matches))
    }

    /// Propose teams from cached state. Pure; reserves nothing, so the
    /// create call re-validates against fresh state.
    pub fn suggest(&self, rng: &mut impl rand::Rng, mode: MatchMode) -> Option<TeamSuggestion> {
        suggest_teams(rng, &self.eligible_ids(), &self.matches, mode, &self.pairing)
    }

    pub fn create_match(&mut self, req: CreateMatch) -> Result<Match, ScheduleError> {
        let created = create_match(
            self.store.as_ref(),
            self.venue_id,
            req,
            self.user_id,
            Utc::now(),
        )?;
        self.refresh_matches()?;
        Ok(created)
    }

    pub fn finish(
        &mut self,
        match_id: MatchId,
        mut outcome: FinishOutcome,
    ) -> Result<Match, ScheduleError> {
        outcome.ended_by = Some(self.user_id);
        let finished = finish_match(self.store.as_ref(), match_id, outcome, Utc::now())?;
        self.refresh_matches()?;
        Ok(finished)
    }

    pub fn abandon(&mut self, match_id: MatchId) -> Result<Match, ScheduleError> {
        let ended = abandon_match(
            self.store.as_ref(),
            match_id,
            Some(self.user_id),
            Utc::now(),
        )?;
        self.refresh_matches()?;
        Ok(ended)
    }

    /// End-of-session sweep; organiser-level.
    pub fn finish_all(&mut self) -> Result<SweepReport, ScheduleError> {
        if !self.role.can_manage() {
            return Err(ScheduleError::Forbidden);
        }
        let report = finish_all_open_today(
            self.store.as_ref(),
            self.venue_id,
            Some(self.user_id),
            Utc::now(),
        )?;
        self.refresh_matches()?;
        Ok(report)
    }

    /// Presence toggle; organiser-level.
    pub fn set_presence(
        &mut self,
        player_id: PlayerId,
        present: bool,
    ) -> Result<(), ScheduleError> {
        if !self.role.can_manage() {
            return Err(ScheduleError::Forbidden);
        }
        set_presence(self.store.as_ref(), self.venue_id, player_id, present)?;
        self.refresh_players()
    }

    /// Create a global player and register them at this venue.
    pub fn add_player(&mut self, name: &str) -> Result<Player, ScheduleError> {
        let player = register_player(self.store.as_ref(), self.venue_id, name, Utc::now())?;
        self.refresh_players()?;
        Ok(player)
    }

    /// Register an existing player at this venue (idempotent).
    pub fn add_existing_player(&mut self, player_id: PlayerId) -> Result<(), ScheduleError> {
        add_player_to_venue(self.store.as_ref(), self.venue_id, player_id, Utc::now())?;
        self.refresh_players()
    }

    /// Drop the player's membership here; the global player survives.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), ScheduleError> {
        remove_player_from_venue(self.store.as_ref(), self.venue_id, player_id)?;
        self.refresh_players()?;
        self.refresh_matches()
    }
}
