//! Tournament document arena and error types.

use crate::models::game::{Card, CardId, GameMatch, Goal, GoalId, MatchId};
use crate::models::standing::Standing;
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};

/// Failure reported by a persistence backend.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("{collection} document {id} not found")]
    NotFound { collection: &'static str, id: uuid::Uuid },
}

/// Errors that can occur during tournament operations.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    /// Every scheduling attempt left pairings unscheduled or failed the fairness check.
    #[error("could not build a valid schedule after {attempts} attempts")]
    InfeasibleSchedule { attempts: u32 },
    /// Malformed team/match/config input.
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("groups must have equal size for scheduling (sizes: {sizes:?})")]
    UnequalGroups { sizes: Vec<(String, usize)> },
    #[error("a team named {0:?} already exists")]
    DuplicateTeamName(String),
    #[error("group {0} has no winner and runner-up in the standings")]
    MissingGroup(String),
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    #[error("team {0} not found")]
    TeamNotFound(TeamId),
    #[error("goal {0} not found")]
    GoalNotFound(GoalId),
    #[error("card {0} not found")]
    CardNotFound(CardId),
    /// The tournament is not in a state that allows this action.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Knockout result is level and no penalty winner was given.
    #[error("knockout match {0} ended level; a penalty winner is required")]
    KnockoutDraw(MatchId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl TournamentError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        TournamentError::InvalidState(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        TournamentError::Validation(msg.into())
    }
}

/// Non-fatal: propagation found the target match already decided.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StaleStateWarning {
    /// Completed match whose winner could not be written.
    pub source_match_id: MatchId,
    pub target_match_id: MatchId,
    pub message: String,
}

/// Full document state: every collection the store keeps.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tournament {
    pub teams: Vec<Team>,
    pub matches: Vec<GameMatch>,
    pub goals: Vec<Goal>,
    pub cards: Vec<Card>,
    pub standings: Vec<Standing>,
}

impl Tournament {
    /// Empty tournament.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tournament with initial teams and nothing else.
    pub fn with_teams(teams: Vec<Team>) -> Self {
        Self {
            teams,
            ..Self::new()
        }
    }

    pub fn get_team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Mutable reference to a match by id.
    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Insert or replace a team by id.
    pub fn upsert_team(&mut self, team: Team) {
        match self.teams.iter_mut().find(|t| t.id == team.id) {
            Some(existing) => *existing = team,
            None => self.teams.push(team),
        }
    }

    /// Remove a team by id.
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<Team, StoreError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(StoreError::NotFound { collection: "teams", id: team_id })?;
        Ok(self.teams.remove(idx))
    }
}
