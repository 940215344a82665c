//! Persistence gateway: the document collections the tournament logic reads and writes.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    Card, CardId, GameMatch, Goal, GoalId, KnockoutRound, MatchId, MatchPatch, MatchStatus, Standing,
    StoreError, Team, TeamId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which part of the tournament a match belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Group,
    Knockout,
}

/// Match query. Empty filter matches everything.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    pub round: Option<KnockoutRound>,
    pub stage: Option<Stage>,
}

impl MatchFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Every bracket match.
    pub fn knockout() -> Self {
        Self {
            stage: Some(Stage::Knockout),
            ..Self::default()
        }
    }

    pub fn matches(&self, m: &GameMatch) -> bool {
        let stage_ok = match self.stage {
            Some(Stage::Group) => !m.is_knockout(),
            Some(Stage::Knockout) => m.is_knockout(),
            None => true,
        };
        stage_ok
            && self.status.map_or(true, |s| m.status == s)
            && self.round.map_or(true, |r| m.round() == Some(r))
    }
}

/// Document store operations. Implementations report failures as [`StoreError`];
/// callers decide whether to retry.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn list_teams(&self, group: Option<&str>) -> Result<Vec<Team>, StoreError>;
    /// Insert or replace by id.
    async fn save_team(&self, team: Team) -> Result<(), StoreError>;
    async fn delete_team(&self, id: TeamId) -> Result<(), StoreError>;

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<GameMatch>, StoreError>;
    async fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError>;
    /// Delete every match, then insert `matches`.
    async fn replace_all_matches(&self, matches: Vec<GameMatch>) -> Result<(), StoreError>;
    async fn insert_matches(&self, matches: Vec<GameMatch>) -> Result<(), StoreError>;
    /// Returns the number of deleted matches.
    async fn delete_matches(&self, filter: &MatchFilter) -> Result<usize, StoreError>;
    async fn update_match(&self, id: MatchId, patch: MatchPatch) -> Result<(), StoreError>;

    async fn list_standings(&self) -> Result<Vec<Standing>, StoreError>;
    async fn replace_all_standings(&self, standings: Vec<Standing>) -> Result<(), StoreError>;

    /// Store the goal and append it to its match. Returns the stored id.
    async fn add_goal(&self, goal: Goal) -> Result<GoalId, StoreError>;
    async fn list_goals(&self) -> Result<Vec<Goal>, StoreError>;
    /// Remove the goal from the collection and from its match.
    async fn delete_goal(&self, id: GoalId) -> Result<(), StoreError>;

    /// Store the card and append it to the home or away list of its match.
    async fn add_card(&self, card: Card) -> Result<CardId, StoreError>;
    async fn list_cards(&self) -> Result<Vec<Card>, StoreError>;
    /// Remove the card from the collection and from its match's card lists.
    async fn delete_card(&self, id: CardId) -> Result<(), StoreError>;
}
