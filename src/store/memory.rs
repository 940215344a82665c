//! In-memory repository over a [`Tournament`] arena.

use super::{MatchFilter, Repository};
use crate::models::{
    Card, CardId, GameMatch, Goal, GoalId, MatchId, MatchPatch, Side, Standing, StoreError, Team, TeamId,
    Tournament,
};
use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory store. Snapshots are cloned out on every read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Tournament>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tournament(tournament: Tournament) -> Self {
        Self {
            state: RwLock::new(tournament),
        }
    }

    /// Copy of the full document state.
    pub fn snapshot(&self) -> Result<Tournament, StoreError> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tournament>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tournament>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }
}

fn match_not_found(id: MatchId) -> StoreError {
    StoreError::NotFound { collection: "matches", id }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn list_teams(&self, group: Option<&str>) -> Result<Vec<Team>, StoreError> {
        Ok(self
            .read()?
            .teams
            .iter()
            .filter(|t| group.map_or(true, |g| t.group_id == g))
            .cloned()
            .collect())
    }

    async fn save_team(&self, team: Team) -> Result<(), StoreError> {
        self.write()?.upsert_team(team);
        Ok(())
    }

    async fn delete_team(&self, id: TeamId) -> Result<(), StoreError> {
        self.write()?.remove_team(id).map(|_| ())
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<GameMatch>, StoreError> {
        Ok(self
            .read()?
            .matches
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError> {
        Ok(self.read()?.get_match(id).cloned())
    }

    async fn replace_all_matches(&self, matches: Vec<GameMatch>) -> Result<(), StoreError> {
        self.write()?.matches = matches;
        Ok(())
    }

    async fn insert_matches(&self, matches: Vec<GameMatch>) -> Result<(), StoreError> {
        self.write()?.matches.extend(matches);
        Ok(())
    }

    async fn delete_matches(&self, filter: &MatchFilter) -> Result<usize, StoreError> {
        let mut state = self.write()?;
        let before = state.matches.len();
        state.matches.retain(|m| !filter.matches(m));
        Ok(before - state.matches.len())
    }

    async fn update_match(&self, id: MatchId, patch: MatchPatch) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let m = state.get_match_mut(id).ok_or_else(|| match_not_found(id))?;
        patch.apply(m);
        Ok(())
    }

    async fn list_standings(&self) -> Result<Vec<Standing>, StoreError> {
        Ok(self.read()?.standings.clone())
    }

    async fn replace_all_standings(&self, standings: Vec<Standing>) -> Result<(), StoreError> {
        self.write()?.standings = standings;
        Ok(())
    }

    async fn add_goal(&self, goal: Goal) -> Result<GoalId, StoreError> {
        let mut state = self.write()?;
        let m = state.get_match_mut(goal.match_id).ok_or_else(|| match_not_found(goal.match_id))?;
        m.goals.push(goal.clone());
        let id = goal.id;
        state.goals.push(goal);
        Ok(id)
    }

    async fn list_goals(&self) -> Result<Vec<Goal>, StoreError> {
        Ok(self.read()?.goals.clone())
    }

    async fn delete_goal(&self, id: GoalId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let idx = state
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or(StoreError::NotFound { collection: "goals", id })?;
        let goal = state.goals.remove(idx);
        if let Some(m) = state.get_match_mut(goal.match_id) {
            m.goals.retain(|g| g.id != id);
        }
        Ok(())
    }

    async fn add_card(&self, card: Card) -> Result<CardId, StoreError> {
        let mut state = self.write()?;
        let m = state.get_match_mut(card.match_id).ok_or_else(|| match_not_found(card.match_id))?;
        match m.side_of(card.team_id) {
            Some(Side::Home) => m.cards.home.push(card.clone()),
            Some(Side::Away) => m.cards.away.push(card.clone()),
            None => return Err(StoreError::NotFound { collection: "teams", id: card.team_id }),
        }
        let id = card.id;
        state.cards.push(card);
        Ok(id)
    }

    async fn list_cards(&self) -> Result<Vec<Card>, StoreError> {
        Ok(self.read()?.cards.clone())
    }

    async fn delete_card(&self, id: CardId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let idx = state
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound { collection: "cards", id })?;
        let card = state.cards.remove(idx);
        if let Some(m) = state.get_match_mut(card.match_id) {
            m.cards.home.retain(|c| c.id != id);
            m.cards.away.retain(|c| c.id != id);
        }
        Ok(())
    }
}
