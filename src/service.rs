//! Tournament service: reads from the repository, runs the pure logic, writes results back.
//!
//! Mutating operations take `write_lock` so that read-compute-write sequences never
//! interleave. Store errors are returned as they are; nothing here retries them.

use crate::config::TournamentConfig;
use crate::logic::{
    best_keepers, best_players, complete_match, compute_standings, generate_schedule, knockout_skeleton,
    parse_roster, plan_propagation, player_discipline, seed_quarter_finals, top_scorers, KeeperRating,
    KnockoutResult, PlayerDiscipline, PlayerRating, Propagation, TopScorer,
};
use crate::models::{
    Card, CardId, CardKind, GameMatch, Goal, GoalId, MatchId, MatchPatch, MatchStatus, Player, PlayerId,
    StaleStateWarning, Standing, StoreError, Team, TeamId, TournamentError,
};
use crate::store::{MatchFilter, Repository, Stage};
use chrono::{Days, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Score entry for a group match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
}

/// New goal as entered by the caller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub minute: u32,
}

/// New card as entered by the caller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub minute: u32,
    pub kind: CardKind,
}

/// New roster entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub number: u32,
    #[serde(default)]
    pub position: String,
}

/// Result of entering a knockout score.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutOutcome {
    #[serde(rename = "match")]
    pub completed: GameMatch,
    /// Next-round match that received the winner, if any.
    pub advanced_to: Option<MatchId>,
    pub warnings: Vec<StaleStateWarning>,
}

pub struct TournamentService<R> {
    repo: R,
    config: TournamentConfig,
    write_lock: Mutex<()>,
}

impl<R: Repository> TournamentService<R> {
    pub fn new(repo: R, config: TournamentConfig) -> Self {
        Self {
            repo,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    // ---- Teams ----

    pub async fn list_teams(&self, group: Option<&str>) -> Result<Vec<Team>, TournamentError> {
        Ok(self.repo.list_teams(group).await?)
    }

    /// Add a team. Names are unique (case-insensitive).
    pub async fn add_team(&self, name: &str, group_id: &str) -> Result<Team, TournamentError> {
        let name = name.trim();
        let group_id = group_id.trim();
        if name.is_empty() || group_id.is_empty() {
            return Err(TournamentError::validation("team name and group are required"));
        }
        let _guard = self.write_lock.lock().await;
        let existing = self.repo.list_teams(None).await?;
        if existing.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
            return Err(TournamentError::DuplicateTeamName(name.to_string()));
        }
        let team = Team::new(name, group_id);
        self.repo.save_team(team.clone()).await?;
        log::info!("Added team {} to group {}", team.name, team.group_id);
        Ok(team)
    }

    /// Remove a team. Refused while any match still involves it; regenerate or delete
    /// the knockout stage first.
    pub async fn remove_team(&self, team_id: TeamId) -> Result<(), TournamentError> {
        let _guard = self.write_lock.lock().await;
        let matches = self.repo.list_matches(&MatchFilter::all()).await?;
        if let Some(m) = matches.iter().find(|m| m.involves(team_id)) {
            return Err(TournamentError::invalid_state(format!(
                "team {team_id} still plays in match {}",
                m.id
            )));
        }
        self.repo.delete_team(team_id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => TournamentError::TeamNotFound(team_id),
            e => e.into(),
        })
    }

    pub async fn add_player(&self, team_id: TeamId, player: NewPlayer) -> Result<Team, TournamentError> {
        let name = player.name.trim();
        if name.is_empty() {
            return Err(TournamentError::validation("player name is required"));
        }
        let _guard = self.write_lock.lock().await;
        let mut team = self
            .repo
            .list_teams(None)
            .await?
            .into_iter()
            .find(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        team.players.push(Player::new(name, player.number, player.position));
        self.repo.save_team(team.clone()).await?;
        Ok(team)
    }

    /// Import teams from a roster CSV. All-or-nothing on name clashes.
    pub async fn import_roster<Rd: Read>(&self, reader: Rd) -> Result<Vec<Team>, TournamentError> {
        let teams = parse_roster(reader)?;
        let _guard = self.write_lock.lock().await;
        let existing = self.repo.list_teams(None).await?;
        if let Some(clash) = teams
            .iter()
            .find(|t| existing.iter().any(|e| e.name.eq_ignore_ascii_case(&t.name)))
        {
            return Err(TournamentError::DuplicateTeamName(clash.name.clone()));
        }
        for team in &teams {
            self.repo.save_team(team.clone()).await?;
        }
        log::info!("Imported {} team(s) from roster", teams.len());
        Ok(teams)
    }

    // ---- Schedule ----

    /// Generate the group-stage schedule and replace every stored match with it.
    ///
    /// Destructive: completed results and knockout matches are discarded and standings
    /// reset to zero. Defaults: start tomorrow, random seed.
    pub async fn generate_schedule(
        &self,
        start_date: Option<NaiveDate>,
        seed: Option<u64>,
    ) -> Result<Vec<GameMatch>, TournamentError> {
        let _guard = self.write_lock.lock().await;
        let teams = self.repo.list_teams(None).await?;
        let start = start_date.unwrap_or_else(|| Local::now().date_naive() + Days::new(1));
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let matches = generate_schedule(&teams, start, &self.config, &mut rng)?;

        self.repo.replace_all_matches(matches.clone()).await?;
        self.repo
            .replace_all_standings(compute_standings(&teams, &matches))
            .await?;
        Ok(matches)
    }

    pub async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<GameMatch>, TournamentError> {
        let mut matches = self.repo.list_matches(filter).await?;
        matches.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        Ok(matches)
    }

    /// Enter a group match score. Standings are recalculated when the match is completed.
    pub async fn record_result(&self, match_id: MatchId, result: MatchResult) -> Result<GameMatch, TournamentError> {
        let _guard = self.write_lock.lock().await;
        let m = self
            .repo
            .get_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if m.is_knockout() {
            return Err(TournamentError::invalid_state("knockout results go through the bracket"));
        }
        let patch = MatchPatch {
            home_score: Some(result.home_score),
            away_score: Some(result.away_score),
            status: Some(result.status),
            ..MatchPatch::default()
        };
        self.repo.update_match(match_id, patch).await?;
        if result.status == MatchStatus::Completed || m.status == MatchStatus::Completed {
            self.recalculate_standings_locked().await?;
        }
        self.repo
            .get_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    // ---- Standings ----

    pub async fn standings(&self) -> Result<Vec<Standing>, TournamentError> {
        Ok(self.repo.list_standings().await?)
    }

    /// Recompute standings from the latest completed matches and replace the stored ones.
    pub async fn recalculate_standings(&self) -> Result<Vec<Standing>, TournamentError> {
        let _guard = self.write_lock.lock().await;
        self.recalculate_standings_locked().await
    }

    async fn recalculate_standings_locked(&self) -> Result<Vec<Standing>, TournamentError> {
        let teams = self.repo.list_teams(None).await?;
        let filter = MatchFilter {
            status: Some(MatchStatus::Completed),
            stage: Some(Stage::Group),
            ..MatchFilter::default()
        };
        let matches = self.repo.list_matches(&filter).await?;
        let standings = compute_standings(&teams, &matches);
        self.repo.replace_all_standings(standings.clone()).await?;
        log::debug!("Recalculated standings from {} completed match(es)", matches.len());
        Ok(standings)
    }

    // ---- Knockout ----

    pub async fn knockout_matches(&self) -> Result<Vec<GameMatch>, TournamentError> {
        let mut bracket = self.repo.list_matches(&MatchFilter::knockout()).await?;
        bracket.sort_by_key(|m| (m.round(), m.match_number()));
        Ok(bracket)
    }

    /// Create the empty bracket. Refused while one exists.
    pub async fn setup_knockout_stage(&self) -> Result<Vec<GameMatch>, TournamentError> {
        let _guard = self.write_lock.lock().await;
        if !self.repo.list_matches(&MatchFilter::knockout()).await?.is_empty() {
            return Err(TournamentError::invalid_state("knockout stage already exists"));
        }
        let bracket = knockout_skeleton(&self.config.venue);
        self.repo.insert_matches(bracket.clone()).await?;
        log::info!("Created knockout bracket with {} matches", bracket.len());
        Ok(bracket)
    }

    /// Fill the quarterfinals from freshly computed group standings.
    pub async fn seed_knockout_stage(&self) -> Result<Vec<GameMatch>, TournamentError> {
        let _guard = self.write_lock.lock().await;
        let standings = self.recalculate_standings_locked().await?;
        let bracket = self.repo.list_matches(&MatchFilter::knockout()).await?;
        let seedings = seed_quarter_finals(&standings, &bracket)?;
        for seeding in seedings {
            log::info!(
                "QF{}: {} vs {}",
                seeding.match_number,
                seeding.home.name,
                seeding.away.name
            );
            self.repo.update_match(seeding.match_id, seeding.into_patch()).await?;
        }
        self.knockout_matches().await
    }

    /// Complete a knockout match and move its winner into the next round.
    pub async fn record_knockout_result(
        &self,
        match_id: MatchId,
        result: KnockoutResult,
    ) -> Result<KnockoutOutcome, TournamentError> {
        let _guard = self.write_lock.lock().await;
        let m = self
            .repo
            .get_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let (patch, winner) = complete_match(&m, &result)?;
        self.repo.update_match(match_id, patch).await?;

        // Re-read so slot decisions never use stale data.
        let bracket = self.repo.list_matches(&MatchFilter::knockout()).await?;
        let completed = bracket
            .iter()
            .find(|b| b.id == match_id)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(match_id))?;

        let mut outcome = KnockoutOutcome {
            completed,
            advanced_to: None,
            warnings: Vec::new(),
        };
        match plan_propagation(&outcome.completed, &bracket) {
            Propagation::Nothing => {}
            Propagation::AlreadyPlaced { target } => outcome.advanced_to = Some(target),
            Propagation::Assign { target, side, patch } => {
                self.repo.update_match(target, patch).await?;
                log::info!("{} advances to match {} as {:?} team", winner.name, target, side);
                outcome.advanced_to = Some(target);
            }
            Propagation::Stale(warning) => {
                log::warn!("Knockout propagation skipped: {}", warning.message);
                outcome.warnings.push(warning);
            }
        }
        Ok(outcome)
    }

    /// Remove every bracket match. Group matches and standings are untouched.
    pub async fn delete_knockout_stage(&self) -> Result<usize, TournamentError> {
        let _guard = self.write_lock.lock().await;
        let deleted = self.repo.delete_matches(&MatchFilter::knockout()).await?;
        log::info!("Deleted {deleted} knockout match(es)");
        Ok(deleted)
    }

    // ---- Goals and cards ----

    pub async fn add_goal(&self, goal: NewGoal) -> Result<GoalId, TournamentError> {
        let _guard = self.write_lock.lock().await;
        let (m, team) = self.match_and_team_of(goal.match_id, goal.player_id).await?;
        let player_name = player_name(&team, goal.player_id);
        let id = self
            .repo
            .add_goal(Goal {
                id: Uuid::new_v4(),
                match_id: m.id,
                player_id: goal.player_id,
                team_id: team.id,
                minute: goal.minute,
                player_name,
                team_name: team.name.clone(),
            })
            .await?;
        Ok(id)
    }

    pub async fn list_goals(&self) -> Result<Vec<Goal>, TournamentError> {
        Ok(self.repo.list_goals().await?)
    }

    /// Remove a goal entered by mistake, from the collection and its match.
    pub async fn delete_goal(&self, id: GoalId) -> Result<(), TournamentError> {
        let _guard = self.write_lock.lock().await;
        self.repo.delete_goal(id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => TournamentError::GoalNotFound(id),
            e => e.into(),
        })?;
        log::info!("Deleted goal {id}");
        Ok(())
    }

    pub async fn add_card(&self, card: NewCard) -> Result<CardId, TournamentError> {
        let _guard = self.write_lock.lock().await;
        let (m, team) = self.match_and_team_of(card.match_id, card.player_id).await?;
        let player_name = player_name(&team, card.player_id);
        let id = self
            .repo
            .add_card(Card {
                id: Uuid::new_v4(),
                match_id: m.id,
                player_id: card.player_id,
                team_id: team.id,
                minute: card.minute,
                kind: card.kind,
                player_name,
                team_name: team.name.clone(),
            })
            .await?;
        Ok(id)
    }

    pub async fn list_cards(&self) -> Result<Vec<Card>, TournamentError> {
        Ok(self.repo.list_cards().await?)
    }

    /// Remove a card entered by mistake. Bans follow from the remaining cards.
    pub async fn delete_card(&self, id: CardId) -> Result<(), TournamentError> {
        let _guard = self.write_lock.lock().await;
        self.repo.delete_card(id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => TournamentError::CardNotFound(id),
            e => e.into(),
        })?;
        log::info!("Deleted card {id}");
        Ok(())
    }

    /// The match and the player's team, which must be playing in it.
    async fn match_and_team_of(&self, match_id: MatchId, player_id: PlayerId) -> Result<(GameMatch, Team), TournamentError> {
        let m = self
            .repo
            .get_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let team = self
            .repo
            .list_teams(None)
            .await?
            .into_iter()
            .find(|t| t.has_player(player_id))
            .ok_or_else(|| TournamentError::validation(format!("player {player_id} is not on any roster")))?;
        if !m.involves(team.id) {
            return Err(TournamentError::validation(format!(
                "{} is not playing in match {}",
                team.name, match_id
            )));
        }
        Ok((m, team))
    }

    // ---- Awards and discipline ----

    pub async fn top_scorers(&self, limit: usize) -> Result<Vec<TopScorer>, TournamentError> {
        Ok(top_scorers(&self.repo.list_goals().await?, limit))
    }

    pub async fn best_players(&self, limit: usize) -> Result<Vec<PlayerRating>, TournamentError> {
        let teams = self.repo.list_teams(None).await?;
        let matches = self.repo.list_matches(&MatchFilter::all()).await?;
        let goals = self.repo.list_goals().await?;
        Ok(best_players(&teams, &matches, &goals, limit))
    }

    pub async fn best_keepers(&self, limit: usize) -> Result<Vec<KeeperRating>, TournamentError> {
        let teams = self.repo.list_teams(None).await?;
        let matches = self.repo.list_matches(&MatchFilter::all()).await?;
        Ok(best_keepers(&teams, &matches, limit))
    }

    pub async fn discipline(&self) -> Result<Vec<PlayerDiscipline>, TournamentError> {
        let cards = self.repo.list_cards().await?;
        Ok(player_discipline(&cards, self.config.yellow_card_ban_threshold))
    }
}

fn player_name(team: &Team, player_id: PlayerId) -> String {
    team.players
        .iter()
        .find(|p| p.id == player_id)
        .map(|p| p.name.clone())
        .unwrap_or_default()
}
