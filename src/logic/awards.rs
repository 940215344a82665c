//! Awards: top scorers, best-player and best-goalkeeper ratings.

use crate::models::{Card, CardKind, GameMatch, Goal, MatchStatus, PlayerId, Side, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const POINTS_PER_GOAL: i32 = 3;
pub const POINTS_PER_APPEARANCE: i32 = 1;
pub const POINTS_PER_CLEAN_SHEET: i32 = 4;
pub const WIN_BONUS: i32 = 2;
pub const DRAW_BONUS: i32 = 1;
pub const YELLOW_CARD_PENALTY: i32 = -1;
pub const RED_CARD_PENALTY: i32 = -3;

pub const TOP_SCORERS_LIMIT: usize = 10;
pub const BEST_PLAYERS_LIMIT: usize = 10;
pub const BEST_KEEPERS_LIMIT: usize = 5;

/// Position labels that mark a goalkeeper, compared case-insensitively.
const GOALKEEPER_POSITIONS: [&str; 5] = ["goalkeeper", "kiper", "penjaga gawang", "gk", "kipper"];

pub fn is_goalkeeper(position: &str) -> bool {
    let position = position.trim().to_lowercase();
    GOALKEEPER_POSITIONS.contains(&position.as_str())
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TopScorer {
    pub player_id: PlayerId,
    pub name: String,
    pub team_name: String,
    pub goals: u32,
}

/// Goals per player, most first, at most `limit` entries. Ties keep the order of
/// each player's first goal.
pub fn top_scorers(goals: &[Goal], limit: usize) -> Vec<TopScorer> {
    let mut scorers = goal_tally(goals);
    scorers.truncate(limit);
    scorers
}

fn goal_tally(goals: &[Goal]) -> Vec<TopScorer> {
    let mut scorers: Vec<TopScorer> = Vec::new();
    let mut index: HashMap<PlayerId, usize> = HashMap::new();
    for goal in goals {
        let i = *index.entry(goal.player_id).or_insert_with(|| {
            scorers.push(TopScorer {
                player_id: goal.player_id,
                name: goal.player_name.clone(),
                team_name: goal.team_name.clone(),
                goals: 0,
            });
            scorers.len() - 1
        });
        scorers[i].goals += 1;
    }
    scorers.sort_by(|a, b| b.goals.cmp(&a.goals));
    scorers
}

/// Rating breakdown for one player.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub player_id: PlayerId,
    pub name: String,
    pub team_name: String,
    pub goals: u32,
    pub matches_played: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub goal_points: i32,
    pub match_points: i32,
    pub card_points: i32,
    pub total_points: i32,
}

/// Rating breakdown for one goalkeeper.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct KeeperRating {
    pub player_id: PlayerId,
    pub name: String,
    pub team_name: String,
    pub matches_played: u32,
    pub clean_sheets: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub clean_sheet_points: i32,
    pub match_points: i32,
    pub card_points: i32,
    pub total_points: i32,
}

/// One completed match seen from one team's side.
struct Appearance<'a> {
    scored: u32,
    conceded: u32,
    cards: &'a [Card],
}

impl Appearance<'_> {
    /// 1 for playing, plus 2 for a win or 1 for a draw.
    fn match_points(&self) -> i32 {
        POINTS_PER_APPEARANCE
            + if self.scored > self.conceded {
                WIN_BONUS
            } else if self.scored == self.conceded {
                DRAW_BONUS
            } else {
                0
            }
    }

    /// Yellow count, red count and penalty points for one player.
    fn cards_of(&self, player_id: PlayerId) -> (u32, u32, i32) {
        self.cards
            .iter()
            .filter(|c| c.player_id == player_id)
            .fold((0, 0, 0), |(y, r, p), c| match c.kind {
                CardKind::Yellow => (y + 1, r, p + YELLOW_CARD_PENALTY),
                CardKind::Red => (y, r + 1, p + RED_CARD_PENALTY),
            })
    }
}

/// Completed matches of `team` with a score, from its side.
fn appearances<'a>(team: &'a Team, matches: &'a [GameMatch]) -> impl Iterator<Item = Appearance<'a>> + 'a {
    matches
        .iter()
        .filter(|m| m.status == MatchStatus::Completed)
        .filter_map(move |m| {
            let side = m.side_of(team.id)?;
            let (home, away) = m.score()?;
            Some(match side {
                Side::Home => Appearance { scored: home, conceded: away, cards: &m.cards.home },
                Side::Away => Appearance { scored: away, conceded: home, cards: &m.cards.away },
            })
        })
}

/// Rate every player who has scored, best first, at most `limit` entries.
///
/// Goals give 3 points each. Each completed match of the player's team gives 1 point,
/// plus 2 for a win or 1 for a draw. Cards received in those matches cost 1 (yellow)
/// or 3 (red).
pub fn best_players(teams: &[Team], matches: &[GameMatch], goals: &[Goal], limit: usize) -> Vec<PlayerRating> {
    let mut ratings: Vec<PlayerRating> = goal_tally(goals)
        .into_iter()
        .map(|s| PlayerRating {
            player_id: s.player_id,
            name: s.name,
            team_name: s.team_name,
            goals: s.goals,
            goal_points: s.goals as i32 * POINTS_PER_GOAL,
            ..PlayerRating::default()
        })
        .collect();

    for rating in &mut ratings {
        let Some(team) = teams.iter().find(|t| t.has_player(rating.player_id)) else {
            continue;
        };
        for appearance in appearances(team, matches) {
            let (yellow, red, penalty) = appearance.cards_of(rating.player_id);
            rating.matches_played += 1;
            rating.match_points += appearance.match_points();
            rating.yellow_cards += yellow;
            rating.red_cards += red;
            rating.card_points += penalty;
        }
        rating.total_points = rating.goal_points + rating.match_points + rating.card_points;
    }

    ratings.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    ratings.truncate(limit);
    ratings
}

/// Rate every goalkeeper (by roster position) whose team has completed a match.
///
/// Each completed match gives 1 point plus 2 for a win or 1 for a draw, and 4 more
/// when the opponent did not score. Cards cost 1 (yellow) or 3 (red).
pub fn best_keepers(teams: &[Team], matches: &[GameMatch], limit: usize) -> Vec<KeeperRating> {
    let mut ratings = Vec::new();
    for team in teams {
        for keeper in team.players.iter().filter(|p| is_goalkeeper(&p.position)) {
            let mut rating = KeeperRating {
                player_id: keeper.id,
                name: keeper.name.clone(),
                team_name: team.name.clone(),
                ..KeeperRating::default()
            };
            for appearance in appearances(team, matches) {
                let (yellow, red, penalty) = appearance.cards_of(keeper.id);
                rating.matches_played += 1;
                rating.match_points += appearance.match_points();
                if appearance.conceded == 0 {
                    rating.clean_sheets += 1;
                    rating.clean_sheet_points += POINTS_PER_CLEAN_SHEET;
                }
                rating.yellow_cards += yellow;
                rating.red_cards += red;
                rating.card_points += penalty;
            }
            if rating.matches_played > 0 {
                rating.total_points = rating.clean_sheet_points + rating.match_points + rating.card_points;
                ratings.push(rating);
            }
        }
    }
    ratings.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    ratings.truncate(limit);
    ratings
}
