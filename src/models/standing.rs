//! Standing: one team's row in its group table.

use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

/// Aggregated group-stage record of a team. Derived from completed matches.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// Same as `team_id`.
    pub id: TeamId,
    pub team_id: TeamId,
    pub team_name: String,
    pub group_id: String,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl Standing {
    /// Zeroed row for a team.
    pub fn for_team(team: &Team) -> Self {
        Self {
            id: team.id,
            team_id: team.id,
            team_name: team.name.clone(),
            group_id: team.group_id.clone(),
            ..Self::default()
        }
    }

    /// Record one completed match from this team's point of view.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        self.matches_played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        if scored > conceded {
            self.wins += 1;
            self.points += POINTS_FOR_WIN;
        } else if scored < conceded {
            self.losses += 1;
        } else {
            self.draws += 1;
            self.points += POINTS_FOR_DRAW;
        }
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
    }
}
