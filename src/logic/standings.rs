//! Group tables: points, goal difference and ranking from completed group matches.

use crate::models::{GameMatch, MatchStatus, Standing, Team, TeamId};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Compute a fresh standing row for every team from completed group-stage matches.
///
/// Knockout matches never count. A completed match with a missing score, a missing
/// team, or a team not in `teams` is skipped. The result is sorted by [`rank_order`]
/// and is a pure function of its inputs.
pub fn compute_standings(teams: &[Team], matches: &[GameMatch]) -> Vec<Standing> {
    let mut standings: Vec<Standing> = teams.iter().map(Standing::for_team).collect();
    let index: HashMap<TeamId, usize> = teams.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

    for m in matches
        .iter()
        .filter(|m| m.status == MatchStatus::Completed && !m.is_knockout())
    {
        let (Some(home), Some(away)) = (m.home_team.as_ref(), m.away_team.as_ref()) else {
            log::warn!("Skipping completed match {} without both teams", m.id);
            continue;
        };
        let Some((home_score, away_score)) = m.score() else {
            log::warn!("Skipping completed match {} without a score", m.id);
            continue;
        };
        let (Some(&h), Some(&a)) = (index.get(&home.id), index.get(&away.id)) else {
            log::warn!("Skipping completed match {} with unknown team", m.id);
            continue;
        };
        standings[h].record(home_score, away_score);
        standings[a].record(away_score, home_score);
    }

    // Stable: ties beyond goals scored keep team order.
    standings.sort_by(rank_order);
    standings
}

/// Points, then goal difference, then goals scored; all descending.
pub fn rank_order(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

/// One group's rows in rank order.
pub fn group_table(standings: &[Standing], group_id: &str) -> Vec<Standing> {
    let mut table: Vec<Standing> = standings
        .iter()
        .filter(|s| s.group_id == group_id)
        .cloned()
        .collect();
    table.sort_by(rank_order);
    table
}
