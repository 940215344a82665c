//! Roster import: teams, groups and players from CSV.

use crate::models::{Player, Team, TournamentError};
use serde::Deserialize;
use std::io::Read;

/// One CSV row: `team,group,player,number,position`.
#[derive(Debug, Deserialize)]
struct RosterRow {
    team: String,
    group: String,
    #[serde(default)]
    player: String,
    #[serde(default)]
    number: Option<u32>,
    #[serde(default)]
    position: String,
}

/// Parse a roster file into teams, in order of first appearance.
///
/// Rows sharing a team name (case-insensitive) form one team. A row with an empty
/// `player` cell only declares the team.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<Team>, TournamentError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut teams: Vec<Team> = Vec::new();

    for row in csv_reader.deserialize() {
        let row: RosterRow = row?;
        if row.team.is_empty() || row.group.is_empty() {
            return Err(TournamentError::validation("roster row without team or group"));
        }
        let team = match teams.iter().position(|t| t.name.eq_ignore_ascii_case(&row.team)) {
            Some(i) => &mut teams[i],
            None => {
                teams.push(Team::new(row.team.clone(), row.group.clone()));
                let last = teams.len() - 1;
                &mut teams[last]
            }
        };
        if team.group_id != row.group {
            return Err(TournamentError::validation(format!(
                "team {:?} listed in groups {} and {}",
                team.name, team.group_id, row.group
            )));
        }
        if !row.player.is_empty() {
            let number = row.number.unwrap_or(team.players.len() as u32 + 1);
            team.players.push(Player::new(row.player, number, row.position));
        }
    }
    Ok(teams)
}
