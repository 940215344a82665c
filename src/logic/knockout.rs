//! Knockout stage: bracket skeleton, quarterfinal seeding, result entry and winner propagation.
//!
//! Every function here is pure over match values; the service reads and writes the store.

use crate::logic::standings::group_table;
use crate::models::{
    GameMatch, KnockoutRound, MatchCards, MatchId, MatchPatch, MatchStatus, Side, StaleStateWarning,
    Standing, TeamId, TeamRef, TournamentError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const QUARTER_FINALS: u32 = 4;
pub const SEMI_FINALS: u32 = 2;

/// Quarterfinal draw: (group providing the winner, group providing the runner-up).
/// QF1 = winner A vs runner-up B, QF2 = winner B vs runner-up A,
/// QF3 = winner C vs runner-up D, QF4 = winner D vs runner-up C.
pub const QUARTER_FINAL_DRAW: [(&str, &str); 4] = [("A", "B"), ("B", "A"), ("C", "D"), ("D", "C")];

/// Where a knockout match is in its lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnockoutState {
    /// At least one team slot still empty.
    Unseeded,
    Scheduled,
    Completed,
}

pub fn knockout_state(m: &GameMatch) -> KnockoutState {
    if m.status == MatchStatus::Completed {
        KnockoutState::Completed
    } else if m.home_team.is_none() || m.away_team.is_none() {
        KnockoutState::Unseeded
    } else {
        KnockoutState::Scheduled
    }
}

/// Empty bracket: 4 quarterfinals, 2 semifinals, 1 final.
pub fn knockout_skeleton(venue: &str) -> Vec<GameMatch> {
    let quarters = (1..=QUARTER_FINALS).map(|n| GameMatch::knockout(KnockoutRound::Quarter, n, Some((n + 1) / 2), venue));
    let semis = (1..=SEMI_FINALS).map(|n| GameMatch::knockout(KnockoutRound::Semi, n, Some(1), venue));
    let last = std::iter::once(GameMatch::knockout(KnockoutRound::Final, 1, None, venue));
    quarters.chain(semis).chain(last).collect()
}

/// Bracket matches of one round, ordered by match number.
pub fn round_matches(bracket: &[GameMatch], round: KnockoutRound) -> Vec<&GameMatch> {
    let mut matches: Vec<&GameMatch> = bracket.iter().filter(|m| m.round() == Some(round)).collect();
    matches.sort_by_key(|m| m.match_number());
    matches
}

/// Team assignment for one quarterfinal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Seeding {
    pub match_id: MatchId,
    pub match_number: u32,
    pub home: TeamRef,
    pub away: TeamRef,
}

impl Seeding {
    /// Patch that seeds the match and resets everything a previous seeding may have left.
    pub fn into_patch(self) -> MatchPatch {
        MatchPatch {
            home_team: Some(self.home),
            away_team: Some(self.away),
            home_score: Some(0),
            away_score: Some(0),
            status: Some(MatchStatus::Scheduled),
            winner: Some(None),
            goals: Some(Vec::new()),
            cards: Some(MatchCards::default()),
            ..MatchPatch::default()
        }
    }
}

/// Pair group winners with runners-up per [`QUARTER_FINAL_DRAW`].
///
/// Fails without partial output if a group lacks two ranked teams or a quarterfinal is
/// missing, and refuses once any bracket match is completed.
pub fn seed_quarter_finals(standings: &[Standing], bracket: &[GameMatch]) -> Result<Vec<Seeding>, TournamentError> {
    if bracket.iter().any(|m| m.is_knockout() && m.status == MatchStatus::Completed) {
        return Err(TournamentError::invalid_state(
            "knockout results already entered; delete the knockout stage to re-seed",
        ));
    }
    let quarters = round_matches(bracket, KnockoutRound::Quarter);

    let place = |group: &str, rank: usize| -> Result<TeamRef, TournamentError> {
        group_table(standings, group)
            .get(rank)
            .map(|s| TeamRef {
                id: s.team_id,
                name: s.team_name.clone(),
            })
            .ok_or_else(|| TournamentError::MissingGroup(group.to_string()))
    };

    QUARTER_FINAL_DRAW
        .iter()
        .zip(1u32..)
        .map(|(&(winner_group, runner_up_group), number)| {
            let m = quarters
                .iter()
                .find(|m| m.match_number() == Some(number))
                .ok_or_else(|| TournamentError::validation(format!("quarterfinal {number} missing")))?;
            Ok(Seeding {
                match_id: m.id,
                match_number: number,
                home: place(winner_group, 0)?,
                away: place(runner_up_group, 1)?,
            })
        })
        .collect()
}

/// Final score and match details entered for a knockout match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutResult {
    pub home_score: u32,
    pub away_score: u32,
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
    /// Shootout winner; required when the score is level.
    #[serde(default)]
    pub penalty_winner: Option<TeamId>,
}

/// Validate a result and build the patch that completes the match.
pub fn complete_match(m: &GameMatch, result: &KnockoutResult) -> Result<(MatchPatch, TeamRef), TournamentError> {
    if !m.is_knockout() {
        return Err(TournamentError::invalid_state("not a knockout match"));
    }
    let (Some(home), Some(away)) = (m.home_team.as_ref(), m.away_team.as_ref()) else {
        return Err(TournamentError::invalid_state("knockout match is not seeded yet"));
    };
    let winner = if result.home_score > result.away_score {
        home.clone()
    } else if result.away_score > result.home_score {
        away.clone()
    } else {
        match result.penalty_winner {
            Some(id) if id == home.id => home.clone(),
            Some(id) if id == away.id => away.clone(),
            Some(id) => {
                return Err(TournamentError::validation(format!("penalty winner {id} is not playing this match")));
            }
            None => return Err(TournamentError::KnockoutDraw(m.id)),
        }
    };
    let patch = MatchPatch {
        home_score: Some(result.home_score),
        away_score: Some(result.away_score),
        status: Some(MatchStatus::Completed),
        winner: Some(Some(winner.clone())),
        date: Some(result.date),
        time: Some(result.time.clone()),
        venue: Some(result.venue.clone()),
        ..MatchPatch::default()
    };
    Ok((patch, winner))
}

/// What to do with a completed match's winner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Propagation {
    /// No winner or no next match.
    Nothing,
    /// Winner already sits in the right slot.
    AlreadyPlaced { target: MatchId },
    Assign { target: MatchId, side: Side, patch: MatchPatch },
    Stale(StaleStateWarning),
}

/// Slot in the successor fed by `m`: first feeder (by match number) is home, second is away.
pub fn successor_side(m: &GameMatch, bracket: &[GameMatch]) -> Option<Side> {
    let slot = m.knockout.as_ref()?;
    let next = slot.next_match_number?;
    let position = round_matches(bracket, slot.round)
        .into_iter()
        .filter(|f| f.knockout.as_ref().and_then(|k| k.next_match_number) == Some(next))
        .position(|f| f.id == m.id)?;
    Some(if position % 2 == 0 { Side::Home } else { Side::Away })
}

/// Decide how `completed`'s winner moves into the next round. `bracket` must be fresh.
pub fn plan_propagation(completed: &GameMatch, bracket: &[GameMatch]) -> Propagation {
    let Some(slot) = completed.knockout.as_ref() else {
        return Propagation::Nothing;
    };
    let (Some(winner), Some(next_number), Some(next_round)) =
        (slot.winner.as_ref(), slot.next_match_number, slot.round.next())
    else {
        return Propagation::Nothing;
    };
    let Some(target) = round_matches(bracket, next_round)
        .into_iter()
        .find(|m| m.match_number() == Some(next_number))
    else {
        return Propagation::Nothing;
    };
    let Some(side) = successor_side(completed, bracket) else {
        return Propagation::Nothing;
    };

    if target.team(side).is_some_and(|t| t.id == winner.id) {
        return Propagation::AlreadyPlaced { target: target.id };
    }
    let stale = if target.status == MatchStatus::Completed {
        Some("next match is already completed")
    } else if target.home_team.is_some() && target.away_team.is_some() {
        Some("next match already has both teams")
    } else {
        None
    };
    if let Some(reason) = stale {
        return Propagation::Stale(StaleStateWarning {
            source_match_id: completed.id,
            target_match_id: target.id,
            message: format!("{reason}; {} not advanced", winner.name),
        });
    }
    Propagation::Assign {
        target: target.id,
        side,
        patch: MatchPatch::team(side, winner.clone()),
    }
}
