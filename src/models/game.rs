//! Match, knockout slot, goals and cards.

use crate::models::team::{PlayerId, TeamId, TeamRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a recorded goal.
pub type GoalId = Uuid;

/// Unique identifier for a recorded card.
pub type CardId = Uuid;

/// Group label used for every bracket match.
pub const KNOCKOUT_GROUP: &str = "knockout";

/// Lifecycle of a match as seen by result entry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
}

/// Home or away side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// Knockout round a bracket match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KnockoutRound {
    Quarter,
    Semi,
    Final,
}

impl KnockoutRound {
    /// Round that receives this round's winners.
    pub fn next(self) -> Option<Self> {
        match self {
            KnockoutRound::Quarter => Some(KnockoutRound::Semi),
            KnockoutRound::Semi => Some(KnockoutRound::Final),
            KnockoutRound::Final => None,
        }
    }
}

/// Bracket position of a knockout match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutSlot {
    pub round: KnockoutRound,
    /// Unique within the round, starting at 1.
    pub match_number: u32,
    /// Match in the next round that receives the winner. None for the final.
    pub next_match_number: Option<u32>,
    pub winner: Option<TeamRef>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Yellow,
    Red,
}

/// A goal scored in a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub minute: u32,
    pub player_name: String,
    pub team_name: String,
}

/// A yellow or red card shown in a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub minute: u32,
    pub kind: CardKind,
    pub player_name: String,
    pub team_name: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchCards {
    pub home: Vec<Card>,
    pub away: Vec<Card>,
}

/// A single match: group fixture or knockout bracket match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// Group label, or [`KNOCKOUT_GROUP`] for bracket matches.
    pub group_id: String,
    /// None until seeded (knockout only).
    pub home_team: Option<TeamRef>,
    pub away_team: Option<TeamRef>,
    /// None while unscheduled.
    pub date: Option<NaiveDate>,
    /// Daily slot label, e.g. "13:30".
    pub time: Option<String>,
    pub venue: String,
    /// None only for malformed records; new matches start at 0.
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub cards: MatchCards,
    #[serde(default)]
    pub knockout: Option<KnockoutSlot>,
}

impl GameMatch {
    /// Unscheduled group fixture between two teams.
    pub fn group_fixture(id: MatchId, group_id: impl Into<String>, home: TeamRef, away: TeamRef, venue: impl Into<String>) -> Self {
        Self {
            id,
            group_id: group_id.into(),
            home_team: Some(home),
            away_team: Some(away),
            date: None,
            time: None,
            venue: venue.into(),
            home_score: Some(0),
            away_score: Some(0),
            status: MatchStatus::Scheduled,
            goals: Vec::new(),
            cards: MatchCards::default(),
            knockout: None,
        }
    }

    /// Unseeded bracket match.
    pub fn knockout(round: KnockoutRound, match_number: u32, next_match_number: Option<u32>, venue: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id: KNOCKOUT_GROUP.to_string(),
            home_team: None,
            away_team: None,
            date: None,
            time: None,
            venue: venue.into(),
            home_score: Some(0),
            away_score: Some(0),
            status: MatchStatus::Scheduled,
            goals: Vec::new(),
            cards: MatchCards::default(),
            knockout: Some(KnockoutSlot {
                round,
                match_number,
                next_match_number,
                winner: None,
            }),
        }
    }

    pub fn is_knockout(&self) -> bool {
        self.knockout.is_some()
    }

    pub fn round(&self) -> Option<KnockoutRound> {
        self.knockout.as_ref().map(|k| k.round)
    }

    pub fn match_number(&self) -> Option<u32> {
        self.knockout.as_ref().map(|k| k.match_number)
    }

    /// Both scores, if the match has them.
    pub fn score(&self) -> Option<(u32, u32)> {
        Some((self.home_score?, self.away_score?))
    }

    pub fn team(&self, side: Side) -> Option<&TeamRef> {
        match side {
            Side::Home => self.home_team.as_ref(),
            Side::Away => self.away_team.as_ref(),
        }
    }

    /// Which side a team plays on in this match.
    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        if self.home_team.as_ref().is_some_and(|t| t.id == team_id) {
            Some(Side::Home)
        } else if self.away_team.as_ref().is_some_and(|t| t.id == team_id) {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.side_of(team_id).is_some()
    }
}

/// Partial update of a match. Only `Some` fields are written.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchPatch {
    pub home_team: Option<TeamRef>,
    pub away_team: Option<TeamRef>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub venue: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: Option<MatchStatus>,
    /// `Some(None)` clears the winner.
    pub winner: Option<Option<TeamRef>>,
    pub goals: Option<Vec<Goal>>,
    pub cards: Option<MatchCards>,
}

impl MatchPatch {
    /// Patch that writes `team` into one side.
    pub fn team(side: Side, team: TeamRef) -> Self {
        match side {
            Side::Home => Self { home_team: Some(team), ..Self::default() },
            Side::Away => Self { away_team: Some(team), ..Self::default() },
        }
    }

    pub fn apply(self, m: &mut GameMatch) {
        if let Some(t) = self.home_team {
            m.home_team = Some(t);
        }
        if let Some(t) = self.away_team {
            m.away_team = Some(t);
        }
        if let Some(d) = self.date {
            m.date = Some(d);
        }
        if let Some(t) = self.time {
            m.time = Some(t);
        }
        if let Some(v) = self.venue {
            m.venue = v;
        }
        if let Some(s) = self.home_score {
            m.home_score = Some(s);
        }
        if let Some(s) = self.away_score {
            m.away_score = Some(s);
        }
        if let Some(s) = self.status {
            m.status = s;
        }
        if let Some(w) = self.winner {
            if let Some(k) = m.knockout.as_mut() {
                k.winner = w;
            }
        }
        if let Some(g) = self.goals {
            m.goals = g;
        }
        if let Some(c) = self.cards {
            m.cards = c;
        }
    }
}
