//! Data structures for the football tournament: teams, matches, standings, tournament state.

mod game;
mod standing;
mod team;
mod tournament;

pub use game::{
    Card, CardId, CardKind, GameMatch, Goal, GoalId, KnockoutRound, KnockoutSlot, MatchCards,
    MatchId, MatchPatch, MatchStatus, Side, KNOCKOUT_GROUP,
};
pub use standing::{Standing, POINTS_FOR_DRAW, POINTS_FOR_WIN};
pub use team::{Player, PlayerId, Team, TeamId, TeamRef};
pub use tournament::{StaleStateWarning, StoreError, Tournament, TournamentError};
