//! Football tournament admin: library with models, business logic and storage.

pub mod config;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::{ServerConfig, Settings, TournamentConfig};
pub use logic::{
    best_keepers, best_players, complete_match, compute_standings, generate_schedule, generate_schedule_seeded,
    group_table, knockout_skeleton, knockout_state, parse_roster, plan_propagation, player_discipline,
    round_robin_pairings, seed_quarter_finals, top_scorers, KeeperRating, KnockoutResult, KnockoutState, Propagation,
    QUARTER_FINAL_DRAW,
};
pub use models::{
    Card, CardId, CardKind, GameMatch, Goal, GoalId, KnockoutRound, KnockoutSlot, MatchCards, MatchId, MatchPatch, MatchStatus,
    Player, PlayerId, Side, StaleStateWarning, Standing, StoreError, Team, TeamId, TeamRef, Tournament,
    TournamentError, KNOCKOUT_GROUP,
};
pub use service::{KnockoutOutcome, MatchResult, NewCard, NewGoal, NewPlayer, TournamentService};
pub use store::{MatchFilter, MemoryStore, Repository, Stage};
