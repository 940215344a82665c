//! Tournament business logic: schedule, standings, knockout bracket, awards, etc.

mod awards;
mod discipline;
mod knockout;
mod roster;
mod schedule;
mod standings;

pub use awards::{
    best_keepers, best_players, is_goalkeeper, top_scorers, KeeperRating, PlayerRating, TopScorer, BEST_KEEPERS_LIMIT,
    BEST_PLAYERS_LIMIT, TOP_SCORERS_LIMIT,
};
pub use discipline::{player_discipline, PlayerDiscipline};
pub use knockout::{
    complete_match, knockout_skeleton, knockout_state, plan_propagation, round_matches, seed_quarter_finals,
    successor_side, KnockoutResult, KnockoutState, Propagation, Seeding, QUARTER_FINAL_DRAW,
};
pub use roster::parse_roster;
pub use schedule::{
    generate_schedule, generate_schedule_seeded, round_robin_pairings, teams_by_group, validate_teams, Pairing,
};
pub use standings::{compute_standings, group_table, rank_order};
