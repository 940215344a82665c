//! Settings: scheduling constants and server binding.
//!
//! Loaded from built-in defaults, then an optional `tournament.toml` in the working
//! directory, then `APP__`-prefixed environment variables
//! (e.g. `APP__SERVER__PORT=9000`, `APP__TOURNAMENT__MIN_REST_DAYS=3`).

use crate::models::TournamentError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Tunables for scheduling, bracket and discipline logic.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Matches played on every used day.
    pub matches_per_day: usize,
    /// Kick-off slots, assigned in order.
    pub daily_slots: Vec<String>,
    /// Minimum calendar days between two matches of the same team.
    pub min_rest_days: i64,
    /// Days the scheduler may walk forward from the start date.
    pub max_schedule_horizon_days: u32,
    /// Whole-schedule attempts before giving up.
    pub max_retries: u32,
    /// Unfillable days in a row that abort an attempt.
    pub max_consecutive_failures: u32,
    pub venue: String,
    /// Yellow cards that trigger a ban.
    pub yellow_card_ban_threshold: u32,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            matches_per_day: 3,
            daily_slots: vec!["13:30".into(), "14:45".into(), "16:00".into()],
            min_rest_days: 2,
            max_schedule_horizon_days: 30,
            max_retries: 10,
            max_consecutive_failures: 5,
            venue: "Stadion Gelora Babakan Girihieum".into(),
            yellow_card_ban_threshold: 3,
        }
    }
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), TournamentError> {
        if self.matches_per_day == 0 {
            return Err(TournamentError::validation("matches_per_day must be at least 1"));
        }
        if self.daily_slots.len() < self.matches_per_day {
            return Err(TournamentError::validation(format!(
                "{} daily slots configured but {} matches per day",
                self.daily_slots.len(),
                self.matches_per_day
            )));
        }
        if self.min_rest_days < 1 {
            return Err(TournamentError::validation("min_rest_days must be at least 1"));
        }
        if self.max_schedule_horizon_days == 0 || self.max_retries == 0 || self.max_consecutive_failures == 0 {
            return Err(TournamentError::validation(
                "horizon, retries and consecutive failure limits must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        // 0.0.0.0 so the app is reachable when deployed on a VPS.
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub tournament: TournamentConfig,
}

impl Settings {
    /// Load settings from `tournament.toml` (optional) and the environment.
    pub fn load() -> Result<Self, TournamentError> {
        let settings = Config::builder()
            .add_source(File::with_name("tournament").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("tournament.daily_slots")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        settings.tournament.validate()?;
        Ok(settings)
    }
}
