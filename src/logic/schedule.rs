//! Group stage: round-robin fixture generation with rest and daily-capacity constraints.

use crate::config::TournamentConfig;
use crate::models::{GameMatch, Team, TeamId, TeamRef, TournamentError};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One unordered pairing inside a group. The earlier team in input order is home.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pairing {
    pub group_id: String,
    pub home: TeamRef,
    pub away: TeamRef,
}

/// A pairing placed on a day and slot.
#[derive(Clone, Debug)]
struct Fixture {
    pairing: Pairing,
    date: NaiveDate,
    slot: usize,
}

/// Per-team load while walking the calendar.
#[derive(Default)]
struct Load {
    games: HashMap<TeamId, u32>,
    last_played: HashMap<TeamId, NaiveDate>,
}

impl Load {
    fn games(&self, team: TeamId) -> u32 {
        self.games.get(&team).copied().unwrap_or(0)
    }

    /// Days since the team's last match, or None if it has not played.
    fn rest(&self, team: TeamId, date: NaiveDate) -> Option<i64> {
        self.last_played.get(&team).map(|last| (date - *last).num_days())
    }

    fn record(&mut self, team: TeamId, date: NaiveDate) {
        *self.games.entry(team).or_insert(0) += 1;
        self.last_played.insert(team, date);
    }
}

/// Groups keyed by id (sorted), teams in input order.
pub fn teams_by_group(teams: &[Team]) -> BTreeMap<String, Vec<&Team>> {
    let mut groups: BTreeMap<String, Vec<&Team>> = BTreeMap::new();
    for team in teams {
        groups.entry(team.group_id.clone()).or_default().push(team);
    }
    groups
}

/// All unordered pairings within each group: n(n-1)/2 per group of n.
pub fn round_robin_pairings(teams: &[Team]) -> Vec<Pairing> {
    let mut pairings = Vec::new();
    for (group_id, group) in teams_by_group(teams) {
        for (i, home) in group.iter().enumerate() {
            for away in &group[i + 1..] {
                pairings.push(Pairing {
                    group_id: group_id.clone(),
                    home: home.team_ref(),
                    away: away.team_ref(),
                });
            }
        }
    }
    pairings
}

/// Reject inputs for which no fair schedule can exist.
pub fn validate_teams(teams: &[Team], config: &TournamentConfig) -> Result<(), TournamentError> {
    config.validate()?;
    if teams.is_empty() {
        return Err(TournamentError::validation("no teams to schedule"));
    }
    let mut seen = HashSet::new();
    for team in teams {
        if !seen.insert(team.id) {
            return Err(TournamentError::validation(format!("team {} listed twice", team.id)));
        }
        if team.group_id.trim().is_empty() {
            return Err(TournamentError::validation(format!("team {:?} has no group", team.name)));
        }
    }

    let groups = teams_by_group(teams);
    let sizes: Vec<(String, usize)> = groups.iter().map(|(g, t)| (g.clone(), t.len())).collect();
    if sizes.iter().any(|(_, n)| *n < 2) {
        return Err(TournamentError::validation("every group needs at least two teams"));
    }
    if sizes.windows(2).any(|w| w[0].1 != w[1].1) {
        return Err(TournamentError::UnequalGroups { sizes });
    }

    let total: usize = sizes.iter().map(|(_, n)| n * (n - 1) / 2).sum();
    if total % config.matches_per_day != 0 {
        return Err(TournamentError::validation(format!(
            "{} pairings cannot fill days of {} matches exactly",
            total, config.matches_per_day
        )));
    }
    Ok(())
}

/// Generate a full group-stage schedule with a deterministic RNG seeded from `seed`.
pub fn generate_schedule_seeded(
    teams: &[Team],
    start_date: NaiveDate,
    config: &TournamentConfig,
    seed: u64,
) -> Result<Vec<GameMatch>, TournamentError> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_schedule(teams, start_date, config, &mut rng)
}

/// Generate a full group-stage schedule.
///
/// 1. Enumerate every intra-group pairing.
/// 2. Shuffle the pool and walk forward day by day, filling each day with exactly
///    `matches_per_day` pairings that respect the rest period.
/// 3. Retry with a fresh shuffle when pairings are left over or the result is not fair.
///
/// Returned matches are sorted by date and slot. Nothing partial is ever returned.
pub fn generate_schedule<R: Rng + ?Sized>(
    teams: &[Team],
    start_date: NaiveDate,
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<Vec<GameMatch>, TournamentError> {
    validate_teams(teams, config)?;

    let pairings = round_robin_pairings(teams);
    let group_size = teams_by_group(teams)
        .values()
        .next()
        .map(|g| g.len())
        .unwrap_or(0);
    let expected_games = (group_size - 1) as u32;

    for attempt in 1..=config.max_retries {
        let mut pool = pairings.clone();
        pool.shuffle(rng);

        let fixtures = match walk_calendar(pool, start_date, expected_games, config) {
            Ok(fixtures) => fixtures,
            Err(remaining) => {
                log::debug!("Schedule attempt {attempt}: {remaining} pairing(s) left unscheduled");
                continue;
            }
        };

        if !is_fair(&fixtures, teams, expected_games, config.matches_per_day) {
            log::debug!("Schedule attempt {attempt}: rejected by fairness check");
            continue;
        }

        let days = fixtures.iter().map(|f| f.date).collect::<HashSet<_>>().len();
        log::info!(
            "Generated schedule of {} matches over {} day(s) on attempt {}",
            fixtures.len(),
            days,
            attempt
        );
        return Ok(into_matches(fixtures, config, rng));
    }

    Err(TournamentError::InfeasibleSchedule {
        attempts: config.max_retries,
    })
}

/// One day-by-day pass over the shuffled pool. Err carries the number of pairings left.
fn walk_calendar(
    mut pool: Vec<Pairing>,
    start_date: NaiveDate,
    expected_games: u32,
    config: &TournamentConfig,
) -> Result<Vec<Fixture>, usize> {
    let mut load = Load::default();
    let mut fixtures = Vec::with_capacity(pool.len());
    let mut consecutive_failures = 0;
    let mut date = start_date;

    for _ in 0..config.max_schedule_horizon_days {
        if pool.is_empty() {
            break;
        }
        let picked = select_for_day(date, &pool, &load, expected_games, config);
        if picked.len() == config.matches_per_day {
            consecutive_failures = 0;
            let day: Vec<Pairing> = picked.iter().map(|&idx| pool[idx].clone()).collect();
            let chosen: HashSet<usize> = picked.into_iter().collect();
            let mut idx = 0;
            pool.retain(|_| {
                let keep = !chosen.contains(&idx);
                idx += 1;
                keep
            });
            // Slots follow selection order.
            for (slot, pairing) in day.into_iter().enumerate() {
                load.record(pairing.home.id, date);
                load.record(pairing.away.id, date);
                fixtures.push(Fixture { pairing, date, slot });
            }
        } else {
            consecutive_failures += 1;
            if consecutive_failures >= config.max_consecutive_failures {
                break;
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    if pool.is_empty() {
        Ok(fixtures)
    } else {
        Err(pool.len())
    }
}

/// Pick up to `matches_per_day` pool indices for `date`, highest priority first.
fn select_for_day(
    date: NaiveDate,
    pool: &[Pairing],
    load: &Load,
    expected_games: u32,
    config: &TournamentConfig,
) -> Vec<usize> {
    let horizon = config.max_schedule_horizon_days as i64;
    let mut ranked: Vec<(usize, i64)> = pool
        .iter()
        .enumerate()
        .map(|(idx, p)| (idx, priority(p, date, load, expected_games, horizon)))
        .collect();
    // Stable: equal priorities keep shuffled order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut used: HashSet<TeamId> = HashSet::new();
    let mut picked = Vec::with_capacity(config.matches_per_day);
    for (idx, _) in ranked {
        if picked.len() >= config.matches_per_day {
            break;
        }
        let p = &pool[idx];
        if used.contains(&p.home.id) || used.contains(&p.away.id) {
            continue;
        }
        let rested = |team: TeamId| load.rest(team, date).map_or(true, |d| d >= config.min_rest_days);
        if rested(p.home.id) && rested(p.away.id) {
            used.insert(p.home.id);
            used.insert(p.away.id);
            picked.push(idx);
        }
    }
    picked
}

/// Favour teams with fewer games so far and longer rest.
fn priority(p: &Pairing, date: NaiveDate, load: &Load, expected_games: u32, horizon: i64) -> i64 {
    let remaining = |team: TeamId| expected_games as i64 - load.games(team) as i64;
    let rest = |team: TeamId| load.rest(team, date).unwrap_or(horizon);
    remaining(p.home.id) * 10 + remaining(p.away.id) * 10 + rest(p.home.id).min(rest(p.away.id)) * 5
}

/// Every team plays `expected_games`, every used day is full.
fn is_fair(fixtures: &[Fixture], teams: &[Team], expected_games: u32, matches_per_day: usize) -> bool {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    let mut per_team: HashMap<TeamId, u32> = HashMap::new();
    for f in fixtures {
        *per_day.entry(f.date).or_insert(0) += 1;
        *per_team.entry(f.pairing.home.id).or_insert(0) += 1;
        *per_team.entry(f.pairing.away.id).or_insert(0) += 1;
    }
    per_day.values().all(|&n| n == matches_per_day)
        && teams
            .iter()
            .all(|t| per_team.get(&t.id).copied().unwrap_or(0) == expected_games)
}

fn into_matches<R: Rng + ?Sized>(mut fixtures: Vec<Fixture>, config: &TournamentConfig, rng: &mut R) -> Vec<GameMatch> {
    fixtures.sort_by_key(|f| (f.date, f.slot));
    fixtures
        .into_iter()
        .map(|f| {
            let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
            let mut m = GameMatch::group_fixture(id, f.pairing.group_id, f.pairing.home, f.pairing.away, config.venue.clone());
            m.date = Some(f.date);
            m.time = config.daily_slots.get(f.slot).cloned();
            m
        })
        .collect()
}
