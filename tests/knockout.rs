//! Integration tests for the knockout bracket: seeding, result entry and propagation.

use chrono::NaiveDate;
use football_tournament_web::{
    complete_match, knockout_skeleton, knockout_state, plan_propagation, seed_quarter_finals, GameMatch,
    KnockoutResult, KnockoutRound, KnockoutState, MatchPatch, MatchStatus, Propagation, Side, Standing, Team,
    TeamRef, TournamentError,
};

fn result(home_score: u32, away_score: u32) -> KnockoutResult {
    KnockoutResult {
        home_score,
        away_score,
        date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
        time: "16:00".to_string(),
        venue: "Main Stadium".to_string(),
        penalty_winner: None,
    }
}

fn team(name: &str) -> TeamRef {
    Team::new(name, "A").team_ref()
}

fn find(bracket: &[GameMatch], round: KnockoutRound, number: u32) -> usize {
    bracket
        .iter()
        .position(|m| m.round() == Some(round) && m.match_number() == Some(number))
        .unwrap()
}

fn seed(bracket: &mut [GameMatch], round: KnockoutRound, number: u32, home: &TeamRef, away: &TeamRef) {
    let idx = find(bracket, round, number);
    bracket[idx].home_team = Some(home.clone());
    bracket[idx].away_team = Some(away.clone());
}

/// Enter a result into the bracket in place and return the planned propagation.
fn finish(bracket: &mut [GameMatch], round: KnockoutRound, number: u32, home_score: u32, away_score: u32) -> Propagation {
    let idx = find(bracket, round, number);
    let (patch, _) = complete_match(&bracket[idx], &result(home_score, away_score)).unwrap();
    patch.apply(&mut bracket[idx]);
    let view: &[GameMatch] = bracket;
    plan_propagation(&view[idx], view)
}

fn apply(bracket: &mut [GameMatch], propagation: Propagation) {
    let Propagation::Assign { target, patch, .. } = propagation else {
        panic!("expected an assignment, got {propagation:?}");
    };
    let m = bracket.iter_mut().find(|m| m.id == target).unwrap();
    patch.apply(m);
}

/// Four groups of three with points 9/6/3 so the table order is unambiguous.
fn group_standings() -> (Vec<Team>, Vec<Standing>) {
    let mut teams = Vec::new();
    let mut standings = Vec::new();
    for group in ["A", "B", "C", "D"] {
        for (rank, points) in [9u32, 6, 3].into_iter().enumerate() {
            let t = Team::new(format!("{group}{}", rank + 1), group);
            // Listed lowest first so seeding has to sort.
            standings.insert(
                0,
                Standing {
                    points,
                    matches_played: 3,
                    ..Standing::for_team(&t)
                },
            );
            teams.push(t);
        }
    }
    (teams, standings)
}

#[test]
fn skeleton_has_seven_linked_matches() {
    let bracket = knockout_skeleton("Main Stadium");
    assert_eq!(bracket.len(), 7);
    let next_of = |round: KnockoutRound, number: u32| bracket[find(&bracket, round, number)].knockout.as_ref().unwrap().next_match_number;
    assert_eq!(next_of(KnockoutRound::Quarter, 1), Some(1));
    assert_eq!(next_of(KnockoutRound::Quarter, 2), Some(1));
    assert_eq!(next_of(KnockoutRound::Quarter, 3), Some(2));
    assert_eq!(next_of(KnockoutRound::Quarter, 4), Some(2));
    assert_eq!(next_of(KnockoutRound::Semi, 1), Some(1));
    assert_eq!(next_of(KnockoutRound::Semi, 2), Some(1));
    assert_eq!(next_of(KnockoutRound::Final, 1), None);
    for m in &bracket {
        assert_eq!(knockout_state(m), KnockoutState::Unseeded);
        assert_eq!(m.venue, "Main Stadium");
    }
}

#[test]
fn quarter_finals_pair_winners_with_cross_group_runners_up() {
    let (_, standings) = group_standings();
    let bracket = knockout_skeleton("Main Stadium");
    let seedings = seed_quarter_finals(&standings, &bracket).unwrap();

    let pairs: Vec<(u32, &str, &str)> = seedings
        .iter()
        .map(|s| (s.match_number, s.home.name.as_str(), s.away.name.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![(1, "A1", "B2"), (2, "B1", "A2"), (3, "C1", "D2"), (4, "D1", "C2")]
    );
    for s in &seedings {
        assert_eq!(s.match_id, bracket[find(&bracket, KnockoutRound::Quarter, s.match_number)].id);
    }
}

#[test]
fn seeding_patch_resets_previous_results() {
    let (_, standings) = group_standings();
    let mut bracket = knockout_skeleton("Main Stadium");
    let seeding = seed_quarter_finals(&standings, &bracket).unwrap().remove(0);
    let idx = find(&bracket, KnockoutRound::Quarter, 1);
    bracket[idx].home_score = Some(2);
    seeding.into_patch().apply(&mut bracket[idx]);

    let m = &bracket[idx];
    assert_eq!(m.score(), Some((0, 0)));
    assert_eq!(knockout_state(m), KnockoutState::Scheduled);
    assert_eq!(m.home_team.as_ref().unwrap().name, "A1");
    assert!(m.knockout.as_ref().unwrap().winner.is_none());
}

#[test]
fn seeding_fails_without_partial_output_when_a_group_is_missing() {
    let (_, standings) = group_standings();
    let without_d: Vec<Standing> = standings.into_iter().filter(|s| s.group_id != "D").collect();
    let err = seed_quarter_finals(&without_d, &knockout_skeleton("Main Stadium")).unwrap_err();
    assert!(matches!(err, TournamentError::MissingGroup(g) if g == "D"));
}

#[test]
fn seeding_is_refused_after_a_knockout_result() {
    let (_, standings) = group_standings();
    let mut bracket = knockout_skeleton("Main Stadium");
    let idx = find(&bracket, KnockoutRound::Quarter, 2);
    bracket[idx].status = MatchStatus::Completed;
    let err = seed_quarter_finals(&standings, &bracket).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidState(_)));
}

#[test]
fn winners_fill_semi_final_home_then_away() {
    let mut bracket = knockout_skeleton("Main Stadium");
    let (a, b, c, d) = (team("A"), team("B"), team("C"), team("D"));
    seed(&mut bracket, KnockoutRound::Quarter, 1, &a, &b);
    seed(&mut bracket, KnockoutRound::Quarter, 2, &c, &d);
    let sf1 = bracket[find(&bracket, KnockoutRound::Semi, 1)].id;

    let second = finish(&mut bracket, KnockoutRound::Quarter, 2, 0, 1);
    assert_eq!(
        second,
        Propagation::Assign {
            target: sf1,
            side: Side::Away,
            patch: MatchPatch::team(Side::Away, d.clone()),
        }
    );
    apply(&mut bracket, second);

    let first = finish(&mut bracket, KnockoutRound::Quarter, 1, 2, 1);
    assert_eq!(
        first,
        Propagation::Assign {
            target: sf1,
            side: Side::Home,
            patch: MatchPatch::team(Side::Home, a.clone()),
        }
    );
    apply(&mut bracket, first);

    let semi = &bracket[find(&bracket, KnockoutRound::Semi, 1)];
    assert_eq!(semi.home_team.as_ref(), Some(&a));
    assert_eq!(semi.away_team.as_ref(), Some(&d));
    assert_eq!(knockout_state(semi), KnockoutState::Scheduled);
}

#[test]
fn feeder_order_follows_match_numbers_not_adjacency() {
    // QF1 and QF3 feed SF1, QF2 and QF4 feed SF2.
    let mut bracket: Vec<GameMatch> = [1, 2, 1, 2]
        .into_iter()
        .zip(1u32..)
        .map(|(next, n)| GameMatch::knockout(KnockoutRound::Quarter, n, Some(next), "Main Stadium"))
        .collect();
    bracket.push(GameMatch::knockout(KnockoutRound::Semi, 1, Some(1), "Main Stadium"));
    bracket.push(GameMatch::knockout(KnockoutRound::Semi, 2, Some(1), "Main Stadium"));
    bracket.push(GameMatch::knockout(KnockoutRound::Final, 1, None, "Main Stadium"));

    let (x, y, u, v) = (team("X"), team("Y"), team("U"), team("V"));
    seed(&mut bracket, KnockoutRound::Quarter, 1, &x, &y);
    seed(&mut bracket, KnockoutRound::Quarter, 3, &u, &v);

    let qf1 = finish(&mut bracket, KnockoutRound::Quarter, 1, 3, 0);
    assert!(matches!(qf1, Propagation::Assign { side: Side::Home, .. }));
    apply(&mut bracket, qf1);
    let qf3 = finish(&mut bracket, KnockoutRound::Quarter, 3, 0, 2);
    assert!(matches!(qf3, Propagation::Assign { side: Side::Away, .. }));
    apply(&mut bracket, qf3);

    let semi = &bracket[find(&bracket, KnockoutRound::Semi, 1)];
    assert_eq!(semi.home_team.as_ref(), Some(&x));
    assert_eq!(semi.away_team.as_ref(), Some(&v));
}

#[test]
fn re_entering_the_same_winner_is_a_no_op() {
    let mut bracket = knockout_skeleton("Main Stadium");
    let (a, b) = (team("A"), team("B"));
    seed(&mut bracket, KnockoutRound::Quarter, 1, &a, &b);
    let first = finish(&mut bracket, KnockoutRound::Quarter, 1, 1, 0);
    apply(&mut bracket, first);

    let again = finish(&mut bracket, KnockoutRound::Quarter, 1, 4, 0);
    let sf1 = bracket[find(&bracket, KnockoutRound::Semi, 1)].id;
    assert_eq!(again, Propagation::AlreadyPlaced { target: sf1 });
}

#[test]
fn changed_winner_into_a_full_match_is_stale() {
    let mut bracket = knockout_skeleton("Main Stadium");
    let (a, b, c) = (team("A"), team("B"), team("C"));
    seed(&mut bracket, KnockoutRound::Quarter, 1, &a, &b);
    seed(&mut bracket, KnockoutRound::Semi, 1, &a, &c);

    let qf1 = bracket[find(&bracket, KnockoutRound::Quarter, 1)].id;
    let sf1 = bracket[find(&bracket, KnockoutRound::Semi, 1)].id;
    let Propagation::Stale(warning) = finish(&mut bracket, KnockoutRound::Quarter, 1, 0, 2) else {
        panic!("expected a stale warning");
    };
    assert_eq!(warning.source_match_id, qf1);
    assert_eq!(warning.target_match_id, sf1);
    // Nothing was written to the semifinal.
    assert_eq!(bracket[find(&bracket, KnockoutRound::Semi, 1)].home_team.as_ref(), Some(&a));
}

#[test]
fn final_has_nowhere_to_propagate() {
    let mut bracket = knockout_skeleton("Main Stadium");
    let (a, b) = (team("A"), team("B"));
    seed(&mut bracket, KnockoutRound::Final, 1, &a, &b);
    assert_eq!(finish(&mut bracket, KnockoutRound::Final, 1, 1, 2), Propagation::Nothing);
    let last = &bracket[find(&bracket, KnockoutRound::Final, 1)];
    assert_eq!(last.knockout.as_ref().unwrap().winner.as_ref(), Some(&b));
    assert_eq!(knockout_state(last), KnockoutState::Completed);
}

#[test]
fn level_score_needs_a_penalty_winner() {
    let mut bracket = knockout_skeleton("Main Stadium");
    let (a, b) = (team("A"), team("B"));
    seed(&mut bracket, KnockoutRound::Quarter, 4, &a, &b);
    let m = &bracket[find(&bracket, KnockoutRound::Quarter, 4)];

    assert!(matches!(complete_match(m, &result(1, 1)), Err(TournamentError::KnockoutDraw(id)) if id == m.id));

    let shootout = KnockoutResult {
        penalty_winner: Some(b.id),
        ..result(1, 1)
    };
    let (patch, winner) = complete_match(m, &shootout).unwrap();
    assert_eq!(winner, b);
    assert_eq!(patch.status, Some(MatchStatus::Completed));
    assert_eq!(patch.winner, Some(Some(b.clone())));

    let outsider = KnockoutResult {
        penalty_winner: Some(team("Z").id),
        ..result(1, 1)
    };
    assert!(matches!(complete_match(m, &outsider), Err(TournamentError::Validation(_))));
}

#[test]
fn unseeded_match_cannot_be_completed() {
    let bracket = knockout_skeleton("Main Stadium");
    let m = &bracket[find(&bracket, KnockoutRound::Semi, 2)];
    assert!(matches!(complete_match(m, &result(1, 0)), Err(TournamentError::InvalidState(_))));
}

#[test]
fn completing_records_details() {
    let mut bracket = knockout_skeleton("Main Stadium");
    let (a, b) = (team("A"), team("B"));
    seed(&mut bracket, KnockoutRound::Quarter, 3, &a, &b);
    finish(&mut bracket, KnockoutRound::Quarter, 3, 2, 0);
    let m = &bracket[find(&bracket, KnockoutRound::Quarter, 3)];
    assert_eq!(m.score(), Some((2, 0)));
    assert_eq!(m.date, NaiveDate::from_ymd_opt(2025, 8, 1));
    assert_eq!(m.time.as_deref(), Some("16:00"));
    assert_eq!(m.knockout.as_ref().unwrap().winner.as_ref(), Some(&a));
}
