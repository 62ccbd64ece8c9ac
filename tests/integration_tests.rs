use chrono::NaiveDate;
use league_engine::store::memory::MemoryStore;
use league_engine::store::Store;
use league_engine::{Engine, EngineError, Metrics, PlayoffRound, ScoringConfig, UserId};

fn engine() -> Engine<MemoryStore> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Engine::new(MemoryStore::new())
}

fn first_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

fn lookup_code(engine: &Engine<MemoryStore>, league_id: league_engine::LeagueId) -> String {
    engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.get_league(league_id)?.join_code))
        .unwrap()
}

fn sample_metrics() -> Metrics {
    Metrics {
        steps: 10_000.0,
        sleep_hours: 8.0,
        calories: 500.0,
        workout_minutes: 30.0,
        stand_hours: 8.0,
        distance_miles: 4.0,
    }
}

/// Builds a 4-player, 3-week league, joined in
/// order A, B, C, D, started on a Monday.
fn four_player_season() -> (Engine<MemoryStore>, league_engine::LeagueId, Vec<UserId>) {
    let engine = engine();
    let mut rng = rand::thread_rng();
    let a = UserId::new();
    let league_id = engine
        .create_league(
            "Sanity League".into(),
            a,
            6,
            8,
            ScoringConfig::default(),
            &mut rng,
        )
        .unwrap();

    let mut users = vec![a];
    for _ in 0..3 {
        let user = UserId::new();
        engine
            .join_league_by_code(&lookup_code(&engine, league_id), user)
            .unwrap();
        users.push(user);
    }

    engine.start_league(league_id, a, first_monday()).unwrap();
    (engine, league_id, users)
}

#[test]
fn four_player_three_week_sanity_check() {
    let (engine, league_id, users) = four_player_season();
    let (a, b, c, d) = (users[0], users[1], users[2], users[3]);

    let matchups = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.list_matchups(league_id, 1)?))
        .unwrap();
    assert_eq!(matchups.len(), 2);
    let pairs: Vec<(UserId, UserId)> = matchups
        .iter()
        .map(|m| {
            let p1 = engine
                .store()
                .transaction(|tx| Ok::<_, EngineError>(tx.get_member(m.player1)?.user))
                .unwrap();
            let p2 = engine
                .store()
                .transaction(|tx| Ok::<_, EngineError>(tx.get_member(m.player2)?.user))
                .unwrap();
            (p1, p2)
        })
        .collect();
    let has_pair = |x: UserId, y: UserId| {
        pairs
            .iter()
            .any(|&(p1, p2)| (p1 == x && p2 == y) || (p1 == y && p2 == x))
    };
    assert!(has_pair(a, d));
    assert!(has_pair(b, c));

    for user in &[a, b, c, d] {
        engine
            .record_weekly_score(league_id, *user, 1, sample_metrics())
            .unwrap();
    }

    engine.advance_week(league_id, 1).unwrap();

    for user in &[a, b, c, d] {
        let member = engine
            .store()
            .transaction(|tx| {
                Ok::<_, EngineError>(tx.find_member_by_user(league_id, *user)?.unwrap())
            })
            .unwrap();
        assert_eq!(member.total_points, 109.0);
        assert_eq!(member.record.wins, 0);
        assert_eq!(member.record.losses, 0);
        assert_eq!(member.record.ties, 1);
    }
}

#[test]
fn late_score_after_finalize_does_not_move_standings() {
    let (engine, league_id, users) = four_player_season();
    let a = users[0];

    for user in &users {
        engine
            .record_weekly_score(league_id, *user, 1, sample_metrics())
            .unwrap();
    }
    engine.advance_week(league_id, 1).unwrap();

    let doubled = Metrics {
        steps: 20_000.0,
        sleep_hours: 16.0,
        calories: 1_000.0,
        workout_minutes: 60.0,
        stand_hours: 16.0,
        distance_miles: 8.0,
    };
    engine
        .record_weekly_score(league_id, a, 1, doubled)
        .unwrap();

    let member = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.find_member_by_user(league_id, a)?.unwrap()))
        .unwrap();
    assert_eq!(member.total_points, 109.0);

    let score = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.get_weekly_score(league_id, a, 1)?.unwrap()))
        .unwrap();
    assert_eq!(score.total_points, 218.0);
}

#[test]
fn repeated_advance_week_is_idempotent() {
    let (engine, league_id, users) = four_player_season();
    for user in &users {
        engine
            .record_weekly_score(league_id, *user, 1, sample_metrics())
            .unwrap();
    }

    engine.advance_week(league_id, 1).unwrap();
    let after_first = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.get_league(league_id)?.current_week))
        .unwrap();
    assert_eq!(after_first, 2);

    // Simulates two workers racing to finalize the same already-done
    // week: the second call must be a pure no-op, not a double advance.
    engine.advance_week(league_id, 1).unwrap();
    let after_second = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.get_league(league_id)?.current_week))
        .unwrap();
    assert_eq!(after_second, 2);
}

fn eight_week_playoff_league() -> (Engine<MemoryStore>, league_engine::LeagueId, Vec<UserId>) {
    let engine = engine();
    let mut rng = rand::thread_rng();
    let creator = UserId::new();
    let league_id = engine
        .create_league(
            "Playoff League".into(),
            creator,
            8,
            8,
            ScoringConfig::default(),
            &mut rng,
        )
        .unwrap();

    let mut users = vec![creator];
    for _ in 0..5 {
        let user = UserId::new();
        engine
            .join_league_by_code(&lookup_code(&engine, league_id), user)
            .unwrap();
        users.push(user);
    }
    engine
        .start_league(league_id, creator, first_monday())
        .unwrap();

    // Standings: A=6-2/900, B=6-2/880, C=5-3/870,
    // D=5-3/860, then two non-qualifiers.
    let wins = [6, 6, 5, 5, 0, 0];
    let points = [900.0, 880.0, 870.0, 860.0, 10.0, 10.0];
    engine
        .store()
        .transaction(|tx| -> Result<(), EngineError> {
            for (i, user) in users.iter().enumerate() {
                let member = tx.find_member_by_user(league_id, *user)?.unwrap();
                tx.conditional_update_member(member.id, &|_| true, &|m| {
                    m.record.wins = wins[i];
                    m.record.losses = 8 - wins[i];
                    m.total_points = points[i];
                })?;
            }
            Ok(())
        })
        .unwrap();
    engine
        .store()
        .transaction(|tx| {
            Ok::<_, EngineError>(
                tx.conditional_update_league(league_id, &|_| true, &|l| l.current_week = 9)?,
            )
        })
        .unwrap();

    (engine, league_id, users)
}

#[test]
fn playoff_tiebreaker_is_frozen_at_generation_time() {
    let (engine, league_id, users) = eight_week_playoff_league();
    let d = users[3];

    engine.run_playoffs(league_id).unwrap();

    // A late, huge week-9 score for D must not move its frozen tiebreaker.
    engine
        .store()
        .transaction(|tx| -> Result<(), EngineError> {
            let member = tx.find_member_by_user(league_id, d)?.unwrap();
            tx.conditional_update_member(member.id, &|_| true, &|m| m.total_points = 2000.0)?;
            Ok(())
        })
        .unwrap();

    let member_d = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.find_member_by_user(league_id, d)?.unwrap()))
        .unwrap();
    assert_eq!(member_d.playoff_tiebreaker_points, Some(860.0));
    assert_eq!(member_d.total_points, 2000.0);
}

#[test]
fn tied_semifinal_breaks_on_frozen_tiebreaker_and_eliminates_loser() {
    let (engine, league_id, users) = eight_week_playoff_league();
    let (a, d) = (users[0], users[3]);

    engine.run_playoffs(league_id).unwrap();

    let playoffs = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.list_playoffs(league_id)?))
        .unwrap();
    let semi1 = playoffs.iter().find(|p| p.match_number == 1).unwrap();
    assert_eq!(
        engine
            .store()
            .transaction(|tx| Ok::<_, EngineError>(tx.get_member(semi1.player1)?.user))
            .unwrap(),
        a
    );
    assert_eq!(
        engine
            .store()
            .transaction(|tx| Ok::<_, EngineError>(tx.get_member(semi1.player2)?.user))
            .unwrap(),
        d
    );

    engine
        .finalize_playoff_match(league_id, semi1.id, 150.0, 150.0)
        .unwrap();

    let finalized = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.get_playoff(semi1.id)?))
        .unwrap();
    let winner = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.get_member(finalized.winner.unwrap())?.user))
        .unwrap();
    assert_eq!(winner, a);

    let d_member = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.find_member_by_user(league_id, d)?.unwrap()))
        .unwrap();
    assert!(d_member.eliminated);
}

#[test]
fn finals_creation_is_idempotent_once_both_semifinals_finalize() {
    let (engine, league_id, _users) = eight_week_playoff_league();
    engine.run_playoffs(league_id).unwrap();

    let playoffs = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.list_playoffs(league_id)?))
        .unwrap();
    let semi1 = playoffs.iter().find(|p| p.match_number == 1).unwrap().id;
    let semi2 = playoffs.iter().find(|p| p.match_number == 2).unwrap().id;

    engine
        .finalize_playoff_match(league_id, semi1, 120.0, 90.0)
        .unwrap();
    let finals_before = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.list_playoffs(league_id)?))
        .unwrap()
        .into_iter()
        .filter(|p| p.round == PlayoffRound::Final)
        .count();
    assert_eq!(finals_before, 0);

    engine
        .finalize_playoff_match(league_id, semi2, 80.0, 100.0)
        .unwrap();

    let finals: Vec<_> = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.list_playoffs(league_id)?))
        .unwrap()
        .into_iter()
        .filter(|p| p.round == PlayoffRound::Final)
        .collect();
    assert_eq!(finals.len(), 1, "exactly one finals row must exist");

    let champion_after_final = engine.finalize_playoff_match(league_id, finals[0].id, 100.0, 80.0);
    assert!(champion_after_final.is_ok());

    let league = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.get_league(league_id)?))
        .unwrap();
    assert!(league.champion.is_some());
}

#[test]
fn join_league_rejects_unknown_code_and_full_league() {
    let engine = engine();
    let mut rng = rand::thread_rng();
    let creator = UserId::new();
    let league_id = engine
        .create_league(
            "Small".into(),
            creator,
            6,
            4,
            ScoringConfig::default(),
            &mut rng,
        )
        .unwrap();

    let result = engine.join_league_by_code("QQQQQQ", UserId::new());
    assert!(matches!(result, Err(EngineError::NotFound(_))));

    let code = lookup_code(&engine, league_id);
    for _ in 0..3 {
        engine.join_league_by_code(&code, UserId::new()).unwrap();
    }
    let result = engine.join_league_by_code(&code, UserId::new());
    assert!(matches!(result, Err(EngineError::Precondition(_))));
}

#[test]
fn delete_league_cascades_its_members() {
    let engine = engine();
    let mut rng = rand::thread_rng();
    let creator = UserId::new();
    let league_id = engine
        .create_league(
            "Doomed".into(),
            creator,
            6,
            8,
            ScoringConfig::default(),
            &mut rng,
        )
        .unwrap();
    engine
        .join_league_by_code(&lookup_code(&engine, league_id), UserId::new())
        .unwrap();

    engine.delete_league(league_id, creator).unwrap();

    let result = engine
        .store()
        .transaction(|tx| Ok::<_, EngineError>(tx.get_league(league_id)?));
    assert!(result.is_err());
}
