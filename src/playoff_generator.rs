//! Seeds the top 4 members by `(wins desc, total_points desc)` and
//! creates the two semifinal matches. `playoff_tiebreaker_points` is a
//! snapshot taken here and never recomputed — it exists solely to break
//! ties in later playoff scores.

use tracing::{info, instrument};

use crate::error::EngineError;
use crate::ids::LeagueId;
use crate::model::{Member, Playoff, PlayoffRound};
use crate::store::{LockScope, Tx};

/// Generates the semifinal round if the league has finished its regular
/// season and playoffs have not yet started. Idempotent: a second call
/// after playoffs have started is a no-op.
#[instrument(skip(tx))]
pub fn generate_playoffs(tx: &dyn Tx, league_id: LeagueId) -> Result<(), EngineError> {
    tx.advisory_lock(LockScope::Playoffs(league_id))?;

    let league = tx.get_league(league_id)?;
    if league.playoffs_started {
        return Ok(());
    }
    if league.current_week <= league.season_length_weeks {
        return Err(EngineError::Precondition(
            "regular season is not yet complete".into(),
        ));
    }

    let mut members = tx.list_members(league_id)?;
    if members.len() < 4 {
        return Err(EngineError::Precondition(
            "at least 4 members are required to generate playoffs".into(),
        ));
    }

    members.sort_by(|a, b| {
        b.record
            .wins
            .cmp(&a.record.wins)
            .then(b.total_points.total_cmp(&a.total_points))
    });

    let top4 = &members[..4];

    let started = tx.conditional_update_league(league_id, &|l| !l.playoffs_started, &|l| {
        l.playoffs_started = true;
    })?;
    if !started {
        return Ok(());
    }

    for (seed, member) in top4.iter().enumerate() {
        let seed = (seed + 1) as u8;
        let tiebreaker = member.total_points;
        tx.conditional_update_member(member.id, &|_| true, &move |m: &mut Member| {
            m.playoff_seed = Some(seed);
            m.playoff_tiebreaker_points = Some(tiebreaker);
        })?;
    }

    let playoff_week = league.season_length_weeks + 1;
    // Standard 1v4 / 2v3 semifinal seeding.
    let semi1 = Playoff::new(
        league_id,
        PlayoffRound::Semifinal,
        1,
        top4[0].id,
        top4[3].id,
        playoff_week,
    );
    let semi2 = Playoff::new(
        league_id,
        PlayoffRound::Semifinal,
        2,
        top4[1].id,
        top4[2].id,
        playoff_week,
    );
    tx.insert_playoff_if_absent(semi1)?;
    tx.insert_playoff_if_absent(semi2)?;

    for member in members.iter().skip(4) {
        tx.conditional_update_member(member.id, &|_| true, &|m| m.eliminated = true)?;
    }

    info!(league = %league_id, "generated playoff semifinals");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;
    use crate::model::League;
    use crate::scoring::ScoringConfig;
    use crate::store::memory::MemoryStore;
    use crate::store::Store;
    use chrono::{TimeZone, Utc};

    fn setup_completed_season(
        wins: &[u32],
        points: &[f64],
    ) -> (MemoryStore, LeagueId, Vec<crate::ids::MemberId>) {
        let store = MemoryStore::new();
        let league_id = store
            .transaction(|tx| -> Result<_, crate::store::StoreError> {
                let mut league = League::new(
                    "Test".into(),
                    "ABCDEF".into(),
                    UserId::new(),
                    3,
                    14,
                    ScoringConfig::default(),
                );
                league.current_week = 4; // past the 3-week season
                let id = league.id;
                tx.insert_league(league)?;
                Ok(id)
            })
            .unwrap();

        let member_ids = store
            .transaction(|tx| -> Result<_, crate::store::StoreError> {
                let mut ids = Vec::new();
                for (i, (&w, &p)) in wins.iter().zip(points.iter()).enumerate() {
                    let joined_at = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
                    let mut member = Member::new(league_id, UserId::new(), i == 0, joined_at);
                    member.record.wins = w;
                    member.total_points = p;
                    ids.push(member.id);
                    tx.insert_member_if_absent(member)?;
                }
                Ok(ids)
            })
            .unwrap();

        (store, league_id, member_ids)
    }

    #[test]
    fn top_four_by_wins_then_points_are_seeded() {
        let (store, league_id, members) = setup_completed_season(
            &[3, 2, 2, 1, 1, 0],
            &[300.0, 250.0, 200.0, 150.0, 100.0, 50.0],
        );

        store
            .transaction(|tx| generate_playoffs(tx, league_id))
            .unwrap();

        let seeded: Vec<_> = members
            .iter()
            .map(|id| store.transaction(|tx| tx.get_member(*id)).unwrap())
            .collect();

        assert_eq!(seeded[0].playoff_seed, Some(1));
        assert_eq!(seeded[1].playoff_seed, Some(2));
        assert_eq!(seeded[2].playoff_seed, Some(3));
        assert_eq!(seeded[3].playoff_seed, Some(4));
        assert_eq!(seeded[4].playoff_seed, None);
        assert!(seeded[4].eliminated);
        assert!(seeded[5].eliminated);

        let playoffs = store.transaction(|tx| tx.list_playoffs(league_id)).unwrap();
        assert_eq!(playoffs.len(), 2);
        let semi1 = playoffs
            .iter()
            .find(|p| p.match_number == 1)
            .expect("semifinal 1");
        assert_eq!(semi1.player1, members[0]);
        assert_eq!(semi1.player2, members[3]);
    }

    #[test]
    fn refuses_before_regular_season_completes() {
        let store = MemoryStore::new();
        let league_id = store
            .transaction(|tx| -> Result<_, crate::store::StoreError> {
                let league = League::new(
                    "Test".into(),
                    "ABCDEF".into(),
                    UserId::new(),
                    3,
                    14,
                    ScoringConfig::default(),
                );
                let id = league.id;
                tx.insert_league(league)?;
                Ok(id)
            })
            .unwrap();

        let result = store.transaction(|tx| generate_playoffs(tx, league_id));
        assert!(result.is_err());
    }

    #[test]
    fn second_call_after_playoffs_started_is_a_no_op() {
        let (store, league_id, _members) =
            setup_completed_season(&[3, 2, 2, 1], &[300.0, 250.0, 200.0, 150.0]);

        store
            .transaction(|tx| generate_playoffs(tx, league_id))
            .unwrap();
        let before = store
            .transaction(|tx| tx.list_playoffs(league_id))
            .unwrap()
            .len();

        store
            .transaction(|tx| generate_playoffs(tx, league_id))
            .unwrap();
        let after = store
            .transaction(|tx| tx.list_playoffs(league_id))
            .unwrap()
            .len();

        assert_eq!(before, after);
    }
}
