//! Deterministic circle-method round-robin matchup generation.
//! Idempotent — re-running never touches a week that already has
//! matchups.

use crate::error::EngineError;
use crate::ids::{LeagueId, MemberId};
use crate::model::Matchup;
use crate::store::{LockScope, Tx};

/// Generates any weeks not yet present, up to `season_length_weeks`.
pub fn generate_matchups(tx: &dyn Tx, league_id: LeagueId) -> Result<(), EngineError> {
    tx.advisory_lock(LockScope::Matchups(league_id))?;

    let league = tx.get_league(league_id)?;
    let mut members = tx.list_members(league_id)?;
    members.sort_by_key(|m| m.joined_at);

    let mut seats: Vec<Option<MemberId>> = members.iter().map(|m| Some(m.id)).collect();
    if seats.len() % 2 == 1 {
        seats.push(None); // bye sentinel
    }
    let n = seats.len();
    if n < 2 {
        return Ok(());
    }

    for week in 1..=league.season_length_weeks {
        if !tx.list_matchups(league_id, week)?.is_empty() {
            continue; // idempotence: week already generated
        }

        let rotation = rotate(&seats, week);
        let mut seen_this_week = Vec::new();

        for i in 0..n / 2 {
            let a = rotation[i];
            let b = rotation[n - 1 - i];
            let (Some(a), Some(b)) = (a, b) else {
                continue; // one side is the bye
            };

            seen_this_week.push(a);
            seen_this_week.push(b);

            let matchup = Matchup::new(league_id, week, a, b);
            tx.insert_matchup_if_absent(matchup)?;
        }

        let mut check = seen_this_week.clone();
        check.sort_by_key(|m| m.0);
        check.dedup();
        if check.len() != seen_this_week.len() {
            return Err(EngineError::Invariant(format!(
                "duplicate player generated in league {league_id} week {week}"
            )));
        }
    }

    Ok(())
}

/// Position 0 is fixed; the tail rotates one position right per
/// additional week, i.e. by `(week - 1)` total for week `week`.
fn rotate(seats: &[Option<MemberId>], week: u32) -> Vec<Option<MemberId>> {
    let mut tail = seats[1..].to_vec();
    if !tail.is_empty() {
        let shift = ((week - 1) as usize) % tail.len();
        tail.rotate_right(shift);
    }
    let mut rotation = vec![seats[0]];
    rotation.extend(tail);
    rotation
}
