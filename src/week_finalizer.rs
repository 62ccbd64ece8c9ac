//! Idempotent, concurrency-safe weekly standings update. The latch step
//! strictly precedes the standings mutation; `current_week` advances
//! strictly last and only once, guarded by an explicit `points_added`
//! latch so a matchup's points fold into a member's total at most once.

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::error::EngineError;
use crate::ids::LeagueId;
use crate::store::{LockScope, Tx};

/// Finalizes one league-week. A no-op (returns `Ok(())`) if any guard
/// fails or if there is nothing left to finalize — this is the
/// idempotent, concurrency-safe success path, not an error.
#[instrument(skip(tx))]
pub fn finalize_week(tx: &dyn Tx, league_id: LeagueId, week: u32) -> Result<(), EngineError> {
    tx.advisory_lock(LockScope::FinalizeWeek(league_id, week))?;

    let league = tx.get_league(league_id)?;
    if league.playoffs_started {
        debug!("guard failed: playoffs already started");
        return Ok(());
    }
    if league.current_week != week {
        debug!(
            current_week = league.current_week,
            "guard failed: week mismatch"
        );
        return Ok(());
    }
    if week < 1 || week > league.season_length_weeks {
        debug!("guard failed: week out of range");
        return Ok(());
    }

    let matchups = tx.list_matchups(league_id, week)?;
    let mut finalized_count = 0u32;

    for matchup in matchups {
        if matchup.finalized {
            continue;
        }

        let s1 = tx
            .get_weekly_score(league_id, tx.get_member(matchup.player1)?.user, week)?
            .map(|s| s.total_points)
            .unwrap_or(0.0);
        let s2 = tx
            .get_weekly_score(league_id, tx.get_member(matchup.player2)?.user, week)?
            .map(|s| s.total_points)
            .unwrap_or(0.0);

        let (winner, tie) = if s1 > s2 {
            (Some(matchup.player1), false)
        } else if s2 > s1 {
            (Some(matchup.player2), false)
        } else {
            (None, true)
        };

        // Latch step: must precede the standings mutation. If another
        // actor already flipped this latch, skip — do not double-add.
        let latched = tx.conditional_update_matchup(matchup.id, &|m| !m.points_added, &|m| {
            m.points_added = true;
            m.player1_points_snapshot = Some(s1);
            m.player2_points_snapshot = Some(s2);
        })?;
        if !latched {
            debug!(matchup = %matchup.id, "latch already taken, skipping");
            continue;
        }

        let now = Utc::now();
        tx.write_matchup(matchup.id, &|m| {
            m.player1_score = s1;
            m.player2_score = s2;
            m.winner = winner;
            m.tie = tie;
            m.finalized = true;
            m.finalized_at = Some(now);
        })?;

        tx.conditional_update_member(matchup.player1, &|_| true, &|m| {
            apply_outcome(m, winner == Some(matchup.player1), tie, winner.is_some());
            m.total_points += s1;
        })?;
        tx.conditional_update_member(matchup.player2, &|_| true, &|m| {
            apply_outcome(m, winner == Some(matchup.player2), tie, winner.is_some());
            m.total_points += s2;
        })?;

        finalized_count += 1;
    }

    if finalized_count > 0 {
        let now = Utc::now();
        let advanced =
            tx.conditional_update_league(league_id, &move |l| l.current_week == week, &move |l| {
                l.current_week = week + 1;
                l.last_week_finalized_at = Some(now);
            })?;
        if advanced {
            info!(league = %league_id, week, finalized_count, "advanced to next week");
        }
    }

    Ok(())
}

fn apply_outcome(member: &mut crate::model::Member, won: bool, tie: bool, decided: bool) {
    if tie {
        member.record.ties += 1;
    } else if won {
        member.record.wins += 1;
    } else if decided {
        member.record.losses += 1;
    }
}
