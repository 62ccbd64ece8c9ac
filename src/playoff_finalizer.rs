//! Records a playoff match result, eliminates the loser, and — once
//! both semifinals are in — creates the final idempotently via
//! insert-if-absent. Crowns the champion when the final is recorded.

use tracing::{info, instrument};

use crate::error::EngineError;
use crate::ids::{LeagueId, MemberId, PlayoffId};
use crate::model::{Playoff, PlayoffRound};
use crate::store::{LockScope, Tx};

/// Records `player1_score`/`player2_score` for one playoff match.
/// Idempotent: finalizing an already-finalized match is a no-op.
#[instrument(skip(tx))]
pub fn finalize_playoff_match(
    tx: &dyn Tx,
    league_id: LeagueId,
    playoff_id: PlayoffId,
    player1_score: f64,
    player2_score: f64,
) -> Result<(), EngineError> {
    tx.advisory_lock(LockScope::PlayoffMatch(playoff_id))?;

    let playoff = tx.get_playoff(playoff_id)?;
    if playoff.league != league_id {
        return Err(EngineError::NotFound(format!(
            "playoff {playoff_id} does not belong to league {league_id}"
        )));
    }
    if playoff.finalized {
        return Ok(());
    }

    let winner = decide_winner(tx, &playoff, player1_score, player2_score)?;
    let loser = if winner == playoff.player1 {
        playoff.player2
    } else {
        playoff.player1
    };

    tx.write_playoff(playoff_id, &|p| {
        p.player1_score = player1_score;
        p.player2_score = player2_score;
        p.winner = Some(winner);
        p.finalized = true;
    })?;

    tx.conditional_update_member(loser, &|m| !m.eliminated, &|m| m.eliminated = true)?;

    match playoff.round {
        PlayoffRound::Semifinal => {
            maybe_create_final(
                tx,
                league_id,
                playoff.match_number,
                winner,
                playoff.week + 1,
            )?;
        }
        PlayoffRound::Final => {
            tx.conditional_update_league(league_id, &|l| l.champion.is_none(), &move |l| {
                l.champion = Some(winner)
            })?;
            info!(league = %league_id, champion = %winner, "crowned champion");
        }
    }

    Ok(())
}

/// Scores decide the winner; a tie falls back to the frozen
/// `playoff_tiebreaker_points` snapshot, then to the lower (better) seed.
fn decide_winner(
    tx: &dyn Tx,
    playoff: &Playoff,
    player1_score: f64,
    player2_score: f64,
) -> Result<MemberId, EngineError> {
    if player1_score > player2_score {
        return Ok(playoff.player1);
    }
    if player2_score > player1_score {
        return Ok(playoff.player2);
    }

    let p1 = tx.get_member(playoff.player1)?;
    let p2 = tx.get_member(playoff.player2)?;
    let t1 = p1.playoff_tiebreaker_points.unwrap_or(0.0);
    let t2 = p2.playoff_tiebreaker_points.unwrap_or(0.0);
    if t1 > t2 {
        return Ok(playoff.player1);
    }
    if t2 > t1 {
        return Ok(playoff.player2);
    }

    let s1 = p1.playoff_seed.unwrap_or(u8::MAX);
    let s2 = p2.playoff_seed.unwrap_or(u8::MAX);
    if s1 <= s2 {
        Ok(playoff.player1)
    } else {
        Ok(playoff.player2)
    }
}

/// Once both semifinals have a winner, creates the final. Idempotent via
/// `insert_playoff_if_absent` on `(league, Final, 1)`. `week` is the
/// final's own week (the semifinal's week plus one).
fn maybe_create_final(
    tx: &dyn Tx,
    league_id: LeagueId,
    just_finalized_match: u8,
    just_finalized_winner: MemberId,
    week: u32,
) -> Result<(), EngineError> {
    let other_match = if just_finalized_match == 1 { 2 } else { 1 };
    let playoffs = tx.list_playoffs(league_id)?;
    let other = playoffs
        .iter()
        .find(|p| p.round == PlayoffRound::Semifinal && p.match_number == other_match);

    let Some(other) = other else {
        return Ok(());
    };
    let Some(other_winner) = other.winner else {
        return Ok(());
    };

    let (finalist1, finalist2) = if just_finalized_match == 1 {
        (just_finalized_winner, other_winner)
    } else {
        (other_winner, just_finalized_winner)
    };

    let final_match = Playoff::new(
        league_id,
        PlayoffRound::Final,
        1,
        finalist1,
        finalist2,
        week,
    );
    tx.insert_playoff_if_absent(final_match)?;
    Ok(())
}
