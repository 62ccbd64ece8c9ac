use serde::{Deserialize, Serialize};

use crate::ids::{LeagueId, MemberId, PlayoffId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayoffRound {
    Semifinal = 1,
    Final = 2,
}

/// A playoff match. Round 2 has only `match_number == 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playoff {
    pub id: PlayoffId,
    pub league: LeagueId,
    pub round: PlayoffRound,
    pub match_number: u8,
    pub player1: MemberId,
    pub player2: MemberId,
    pub player1_score: f64,
    pub player2_score: f64,
    pub winner: Option<MemberId>,
    pub finalized: bool,
    pub week: u32,
}

impl Playoff {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        league: LeagueId,
        round: PlayoffRound,
        match_number: u8,
        player1: MemberId,
        player2: MemberId,
        week: u32,
    ) -> Self {
        Playoff {
            id: PlayoffId::new(),
            league,
            round,
            match_number,
            player1,
            player2,
            player1_score: 0.0,
            player2_score: 0.0,
            winner: None,
            finalized: false,
            week,
        }
    }
}
