use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{LeagueId, MatchupId, MemberId};

/// A single regular-season pairing. `points_added` is the
/// latch: it transitions `false -> true` exactly once, and the snapshot
/// fields freeze at that transition regardless of later score writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub id: MatchupId,
    pub league: LeagueId,
    pub week: u32,
    pub player1: MemberId,
    pub player2: MemberId,
    pub player1_score: f64,
    pub player2_score: f64,
    pub winner: Option<MemberId>,
    pub tie: bool,
    pub finalized: bool,
    pub finalized_at: Option<DateTime<Utc>>,
    pub points_added: bool,
    pub player1_points_snapshot: Option<f64>,
    pub player2_points_snapshot: Option<f64>,
}

impl Matchup {
    pub fn new(league: LeagueId, week: u32, player1: MemberId, player2: MemberId) -> Self {
        Matchup {
            id: MatchupId::new(),
            league,
            week,
            player1,
            player2,
            player1_score: 0.0,
            player2_score: 0.0,
            winner: None,
            tie: false,
            finalized: false,
            finalized_at: None,
            points_added: false,
            player1_points_snapshot: None,
            player2_points_snapshot: None,
        }
    }

    /// Whether `member` participated in this matchup.
    pub fn involves(&self, member: MemberId) -> bool {
        self.player1 == member || self.player2 == member
    }

    /// Unordered-pair key used to enforce the composite uniqueness
    /// constraint `(league, week, {p1,p2})`.
    pub fn pair_key(&self) -> (MemberId, MemberId) {
        if self.player1.0 <= self.player2.0 {
            (self.player1, self.player2)
        } else {
            (self.player2, self.player1)
        }
    }
}
