use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{LeagueId, MemberId, UserId};

/// Cumulative win/loss/tie record. Counters are monotonically
/// non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

/// A league participant. `playoff_seed` and
/// `playoff_tiebreaker_points` are set once by `generate_playoffs` and
/// never recomputed afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub league: LeagueId,
    pub user: UserId,
    pub record: Record,
    pub total_points: f64,
    pub playoff_seed: Option<u8>,
    pub playoff_tiebreaker_points: Option<f64>,
    pub eliminated: bool,
    pub admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(league: LeagueId, user: UserId, admin: bool, joined_at: DateTime<Utc>) -> Self {
        Member {
            id: MemberId::new(),
            league,
            user,
            record: Record::default(),
            total_points: 0.0,
            playoff_seed: None,
            playoff_tiebreaker_points: None,
            eliminated: false,
            admin,
            joined_at,
        }
    }
}
