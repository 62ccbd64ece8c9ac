use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{LeagueId, UserId, WeeklyScoreId};
use crate::model::Metrics;

/// A member's raw metrics for one league-week. Upsert key is
/// `(league, user, week)`. `total_points` is derived from the league's
/// effective scoring config at write time — never recomputed later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub id: WeeklyScoreId,
    pub league: LeagueId,
    pub user: UserId,
    pub week: u32,
    pub metrics: Metrics,
    pub total_points: f64,
    pub last_synced_at: DateTime<Utc>,
}
