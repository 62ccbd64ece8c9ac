use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{LeagueId, MemberId, UserId};
use crate::scoring::ScoringConfig;

/// A weekly fitness competition. `frozen_config` is `None`
/// until `start_date` is set, at which point it is a snapshot of
/// `editable_config` as of that moment and never changes again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub join_code: String,
    pub creator: UserId,
    pub season_length_weeks: u32,
    pub current_week: u32,
    pub start_date: Option<NaiveDate>,
    pub active: bool,
    pub playoffs_started: bool,
    pub champion: Option<MemberId>,
    pub max_players: u32,
    pub editable_config: ScoringConfig,
    pub frozen_config: Option<ScoringConfig>,
    pub last_week_finalized_at: Option<DateTime<Utc>>,
}

impl League {
    pub fn new(
        name: String,
        join_code: String,
        creator: UserId,
        season_length_weeks: u32,
        max_players: u32,
        editable_config: ScoringConfig,
    ) -> Self {
        League {
            id: LeagueId::new(),
            name,
            join_code,
            creator,
            season_length_weeks,
            current_week: 1,
            start_date: None,
            active: true,
            playoffs_started: false,
            champion: None,
            max_players,
            editable_config,
            frozen_config: None,
            last_week_finalized_at: None,
        }
    }

    /// The config that governs scoring right now: frozen if the league has started,
    /// else editable.
    pub fn effective_config(&self) -> ScoringConfig {
        self.frozen_config.unwrap_or(self.editable_config)
    }

    pub fn has_started(&self) -> bool {
        self.start_date.is_some()
    }

    /// The calendar date a given regular-season week begins, computed
    /// purely from `start_date + (week-1)*7` — never from wall-clock
    /// day-of-week arithmetic.
    pub fn week_start_date(&self, week: u32) -> Option<NaiveDate> {
        self.start_date
            .map(|d| d + Duration::days(7 * (week as i64 - 1)))
    }
}

/// Regular-season lengths the Engine accepts.
pub const ALLOWED_SEASON_LENGTHS: [u32; 4] = [6, 8, 10, 12];
/// Roster caps the Engine accepts.
pub const ALLOWED_MAX_PLAYERS: [u32; 6] = [4, 6, 8, 10, 12, 14];
