//! Canonical entities: `League`, `Member`, `Matchup`,
//! `WeeklyScore`, `Playoff`, plus the single canonical `Metrics` shape
//! that replaces the source's duck-typed score payloads.

pub mod league;
pub mod matchup;
pub mod member;
pub mod metrics;
pub mod playoff;
pub mod weekly_score;

pub use league::League;
pub use matchup::Matchup;
pub use member::{Member, Record};
pub use metrics::Metrics;
pub use playoff::{Playoff, PlayoffRound};
pub use weekly_score::WeeklyScore;
