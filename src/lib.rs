pub mod error;
pub mod ids;
pub mod join_code;
pub mod model;
pub mod scoring;
pub mod store;

pub mod playoff_finalizer;
pub mod playoff_generator;
pub mod schedule;
pub mod week_finalizer;

pub mod engine;

pub use engine::Engine;
pub use error::EngineError;
pub use ids::{LeagueId, MatchupId, MemberId, PlayoffId, UserId, WeeklyScoreId};
pub use model::*;
pub use scoring::ScoringConfig;
