//! Pure scoring function: metrics + config -> points.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::Metrics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub points_per_1000_steps: f64,
    pub points_per_sleep_hour: f64,
    pub points_per_100_active_cal: f64,
    pub points_per_workout_minute: f64,
    pub points_per_stand_hour: f64,
    pub points_per_mile: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            points_per_1000_steps: 1.0,
            points_per_sleep_hour: 2.0,
            points_per_100_active_cal: 5.0,
            points_per_workout_minute: 0.2,
            points_per_stand_hour: 5.0,
            points_per_mile: 3.0,
        }
    }
}

impl ScoringConfig {
    /// Reads a JSON-shaped map of the six recognized keys.
    /// Extra keys are ignored; missing keys fall back to defaults. The
    /// legacy `points_per_workout` key is read as
    /// `points_per_workout_minute` when the modern key is absent.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> ScoringConfig {
        let defaults = ScoringConfig::default();
        let f = |key: &str, default: f64| -> f64 {
            map.get(key).and_then(|v| v.as_f64()).unwrap_or(default)
        };

        let workout_minute = if map.contains_key("points_per_workout_minute") {
            f(
                "points_per_workout_minute",
                defaults.points_per_workout_minute,
            )
        } else {
            f("points_per_workout", defaults.points_per_workout_minute)
        };

        ScoringConfig {
            points_per_1000_steps: f("points_per_1000_steps", defaults.points_per_1000_steps),
            points_per_sleep_hour: f("points_per_sleep_hour", defaults.points_per_sleep_hour),
            points_per_100_active_cal: f(
                "points_per_100_active_cal",
                defaults.points_per_100_active_cal,
            ),
            points_per_workout_minute: workout_minute,
            points_per_stand_hour: f("points_per_stand_hour", defaults.points_per_stand_hour),
            points_per_mile: f("points_per_mile", defaults.points_per_mile),
        }
    }

    /// Emits only the modern key set.
    pub fn to_json_map(&self) -> HashMap<String, f64> {
        HashMap::from([
            (
                "points_per_1000_steps".to_string(),
                self.points_per_1000_steps,
            ),
            (
                "points_per_sleep_hour".to_string(),
                self.points_per_sleep_hour,
            ),
            (
                "points_per_100_active_cal".to_string(),
                self.points_per_100_active_cal,
            ),
            (
                "points_per_workout_minute".to_string(),
                self.points_per_workout_minute,
            ),
            (
                "points_per_stand_hour".to_string(),
                self.points_per_stand_hour,
            ),
            ("points_per_mile".to_string(), self.points_per_mile),
        ])
    }
}

/// Computes total points for a week's metrics under the given config.
/// Input is sanitized first; the result is rounded to 2 decimals.
pub fn score(metrics: &Metrics, config: &ScoringConfig) -> f64 {
    let m = metrics.sanitized();
    let points = (m.steps / 1000.0) * config.points_per_1000_steps
        + m.sleep_hours * config.points_per_sleep_hour
        + (m.calories / 100.0) * config.points_per_100_active_cal
        + m.workout_minutes * config.points_per_workout_minute
        + m.stand_hours * config.points_per_stand_hour
        + m.distance_miles * config.points_per_mile;

    (points * 100.0).round() / 100.0
}
