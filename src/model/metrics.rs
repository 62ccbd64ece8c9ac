use serde::{Deserialize, Serialize};

/// Raw weekly health metrics for one member. This is the single canonical
/// shape the engine accepts — the source's duck-typed payloads
/// (`sleep_hours` vs `sleepHours`) are normalized to this at the Engine
/// boundary and never modeled internally as anything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub steps: f64,
    pub sleep_hours: f64,
    pub calories: f64,
    pub workout_minutes: f64,
    pub stand_hours: f64,
    pub distance_miles: f64,
}

/// Per-dimension caps applied to a single week's input.
const MAX_STEPS: f64 = 1_400_000.0;
const MAX_SLEEP_HOURS: f64 = 168.0;
const MAX_CALORIES: f64 = 70_000.0;
const MAX_WORKOUT_MINUTES: f64 = 10_080.0;
const MAX_STAND_HOURS: f64 = 112.0;
const MAX_DISTANCE_MILES: f64 = 1_050.0;

impl Metrics {
    /// Clamps non-finite/negative values to 0 and caps each dimension.
    pub fn sanitized(&self) -> Metrics {
        Metrics {
            steps: clamp(self.steps, MAX_STEPS),
            sleep_hours: clamp(self.sleep_hours, MAX_SLEEP_HOURS),
            calories: clamp(self.calories, MAX_CALORIES),
            workout_minutes: clamp(self.workout_minutes, MAX_WORKOUT_MINUTES),
            stand_hours: clamp(self.stand_hours, MAX_STAND_HOURS),
            distance_miles: clamp(self.distance_miles, MAX_DISTANCE_MILES),
        }
    }
}

fn clamp(value: f64, max: f64) -> f64 {
    if !value.is_finite() || value < 0.0 {
        0.0
    } else if value > max {
        max
    } else {
        value
    }
}
