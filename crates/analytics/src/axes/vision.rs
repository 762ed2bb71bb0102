use scope_core::{AxisKey, AxisResult, MatchRecord};

use super::{build_axis, AxisScorer, Normalization, SubMetric, Unit};
use crate::extract::MatchWindow;
use crate::trend;

pub struct VisionScorer;

fn vision_per_min(m: &MatchRecord) -> Option<f64> {
    m.per_minute(m.vision_score.map(f64::from))
}

impl AxisScorer for VisionScorer {
    fn key(&self) -> AxisKey {
        AxisKey::VisionAwareness
    }

    fn score(&self, window: &MatchWindow) -> AxisResult {
        let vision = window.field(vision_per_min);

        let subs = vec![
            SubMetric::new(
                "vision_per_min",
                "Vision Score per Minute",
                Unit::PerMinute,
                0.50,
                Normalization::Ceiling(2.0),
                vision.mean(),
            ),
            SubMetric::new(
                "wards_placed_per_min",
                "Wards Placed per Minute",
                Unit::PerMinute,
                0.25,
                Normalization::Ceiling(1.2),
                window
                    .field(|m| m.per_minute(m.wards_placed.map(f64::from)))
                    .mean(),
            ),
            SubMetric::new(
                "wards_cleared",
                "Wards Cleared",
                Unit::PerGame,
                0.25,
                Normalization::Ceiling(5.0),
                window.field(|m| m.wards_killed.map(f64::from)).mean(),
            ),
        ];

        build_axis(
            self.key(),
            subs,
            trend::value_series("vision_per_min", vision.values()),
        )
    }
}
