use scope_core::{AxisKey, AxisResult, MatchRecord};

use super::{build_axis, AxisScorer, Normalization, SubMetric, Unit};
use crate::extract::MatchWindow;
use crate::trend;

/// Average dragon, baron and turret takedowns per game.
pub struct ObjectiveScorer;

/// Takedowns across whichever objective counters the match carries.
fn objective_takedowns(m: &MatchRecord) -> Option<f64> {
    let counts = [m.dragon_takedowns, m.baron_takedowns, m.turret_takedowns];
    if counts.iter().all(Option::is_none) {
        return None;
    }
    Some(counts.iter().flatten().map(|&c| c as f64).sum())
}

impl AxisScorer for ObjectiveScorer {
    fn key(&self) -> AxisKey {
        AxisKey::ObjectiveReliability
    }

    fn score(&self, window: &MatchWindow) -> AxisResult {
        let subs = vec![
            SubMetric::new(
                "dragon_takedowns",
                "Dragon Takedowns",
                Unit::PerGame,
                0.35,
                Normalization::Ceiling(1.5),
                window.field(|m| m.dragon_takedowns.map(f64::from)).mean(),
            ),
            SubMetric::new(
                "baron_takedowns",
                "Baron Takedowns",
                Unit::PerGame,
                0.35,
                Normalization::Ceiling(0.8),
                window.field(|m| m.baron_takedowns.map(f64::from)).mean(),
            ),
            SubMetric::new(
                "turret_takedowns",
                "Turret Takedowns",
                Unit::PerGame,
                0.30,
                Normalization::Ceiling(3.0),
                window.field(|m| m.turret_takedowns.map(f64::from)).mean(),
            ),
        ];

        let per_match = window.field(objective_takedowns);
        build_axis(
            self.key(),
            subs,
            trend::value_series("objective_takedowns", per_match.values()),
        )
    }
}
