use scope_core::{AxisKey, AxisResult, MatchRecord};

use super::{build_axis, AxisScorer, Normalization, SubMetric, Unit};
use crate::extract::MatchWindow;
use crate::trend;

/// Games at or below this many deaths count as disciplined.
const LOW_DEATH_THRESHOLD: u32 = 3;

/// Death avoidance and how much punishment is absorbed per death.
pub struct SurvivalScorer;

fn damage_taken_per_death(m: &MatchRecord) -> Option<f64> {
    Some(m.total_damage_taken? as f64 / m.deaths?.max(1) as f64)
}

impl AxisScorer for SurvivalScorer {
    fn key(&self) -> AxisKey {
        AxisKey::SurvivalDiscipline
    }

    fn score(&self, window: &MatchWindow) -> AxisResult {
        let low_death_games = window.field(|m| {
            m.deaths
                .map(|d| if d <= LOW_DEATH_THRESHOLD { 1.0 } else { 0.0 })
        });

        let subs = vec![
            SubMetric::new(
                "avg_deaths",
                "Average Deaths",
                Unit::PerGame,
                0.50,
                Normalization::Inverted(10.0),
                window.field(|m| m.deaths.map(f64::from)).mean(),
            ),
            SubMetric::new(
                "low_death_rate",
                "Low-Death Games",
                Unit::Percent,
                0.30,
                Normalization::Ceiling(1.0),
                low_death_games.mean(),
            ),
            SubMetric::new(
                "damage_taken_per_death",
                "Damage Taken per Death",
                Unit::Amount,
                0.20,
                Normalization::Ceiling(8000.0),
                window.field(damage_taken_per_death).mean(),
            ),
        ];

        let deaths: Vec<Option<u32>> = window.chronological().map(|m| m.deaths).collect();
        build_axis(self.key(), subs, trend::death_series(&deaths))
    }
}
