use scope_core::{AxisKey, AxisResult, MatchRecord, TrendSeries};

use super::{build_axis, AxisScorer, Normalization, SubMetric, Unit};
use crate::extract::MatchWindow;
use crate::stats;
use crate::trend;

/// Gap between best and worst games, measured by spread rather than average.
pub struct ComposureScorer {
    window: usize,
}

impl ComposureScorer {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
        }
    }
}

/// Coefficient of variation, where a zero-mean sample counts as no spread.
fn spread(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(stats::coefficient_of_variation(values).unwrap_or(0.0))
}

impl AxisScorer for ComposureScorer {
    fn key(&self) -> AxisKey {
        AxisKey::Composure
    }

    fn score(&self, window: &MatchWindow) -> AxisResult {
        let kda = window.field(MatchRecord::kda);
        let present = kda.present();

        let (consistency, trend) = if window.len() >= self.window {
            let series = trend::consistency_series(kda.values(), self.window);
            let rolled: Vec<f64> = series.values().collect();
            let value = stats::mean(&rolled)
                .or_else(|| (!present.is_empty()).then(|| stats::consistency(&present)));
            (value, series)
        } else {
            // short history: one window over everything we have
            let value = (!present.is_empty()).then(|| stats::consistency(&present));
            (value, TrendSeries::empty("consistency"))
        };

        let deaths = window.field(|m| m.deaths.map(f64::from)).present();
        let gold = window.field(|m| m.gold_earned.map(f64::from)).present();

        let subs = vec![
            SubMetric::new(
                "kda_consistency",
                "KDA Consistency",
                Unit::Percent,
                0.40,
                Normalization::Ceiling(1.0),
                consistency,
            ),
            SubMetric::new(
                "kda_stdev",
                "KDA Standard Deviation",
                Unit::Ratio,
                0.25,
                Normalization::Inverted(5.0),
                stats::stddev(&present),
            ),
            SubMetric::new(
                "death_spread",
                "Death Variation",
                Unit::Percent,
                0.20,
                Normalization::Spread,
                spread(&deaths),
            ),
            SubMetric::new(
                "gold_deviation",
                "Gold Variation",
                Unit::Percent,
                0.15,
                Normalization::Spread,
                spread(&gold),
            ),
        ];

        build_axis(self.key(), subs, trend)
    }
}
