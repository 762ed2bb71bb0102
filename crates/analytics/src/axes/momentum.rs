use scope_core::{AxisKey, AxisResult};

use super::{build_axis, AxisScorer, Normalization, SubMetric, Unit};
use crate::extract::MatchWindow;
use crate::trend::{self, StreakSummary};

/// Win streaks, win rate and how quickly losing runs are broken.
pub struct MomentumScorer;

impl AxisScorer for MomentumScorer {
    fn key(&self) -> AxisKey {
        AxisKey::Momentum
    }

    fn score(&self, window: &MatchWindow) -> AxisResult {
        let streaks = trend::streak_series(&window.outcomes());
        let summary = StreakSummary::from_series(&streaks);
        let played = !window.is_empty();

        let win_rate = played.then(|| window.wins() as f64 / window.len() as f64);
        // a window without losses has no losing runs to recover from
        let avg_loss_streak = played.then(|| summary.mean_loss_run().unwrap_or(0.0));

        let subs = vec![
            SubMetric::new(
                "peak_win_streak",
                "Longest Win Streak",
                Unit::Games,
                0.40,
                Normalization::Ceiling(5.0),
                played.then_some(summary.peak_win as f64),
            ),
            SubMetric::new(
                "win_rate",
                "Win Rate",
                Unit::Percent,
                0.35,
                Normalization::Ceiling(1.0),
                win_rate,
            ),
            SubMetric::new(
                "avg_loss_streak",
                "Average Losing Run",
                Unit::PerGame,
                0.25,
                Normalization::LossRun,
                avg_loss_streak,
            ),
        ];

        build_axis(self.key(), subs, streaks)
    }
}
