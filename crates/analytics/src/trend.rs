//! Rolling statistics over a chronological match sequence.

use serde::Serialize;

use scope_core::{DeathBucket, Outcome, TrendPoint, TrendSeries};

use crate::stats;

/// Fill `delta[i] = value[i] - value[i-1]` wherever both neighbours are defined.
pub fn apply_deltas(points: &mut [TrendPoint]) {
    let mut previous: Option<f64> = None;
    for point in points.iter_mut() {
        point.delta = match (point.value, previous) {
            (Some(current), Some(prev)) => Some(current - prev),
            _ => None,
        };
        previous = point.value;
    }
}

/// One point per match carrying the raw value and its delta.
pub fn value_series(metric: &str, values: &[Option<f64>]) -> TrendSeries {
    let mut points: Vec<TrendPoint> = values
        .iter()
        .enumerate()
        .map(|(i, v)| TrendPoint::new(i, *v))
        .collect();
    apply_deltas(&mut points);
    TrendSeries {
        metric: metric.to_string(),
        points,
    }
}

/// Per-match deaths with a low/mid/high bucket.
pub fn death_series(deaths: &[Option<u32>]) -> TrendSeries {
    let values: Vec<Option<f64>> = deaths.iter().map(|d| d.map(f64::from)).collect();
    let mut series = value_series("deaths", &values);
    for (point, deaths) in series.points.iter_mut().zip(deaths) {
        point.bucket = deaths.map(DeathBucket::for_deaths);
    }
    series
}

/// Win/loss streaks. The run resets to 1 exactly when the outcome flips.
///
/// `value` is the signed run length (positive for wins, negative for losses).
pub fn streak_series(outcomes: &[Outcome]) -> TrendSeries {
    let mut points = Vec::with_capacity(outcomes.len());
    let mut run: Option<(Outcome, u32)> = None;

    for (i, &outcome) in outcomes.iter().enumerate() {
        let length = match run {
            Some((kind, len)) if kind == outcome => len + 1,
            _ => 1,
        };
        run = Some((outcome, length));

        let signed = match outcome {
            Outcome::Win => length as f64,
            Outcome::Loss => -(length as f64),
        };
        let mut point = TrendPoint::new(i, Some(signed));
        point.streak_length = Some(length);
        point.streak_type = Some(outcome);
        points.push(point);
    }

    apply_deltas(&mut points);
    TrendSeries {
        metric: "streak".to_string(),
        points,
    }
}

/// Rolling `max(0, 1 - cv)` over the trailing `window` matches ending at each index.
///
/// Indices before the first full window are omitted. A window containing a
/// match without the metric yields a null point.
pub fn consistency_series(values: &[Option<f64>], window: usize) -> TrendSeries {
    let window = window.max(1);
    let mut points = Vec::new();

    if values.len() >= window {
        for end in (window - 1)..values.len() {
            let slice = &values[end + 1 - window..=end];
            let full: Option<Vec<f64>> = slice.iter().copied().collect();
            let value = full.map(|v| stats::consistency(&v));
            points.push(TrendPoint::new(end, value));
        }
    }

    apply_deltas(&mut points);
    TrendSeries {
        metric: "consistency".to_string(),
        points,
    }
}

/// Longest runs and the loss-run lengths derived from a streak series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub peak_win: u32,
    pub peak_loss: u32,
    /// Signed length of the run still in progress at the newest match.
    pub current: i64,
    /// Length of every completed or ongoing loss run, oldest first.
    pub loss_runs: Vec<u32>,
}

impl StreakSummary {
    pub fn from_series(series: &TrendSeries) -> Self {
        let mut summary = StreakSummary::default();
        let mut points = series.points.iter().peekable();

        while let Some(point) = points.next() {
            let (Some(length), Some(kind)) = (point.streak_length, point.streak_type) else {
                continue;
            };
            match kind {
                Outcome::Win => summary.peak_win = summary.peak_win.max(length),
                Outcome::Loss => summary.peak_loss = summary.peak_loss.max(length),
            }

            let run_ends = points
                .peek()
                .map_or(true, |next| next.streak_length == Some(1));
            if run_ends && kind == Outcome::Loss {
                summary.loss_runs.push(length);
            }
            if points.peek().is_none() {
                summary.current = point.value.map_or(0, |v| v as i64);
            }
        }
        summary
    }

    pub fn mean_loss_run(&self) -> Option<f64> {
        let runs: Vec<f64> = self.loss_runs.iter().map(|&r| r as f64).collect();
        stats::mean(&runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Outcome::{Loss as L, Win as W};

    #[test]
    fn streaks_reset_on_every_flip() {
        let series = streak_series(&[W, W, L, W, W, W, L]);
        let lengths: Vec<u32> = series.points.iter().filter_map(|p| p.streak_length).collect();
        let kinds: Vec<Outcome> = series.points.iter().filter_map(|p| p.streak_type).collect();
        assert_eq!(lengths, vec![1, 2, 1, 1, 2, 3, 1]);
        assert_eq!(kinds, vec![W, W, L, W, W, W, L]);
        assert_eq!(series.len(), 7);
    }

    #[test]
    fn streak_summary() {
        let series = streak_series(&[L, L, W, L, W, W, W, L]);
        let summary = StreakSummary::from_series(&series);
        assert_eq!(summary.peak_win, 3);
        assert_eq!(summary.peak_loss, 2);
        assert_eq!(summary.loss_runs, vec![2, 1, 1]);
        assert_eq!(summary.current, -1);
        assert!((summary.mean_loss_run().unwrap() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn no_losses_means_no_loss_runs() {
        let summary = StreakSummary::from_series(&streak_series(&[W, W]));
        assert!(summary.loss_runs.is_empty());
        assert_eq!(summary.mean_loss_run(), None);
        assert_eq!(summary.current, 2);
    }

    #[test]
    fn identical_kda_is_fully_consistent() {
        let values = vec![Some(3.0); 10];
        let series = consistency_series(&values, 5);
        assert_eq!(series.len(), 6);
        assert_eq!(series.points[0].match_index, 4);
        assert!(series.points.iter().all(|p| p.value == Some(1.0)));
        assert!(series.points.iter().skip(1).all(|p| p.delta == Some(0.0)));
    }

    #[test]
    fn varying_kda_is_less_than_fully_consistent() {
        let values: Vec<Option<f64>> = [2.0, 4.0, 3.0, 6.0, 1.0, 3.0, 5.0]
            .iter()
            .map(|v| Some(*v))
            .collect();
        let series = consistency_series(&values, 5);
        assert_eq!(series.len(), 3);
        assert!(series.values().all(|c| c < 1.0 && c >= 0.0));
    }

    #[test]
    fn short_history_has_no_eligible_points() {
        assert!(consistency_series(&[Some(1.0); 4], 5).is_empty());
    }

    #[test]
    fn zero_mean_window_scores_zero() {
        let series = consistency_series(&[Some(0.0); 5], 5);
        assert_eq!(series.points[0].value, Some(0.0));
    }

    #[test]
    fn gaps_null_the_window_and_its_deltas() {
        let values = vec![Some(1.0), None, Some(1.0), Some(1.0)];
        let series = consistency_series(&values, 2);
        let got: Vec<Option<f64>> = series.points.iter().map(|p| p.value).collect();
        assert_eq!(got, vec![None, None, Some(1.0)]);
        assert!(series.points.iter().all(|p| p.delta.is_none()));
    }

    #[test]
    fn deltas_only_between_defined_neighbours() {
        let series = value_series("kda", &[Some(2.0), Some(3.5), None, Some(1.0)]);
        let deltas: Vec<Option<f64>> = series.points.iter().map(|p| p.delta).collect();
        assert_eq!(deltas, vec![None, Some(1.5), None, None]);
    }

    #[test]
    fn death_series_buckets() {
        let series = death_series(&[Some(2), None, Some(9)]);
        let buckets: Vec<Option<DeathBucket>> = series.points.iter().map(|p| p.bucket).collect();
        assert_eq!(
            buckets,
            vec![Some(DeathBucket::Low), None, Some(DeathBucket::High)]
        );
    }
}
