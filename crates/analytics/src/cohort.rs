//! Fixed-baseline cohort comparison.
//!
//! Baselines are constants per metric id, so the same value always yields the
//! same comparison text. There is no live population behind them.

use scope_core::Direction;

/// Comparisons within this band of the baseline are neutral.
pub const NEUTRAL_BAND: f64 = 0.05;

const BASELINES: &[(&str, f64)] = &[
    // combat
    ("kda_ratio", 2.8),
    ("kill_participation", 0.5),
    ("solo_kill_share", 0.35),
    ("damage_per_min", 650.0),
    // objectives
    ("dragon_takedowns", 0.9),
    ("baron_takedowns", 0.35),
    ("turret_takedowns", 1.8),
    // survival
    ("avg_deaths", 5.5),
    ("low_death_rate", 0.4),
    ("damage_taken_per_death", 4500.0),
    // vision
    ("vision_per_min", 1.0),
    ("wards_placed_per_min", 0.45),
    ("wards_cleared", 2.0),
    // economy
    ("gold_per_min", 400.0),
    ("gold_spent_ratio", 0.9),
    ("damage_per_gold", 1.3),
    ("cs_per_min", 6.0),
    // role
    ("primary_role_share", 0.6),
    ("role_winrate_spread", 0.15),
    ("role_kda_delta", 1.0),
    // momentum
    ("peak_win_streak", 3.0),
    ("win_rate", 0.5),
    ("avg_loss_streak", 1.8),
    // composure
    ("kda_consistency", 0.55),
    ("kda_stdev", 1.8),
    ("death_spread", 0.45),
    ("gold_deviation", 0.2),
];

pub fn baseline_for(metric_id: &str) -> Option<f64> {
    BASELINES
        .iter()
        .find(|(id, _)| *id == metric_id)
        .map(|(_, value)| *value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// `(value - baseline) / baseline`.
    pub ratio: f64,
    pub direction: Direction,
    pub text: String,
}

/// Compare a value against a (non-zero) baseline.
pub fn compare(value: f64, baseline: f64) -> Comparison {
    let ratio = (value - baseline) / baseline;
    let direction = if ratio > NEUTRAL_BAND {
        Direction::Positive
    } else if ratio < -NEUTRAL_BAND {
        Direction::Negative
    } else {
        Direction::Neutral
    };
    let pct = (ratio * 100.0).round() as i64;
    Comparison {
        ratio,
        direction,
        text: format!("{pct:+}% vs cohort"),
    }
}

/// Comparison text and direction for a sub-metric, covering missing data.
pub fn compare_metric(metric_id: &str, value: Option<f64>) -> (String, Direction) {
    let Some(value) = value else {
        return ("No data".to_string(), Direction::Neutral);
    };
    match baseline_for(metric_id) {
        Some(baseline) if baseline != 0.0 => {
            let c = compare(value, baseline);
            (c.text, c.direction)
        }
        _ => ("No cohort baseline".to_string(), Direction::Neutral),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baselines_are_unique_and_nonzero() {
        for (i, (id, value)) in BASELINES.iter().enumerate() {
            assert!(*value > 0.0, "{id} baseline must be positive");
            assert!(
                BASELINES[i + 1..].iter().all(|(other, _)| other != id),
                "duplicate baseline {id}"
            );
        }
    }

    #[test]
    fn direction_thresholds() {
        assert_eq!(compare(3.2, 2.8).direction, Direction::Positive);
        assert_eq!(compare(2.9, 2.8).direction, Direction::Neutral);
        assert_eq!(compare(2.0, 2.8).direction, Direction::Negative);
        assert_eq!(compare(0.97, 1.0).direction, Direction::Neutral);
    }

    #[test]
    fn comparison_text_is_signed_percent() {
        assert_eq!(compare(1.12, 1.0).text, "+12% vs cohort");
        assert_eq!(compare(0.75, 1.0).text, "-25% vs cohort");
        assert_eq!(compare(1.0, 1.0).text, "+0% vs cohort");
    }

    #[test]
    fn comparison_is_reproducible() {
        let a = compare_metric("kda_ratio", Some(3.4));
        let b = compare_metric("kda_ratio", Some(3.4));
        assert_eq!(a, b);
    }

    #[test]
    fn missing_values_and_unknown_ids() {
        assert_eq!(
            compare_metric("kda_ratio", None),
            ("No data".to_string(), Direction::Neutral)
        );
        assert_eq!(compare_metric("made_up", Some(1.0)).0, "No cohort baseline");
    }
}
