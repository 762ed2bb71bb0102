use scope_core::{AxisKey, AxisResult, MatchRecord};

use super::{build_axis, ratio_or_zero, AxisScorer, Normalization, SubMetric, Unit};
use crate::extract::MatchWindow;
use crate::trend;

/// Income, spending and how much damage each piece of gold buys.
pub struct EconomyScorer;

fn gold_per_min(m: &MatchRecord) -> Option<f64> {
    m.per_minute(m.gold_earned.map(f64::from))
}

fn gold_spent_ratio(m: &MatchRecord) -> Option<f64> {
    ratio_or_zero(m.gold_spent.map(f64::from), m.gold_earned.map(f64::from))
}

fn damage_per_gold(m: &MatchRecord) -> Option<f64> {
    ratio_or_zero(
        m.total_damage_dealt_to_champions.map(|d| d as f64),
        m.gold_earned.map(f64::from),
    )
}

fn cs_per_min(m: &MatchRecord) -> Option<f64> {
    m.per_minute(m.total_minions_killed.map(f64::from))
}

impl AxisScorer for EconomyScorer {
    fn key(&self) -> AxisKey {
        AxisKey::EconomyUtilization
    }

    fn score(&self, window: &MatchWindow) -> AxisResult {
        let gpm = window.field(gold_per_min);

        let subs = vec![
            SubMetric::new(
                "gold_per_min",
                "Gold per Minute",
                Unit::PerMinute,
                0.40,
                Normalization::Ceiling(500.0),
                gpm.mean(),
            ),
            SubMetric::new(
                "gold_spent_ratio",
                "Gold Spent",
                Unit::Percent,
                0.30,
                Normalization::Ceiling(1.0),
                window.field(gold_spent_ratio).mean(),
            ),
            SubMetric::new(
                "damage_per_gold",
                "Damage per 1k Gold",
                Unit::PerThousandGold,
                0.15,
                Normalization::Ceiling(2.0),
                window.field(damage_per_gold).mean(),
            ),
            SubMetric::new(
                "cs_per_min",
                "CS per Minute",
                Unit::PerMinute,
                0.15,
                Normalization::Ceiling(10.0),
                window.field(cs_per_min).mean(),
            ),
        ];

        build_axis(
            self.key(),
            subs,
            trend::value_series("gold_per_min", gpm.values()),
        )
    }
}
