use scope_core::{AxisKey, AxisResult, MatchRecord};

use super::{build_axis, ratio_or_zero, AxisScorer, Normalization, SubMetric, Unit};
use crate::extract::MatchWindow;
use crate::trend;

/// Impact per engagement: KDA, kill participation, own-kill share and damage output.
pub struct CombatScorer;

fn kill_participation(m: &MatchRecord) -> Option<f64> {
    ratio_or_zero(m.takedowns(), m.team_kills.map(f64::from))
}

/// Share of the player's takedowns that were their own kills.
fn own_kill_share(m: &MatchRecord) -> Option<f64> {
    ratio_or_zero(m.kills.map(f64::from), m.takedowns())
}

fn damage_per_min(m: &MatchRecord) -> Option<f64> {
    m.per_minute(m.total_damage_dealt_to_champions.map(|d| d as f64))
}

impl AxisScorer for CombatScorer {
    fn key(&self) -> AxisKey {
        AxisKey::CombatEfficiency
    }

    fn score(&self, window: &MatchWindow) -> AxisResult {
        let kda = window.field(MatchRecord::kda);

        let subs = vec![
            SubMetric::new(
                "kda_ratio",
                "KDA Ratio",
                Unit::Ratio,
                0.40,
                Normalization::Ceiling(5.0),
                kda.mean(),
            ),
            SubMetric::new(
                "kill_participation",
                "Kill Participation",
                Unit::Percent,
                0.30,
                Normalization::Ceiling(1.0),
                window.field(kill_participation).mean(),
            ),
            SubMetric::new(
                "solo_kill_share",
                "Own Kill Share",
                Unit::Percent,
                0.15,
                Normalization::Ceiling(0.5),
                window.field(own_kill_share).mean(),
            ),
            SubMetric::new(
                "damage_per_min",
                "Damage per Minute",
                Unit::PerMinute,
                0.15,
                Normalization::Ceiling(1000.0),
                window.field(damage_per_min).mean(),
            ),
        ];

        build_axis(self.key(), subs, trend::value_series("kda", kda.values()))
    }
}
