//! The eight axis scorers.
//!
//! Every scorer is a pure function of a [`MatchWindow`]: it derives its
//! sub-metrics, normalizes each against a fixed ceiling, and folds them into
//! a weighted 0-100 score. Sub-metrics whose backing fields are absent stay
//! `None` and drop out of the weighting.

mod combat;
mod composure;
mod economy;
mod momentum;
mod objective;
mod role;
mod survival;
mod vision;

pub use combat::CombatScorer;
pub use composure::ComposureScorer;
pub use economy::EconomyScorer;
pub use momentum::MomentumScorer;
pub use objective::ObjectiveScorer;
pub use role::RoleScorer;
pub use survival::SurvivalScorer;
pub use vision::VisionScorer;

use tracing::debug;

use scope_core::config::AnalysisConfig;
use scope_core::{AxisKey, AxisResult, Metric, ScoreLabel, TrendSeries, UNAVAILABLE_DISPLAY};

use crate::cohort;
use crate::extract::{DataUnavailable, MatchWindow};
use crate::stats::clamp_unit;

/// Scores one axis from a player's match window.
pub trait AxisScorer: Send + Sync {
    fn key(&self) -> AxisKey;

    /// Must be deterministic: identical windows give identical results.
    fn score(&self, window: &MatchWindow) -> AxisResult;
}

/// All eight scorers, in [`AxisKey::ALL`] order.
pub fn scorers(config: &AnalysisConfig) -> Vec<Box<dyn AxisScorer>> {
    vec![
        Box::new(CombatScorer),
        Box::new(ObjectiveScorer),
        Box::new(SurvivalScorer),
        Box::new(VisionScorer),
        Box::new(EconomyScorer),
        Box::new(RoleScorer),
        Box::new(MomentumScorer),
        Box::new(ComposureScorer::new(config.consistency_window)),
    ]
}

pub fn score_all(scorers: &[Box<dyn AxisScorer>], window: &MatchWindow) -> Vec<AxisResult> {
    scorers
        .iter()
        .map(|scorer| {
            let result = scorer.score(window);
            debug!(axis = %result.axis_key, score = result.score, "axis scored");
            result
        })
        .collect()
}

/// Zero-score defaults for every axis, each explaining why nothing was scored.
pub fn unavailable(scorers: &[Box<dyn AxisScorer>], reason: &DataUnavailable) -> Vec<AxisResult> {
    let empty = MatchWindow::default();
    scorers
        .iter()
        .map(|scorer| {
            let mut result = scorer.score(&empty);
            result.narrative = format!(
                "Not enough match history to assess {}: {reason}.",
                result.title
            );
            result
        })
        .collect()
}

/// How a raw value maps onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Normalization {
    /// Higher is better, saturating at the ceiling.
    Ceiling(f64),
    /// Lower is better; zero is perfect, the ceiling scores nothing.
    Inverted(f64),
    /// Value is a coefficient of variation; `max(0, 1 - cv)`.
    Spread,
    /// Average loss-run length; one-game runs are ideal, five or more score nothing.
    LossRun,
}

impl Normalization {
    pub(crate) fn apply(self, value: f64) -> f64 {
        match self {
            Normalization::Ceiling(ceiling) => clamp_unit(value / ceiling),
            Normalization::Inverted(ceiling) => 1.0 - clamp_unit(value / ceiling),
            Normalization::Spread => (1.0 - value).max(0.0).min(1.0),
            Normalization::LossRun => 1.0 - clamp_unit((value - 1.0) / 4.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unit {
    Ratio,
    /// Fraction rendered as a percentage.
    Percent,
    /// Fraction difference rendered in percentage points.
    PercentagePoints,
    PerMinute,
    PerGame,
    Games,
    Amount,
    /// Damage per gold, shown as thousands per thousand gold.
    PerThousandGold,
}

impl Unit {
    fn id(self) -> &'static str {
        match self {
            Unit::Ratio => "ratio",
            Unit::Percent => "percent",
            Unit::PercentagePoints => "pp",
            Unit::PerMinute => "per_min",
            Unit::PerGame => "per_game",
            Unit::Games => "games",
            Unit::Amount => "amount",
            Unit::PerThousandGold => "k_per_1k_gold",
        }
    }

    fn display(self, value: f64) -> String {
        match self {
            Unit::Ratio => format!("{value:.2}"),
            Unit::Percent => format!("{:.0}%", value * 100.0),
            Unit::PercentagePoints => format!("{:.0}pp", value * 100.0),
            Unit::PerMinute => format!("{value:.1}/min"),
            Unit::PerGame => format!("{value:.1}"),
            Unit::Games => format!("{value:.0}"),
            Unit::Amount => format!("{value:.0}"),
            Unit::PerThousandGold => format!("{value:.2}k"),
        }
    }
}

/// A sub-metric before it is rendered into a [`Metric`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SubMetric {
    pub id: &'static str,
    pub label: &'static str,
    pub unit: Unit,
    pub weight: f64,
    pub normalization: Normalization,
    pub value: Option<f64>,
}

impl SubMetric {
    pub(crate) fn new(
        id: &'static str,
        label: &'static str,
        unit: Unit,
        weight: f64,
        normalization: Normalization,
        value: Option<f64>,
    ) -> Self {
        Self {
            id,
            label,
            unit,
            weight,
            normalization,
            value: value.filter(|v| v.is_finite()),
        }
    }

    fn percent(&self) -> Option<f64> {
        self.value.map(|v| self.normalization.apply(v))
    }

    fn into_metric(self) -> Metric {
        let percent = self.percent();
        let (comparison_text, direction) = cohort::compare_metric(self.id, self.value);
        Metric {
            id: self.id.to_string(),
            label: self.label.to_string(),
            unit: self.unit.id().to_string(),
            value: self.value,
            display_value: self
                .value
                .map_or_else(|| UNAVAILABLE_DISPLAY.to_string(), |v| self.unit.display(v)),
            comparison_text,
            direction,
            percent,
        }
    }
}

/// `round(100 * Σwp / Σw)` over the available sub-metrics; 0 when none are.
pub(crate) fn weighted_score(subs: &[SubMetric]) -> u8 {
    let (weighted, total) = subs
        .iter()
        .filter_map(|s| s.percent().map(|p| (s.weight * p, s.weight)))
        .fold((0.0, 0.0), |(acc_wp, acc_w), (wp, w)| (acc_wp + wp, acc_w + w));
    if total <= 0.0 {
        return 0;
    }
    (100.0 * weighted / total).round().clamp(0.0, 100.0) as u8
}

pub(crate) fn build_axis(key: AxisKey, subs: Vec<SubMetric>, trend: TrendSeries) -> AxisResult {
    let score = weighted_score(&subs);
    let score_label = ScoreLabel::from_score(score);
    let available = subs.iter().any(|s| s.value.is_some());
    AxisResult {
        axis_key: key,
        title: key.title().to_string(),
        description: key.description().to_string(),
        score,
        score_label,
        narrative: default_narrative(key, score_label, available),
        metrics: subs.into_iter().map(SubMetric::into_metric).collect(),
        trend,
    }
}

/// Rule-based narrative used until a generated one replaces it.
pub fn default_narrative(key: AxisKey, label: ScoreLabel, available: bool) -> String {
    if !available {
        return format!("No tracked stats are available for {}.", key.title());
    }
    let advice = match label {
        ScoreLabel::Excellent => {
            "exceptional performance; maintain consistency while exploring advanced tactics"
        }
        ScoreLabel::Strong => "strong fundamentals with room to refine high-pressure situations",
        ScoreLabel::Average => "a solid baseline; focus on consistency and decision-making",
        ScoreLabel::BelowAverage => "below the usual standard; review recurring patterns",
        ScoreLabel::Poor => "a key growth opportunity; practice the fundamentals here",
    };
    format!("{} rated {label}: {advice}.", key.title())
}

/// Ratio of two per-match counts where a zero denominator with a present
/// numerator is a genuine zero.
pub(crate) fn ratio_or_zero(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    Some(if d == 0.0 { 0.0 } else { n / d })
}
