use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Outcome;

/// The eight performance dimensions a player is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKey {
    CombatEfficiency,
    ObjectiveReliability,
    SurvivalDiscipline,
    VisionAwareness,
    EconomyUtilization,
    RoleStability,
    Momentum,
    Composure,
}

impl AxisKey {
    pub const ALL: [AxisKey; 8] = [
        AxisKey::CombatEfficiency,
        AxisKey::ObjectiveReliability,
        AxisKey::SurvivalDiscipline,
        AxisKey::VisionAwareness,
        AxisKey::EconomyUtilization,
        AxisKey::RoleStability,
        AxisKey::Momentum,
        AxisKey::Composure,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            AxisKey::CombatEfficiency => "combat_efficiency",
            AxisKey::ObjectiveReliability => "objective_reliability",
            AxisKey::SurvivalDiscipline => "survival_discipline",
            AxisKey::VisionAwareness => "vision_awareness",
            AxisKey::EconomyUtilization => "economy_utilization",
            AxisKey::RoleStability => "role_stability",
            AxisKey::Momentum => "momentum",
            AxisKey::Composure => "composure",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AxisKey::CombatEfficiency => "Combat Efficiency Index",
            AxisKey::ObjectiveReliability => "Objective Reliability Index",
            AxisKey::SurvivalDiscipline => "Survival Discipline Index",
            AxisKey::VisionAwareness => "Vision & Awareness Index",
            AxisKey::EconomyUtilization => "Economy Utilization Index",
            AxisKey::RoleStability => "Role Stability Index",
            AxisKey::Momentum => "Momentum Index",
            AxisKey::Composure => "Composure Index",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AxisKey::CombatEfficiency => "Offensive efficiency: how much impact per engagement.",
            AxisKey::ObjectiveReliability => "How consistently major objectives get secured.",
            AxisKey::SurvivalDiscipline => "Avoiding unnecessary deaths and adapting defensively.",
            AxisKey::VisionAwareness => "Vision setup and map control awareness.",
            AxisKey::EconomyUtilization => "Converting gold into meaningful pressure.",
            AxisKey::RoleStability => "Performance stability across primary and secondary roles.",
            AxisKey::Momentum => "Streak patterns: momentum and recovery.",
            AxisKey::Composure => "Consistency between best and worst matches.",
        }
    }

    /// Resolve a free-text topic ("Combat Efficiency", "vision & awareness index", ...).
    pub fn from_topic(topic: &str) -> Option<AxisKey> {
        let lowered = topic.to_lowercase();
        let matches = |needles: &[&str]| needles.iter().any(|n| lowered.contains(n));
        AxisKey::ALL.into_iter().find(|axis| match axis {
            AxisKey::CombatEfficiency => matches(&["combat efficiency", "combat_efficiency"]),
            AxisKey::ObjectiveReliability => {
                matches(&["objective reliability", "objective_reliability"])
            }
            AxisKey::SurvivalDiscipline => matches(&["survival discipline", "survival_discipline"]),
            AxisKey::VisionAwareness => matches(&["vision", "awareness"]),
            AxisKey::EconomyUtilization => matches(&["economy"]),
            AxisKey::RoleStability => matches(&["role stability", "role_stability"]),
            AxisKey::Momentum => matches(&["momentum"]),
            AxisKey::Composure => matches(&["composure"]),
        })
    }
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Discrete band for a 0-100 axis score. Ordering follows the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreLabel {
    Poor,
    #[serde(rename = "Below Average")]
    BelowAverage,
    Average,
    Strong,
    Excellent,
}

impl ScoreLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=34 => ScoreLabel::Poor,
            35..=49 => ScoreLabel::BelowAverage,
            50..=64 => ScoreLabel::Average,
            65..=79 => ScoreLabel::Strong,
            _ => ScoreLabel::Excellent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Poor => "Poor",
            ScoreLabel::BelowAverage => "Below Average",
            ScoreLabel::Average => "Average",
            ScoreLabel::Strong => "Strong",
            ScoreLabel::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative position against the cohort baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Neutral,
    Negative,
}

/// Display text used for any metric whose backing field is absent.
pub const UNAVAILABLE_DISPLAY: &str = "N/A";

/// One sub-metric of an axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub label: String,
    pub unit: String,
    /// `None` when the backing field is missing from every match.
    pub value: Option<f64>,
    pub display_value: String,
    pub comparison_text: String,
    pub direction: Direction,
    /// Normalized contribution in `[0, 1]`; `None` when `value` is `None`.
    pub percent: Option<f64>,
}

impl Metric {
    pub fn is_available(&self) -> bool {
        self.value.is_some()
    }
}

/// Death-count bucket for a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathBucket {
    /// 0-3 deaths.
    Low,
    /// 4-6 deaths.
    Mid,
    /// 7 or more.
    High,
}

impl DeathBucket {
    pub fn for_deaths(deaths: u32) -> Self {
        match deaths {
            0..=3 => DeathBucket::Low,
            4..=6 => DeathBucket::Mid,
            _ => DeathBucket::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Chronological position (0 = oldest match in the window).
    pub match_index: usize,
    pub value: Option<f64>,
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_type: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<DeathBucket>,
}

impl TrendPoint {
    pub fn new(match_index: usize, value: Option<f64>) -> Self {
        Self {
            match_index,
            value,
            delta: None,
            streak_length: None,
            streak_type: None,
            bucket: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    /// What `value` measures ("kda", "consistency", "streak", ...).
    pub metric: String,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn empty(metric: &str) -> Self {
        Self {
            metric: metric.to_string(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Defined values, in order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().filter_map(|p| p.value)
    }
}

/// Scored result for one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisResult {
    pub axis_key: AxisKey,
    pub title: String,
    pub description: String,
    /// Always within `[0, 100]`.
    pub score: u8,
    pub score_label: ScoreLabel,
    pub narrative: String,
    pub metrics: Vec<Metric>,
    pub trend: TrendSeries,
}

impl AxisResult {
    pub fn metric(&self, id: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.id == id)
    }
}
