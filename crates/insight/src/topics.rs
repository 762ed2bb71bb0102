//! Topic catalogue and the context text built for each topic.

use std::collections::BTreeMap;
use std::fmt::Write;

use scope_analytics::profile::{champion, kda_line, or_na, percent};
use scope_analytics::stats;
use scope_analytics::trend::{streak_series, StreakSummary};
use scope_analytics::MatchWindow;
use scope_core::{AxisKey, AxisResult, MatchRecord, Role, UNAVAILABLE_DISPLAY};

const RECENT_MATCHES: usize = 5;
const SAMPLE_MATCHES: usize = 3;

/// Tempo cut-offs in seconds: under 25 minutes is short, over 35 is long.
const SHORT_GAME_SECS: u32 = 1500;
const LONG_GAME_SECS: u32 = 2100;

/// Games longer than this (seconds) count as clutch.
const CLUTCH_DURATION_SECS: u32 = 1800;
/// Games with a (kills + assists) / deaths ratio below this count as clutch.
const CLUTCH_KDA: f64 = 2.0;

/// Battle-history topics answered from raw match data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryTopic {
    BattlesFought,
    ClaimFallRatio,
    Streaks,
    ClutchBattles,
    RoleInfluence,
}

impl HistoryTopic {
    pub const ALL: [HistoryTopic; 5] = [
        HistoryTopic::BattlesFought,
        HistoryTopic::ClaimFallRatio,
        HistoryTopic::Streaks,
        HistoryTopic::ClutchBattles,
        HistoryTopic::RoleInfluence,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            HistoryTopic::BattlesFought => "Battles Fought",
            HistoryTopic::ClaimFallRatio => "Claim / Fall Ratio",
            HistoryTopic::Streaks => "Longest Claim & Fall Streaks",
            HistoryTopic::ClutchBattles => "Clutch Battles",
            HistoryTopic::RoleInfluence => "Role Influence",
        }
    }

    pub fn parse(topic: &str) -> Option<HistoryTopic> {
        let wanted = topic.trim();
        HistoryTopic::ALL
            .into_iter()
            .find(|t| t.title().eq_ignore_ascii_case(wanted))
    }
}

/// Playstyle topics, each answered from its own slice of match data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaystyleTopic {
    Aggression,
    Survivability,
    SkirmishBias,
    ObjectiveImpact,
    VisionDiscipline,
    Utility,
    TempoProfile,
}

impl PlaystyleTopic {
    pub const ALL: [PlaystyleTopic; 7] = [
        PlaystyleTopic::Aggression,
        PlaystyleTopic::Survivability,
        PlaystyleTopic::SkirmishBias,
        PlaystyleTopic::ObjectiveImpact,
        PlaystyleTopic::VisionDiscipline,
        PlaystyleTopic::Utility,
        PlaystyleTopic::TempoProfile,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            PlaystyleTopic::Aggression => "Aggression",
            PlaystyleTopic::Survivability => "Survivability",
            PlaystyleTopic::SkirmishBias => "Skirmish Bias",
            PlaystyleTopic::ObjectiveImpact => "Objective Impact",
            PlaystyleTopic::VisionDiscipline => "Vision Discipline",
            PlaystyleTopic::Utility => "Utility",
            PlaystyleTopic::TempoProfile => "Tempo Profile",
        }
    }

    pub fn parse(topic: &str) -> Option<PlaystyleTopic> {
        let wanted = topic.trim();
        PlaystyleTopic::ALL
            .into_iter()
            .find(|t| t.title().eq_ignore_ascii_case(wanted))
    }
}

/// What a single-topic request is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    Axis(AxisKey),
    History(HistoryTopic),
    Playstyle(PlaystyleTopic),
    /// Anything else; answered from the cached profile.
    AdHoc(String),
}

impl Topic {
    /// Exact history and playstyle titles win over axis keyword matching,
    /// so "Role Influence" and "Vision Discipline" never resolve to an axis.
    pub fn parse(raw: &str) -> Topic {
        if let Some(topic) = HistoryTopic::parse(raw) {
            return Topic::History(topic);
        }
        if let Some(topic) = PlaystyleTopic::parse(raw) {
            return Topic::Playstyle(topic);
        }
        match AxisKey::from_topic(raw) {
            Some(axis) => Topic::Axis(axis),
            None => Topic::AdHoc(raw.trim().to_string()),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Topic::Axis(axis) => axis.title(),
            Topic::History(topic) => topic.title(),
            Topic::Playstyle(topic) => topic.title(),
            Topic::AdHoc(raw) => raw,
        }
    }

    /// Directive sent with the context, over a window of `matches` games.
    pub fn query(&self, matches: usize) -> String {
        match self {
            Topic::Playstyle(topic) => playstyle_query(topic.title(), matches),
            _ => topic_query(self.title(), matches),
        }
    }

    /// Whether answering needs the raw match window.
    pub fn needs_matches(&self) -> bool {
        !matches!(self, Topic::AdHoc(_))
    }
}

fn mean_of<F>(matches: &[&MatchRecord], value: F) -> Option<f64>
where
    F: Fn(&MatchRecord) -> Option<f64>,
{
    let present: Vec<f64> = matches.iter().filter_map(|&m| value(m)).collect();
    stats::mean(&present)
}

/// Sum over the matches that carry the field; `N/A` when none do.
fn total_of<F>(window: &MatchWindow, value: F) -> String
where
    F: Fn(&MatchRecord) -> Option<u64>,
{
    let present: Vec<u64> = window.most_recent_first().iter().filter_map(value).collect();
    if present.is_empty() {
        UNAVAILABLE_DISPLAY.to_string()
    } else {
        present.iter().fold(0u64, |acc, v| acc.saturating_add(*v)).to_string()
    }
}

fn count_where<F>(window: &MatchWindow, pred: F) -> usize
where
    F: Fn(&MatchRecord) -> bool,
{
    window.most_recent_first().iter().filter(|m| pred(m)).count()
}

fn push_matches(out: &mut String, window: &MatchWindow, heading: &str, count: usize) {
    let _ = writeln!(out, "\n## {heading}:");
    for (i, m) in window.most_recent_first().iter().take(count).enumerate() {
        let result = if m.win { "Win" } else { "Loss" };
        let _ = writeln!(out, "{}. {} - {} - {}", i + 1, champion(m), result, kda_line(m));
    }
}

fn push_recent_matches(out: &mut String, window: &MatchWindow) {
    let heading = format!("Recent Matches (last {RECENT_MATCHES})");
    push_matches(out, window, &heading, RECENT_MATCHES);
}

fn is_clutch(m: &MatchRecord) -> bool {
    let long_game = m.game_duration.is_some_and(|d| d > CLUTCH_DURATION_SECS);
    let close_kda = match (m.takedowns(), m.deaths) {
        (Some(takedowns), Some(d)) if d > 0 => takedowns / f64::from(d) < CLUTCH_KDA,
        _ => false,
    };
    long_game || close_kda
}

/// Context for one battle-history topic.
pub fn history_context(topic: HistoryTopic, window: &MatchWindow) -> String {
    let matches = window.most_recent_first();
    let total = matches.len();
    let wins = window.wins();
    let losses = total - wins;

    let mut out = String::new();
    let _ = writeln!(out, "# Echoes of Battle: {}", topic.title());
    let _ = writeln!(out, "Analyzing last {total} matches for patterns and insights.\n");

    match topic {
        HistoryTopic::BattlesFought => {
            let champions: BTreeMap<&str, usize> =
                matches.iter().fold(BTreeMap::new(), |mut acc, m| {
                    *acc.entry(champion(m)).or_default() += 1;
                    acc
                });
            let _ = writeln!(out, "## Match Overview:");
            let _ = writeln!(out, "- Total Matches: {total}");
            let _ = writeln!(out, "- Record: {wins}W - {losses}L");
            let _ = writeln!(out, "- Win Rate: {:.1}%", percent(wins, total));
            let _ = writeln!(out, "\n## Champion Pool: {} unique champions", champions.len());
        }
        HistoryTopic::ClaimFallRatio => {
            let won: Vec<&MatchRecord> = matches.iter().filter(|m| m.win).collect();
            let lost: Vec<&MatchRecord> = matches.iter().filter(|m| !m.win).collect();
            let _ = writeln!(out, "## Win/Loss Analysis:");
            let _ = writeln!(out, "- Wins: {wins} ({:.1}%)", percent(wins, total));
            let _ = writeln!(out, "- Losses: {losses} ({:.1}%)", percent(losses, total));
            if !won.is_empty() {
                let ka = mean_of(&won, MatchRecord::takedowns);
                let _ = writeln!(out, "- Avg K+A in Wins: {}", or_na(ka, 1));
            }
            if !lost.is_empty() {
                let deaths = mean_of(&lost, |m| m.deaths.map(f64::from));
                let _ = writeln!(out, "- Avg Deaths in Losses: {}", or_na(deaths, 1));
            }
        }
        HistoryTopic::Streaks => {
            let summary = StreakSummary::from_series(&streak_series(&window.outcomes()));
            let _ = writeln!(out, "## Streak Analysis:");
            let _ = writeln!(out, "- Longest Win Streak: {} games", summary.peak_win);
            let _ = writeln!(out, "- Longest Loss Streak: {} games", summary.peak_loss);
        }
        HistoryTopic::ClutchBattles => {
            let clutch: Vec<&MatchRecord> = matches.iter().filter(|m| is_clutch(m)).collect();
            let clutch_wins = clutch.iter().filter(|m| m.win).count();
            let _ = writeln!(out, "## Clutch Game Analysis:");
            let _ = writeln!(out, "- Clutch Games: {}/{total}", clutch.len());
            if !clutch.is_empty() {
                let _ = writeln!(
                    out,
                    "- Clutch Win Rate: {:.1}%",
                    percent(clutch_wins, clutch.len())
                );
            }
        }
        HistoryTopic::RoleInfluence => {
            let mut roles: BTreeMap<Role, (usize, usize)> = BTreeMap::new();
            for m in matches {
                let entry = roles.entry(m.team_position.unwrap_or(Role::Unknown)).or_default();
                entry.0 += usize::from(m.win);
                entry.1 += 1;
            }
            let _ = writeln!(out, "## Role Performance:");
            for (role, (won, played)) in &roles {
                let _ = writeln!(
                    out,
                    "- {role}: {won}W-{}L ({:.1}% WR)",
                    played - won,
                    percent(*won, *played)
                );
            }
        }
    }

    push_recent_matches(&mut out, window);
    out
}

/// Context for one playstyle topic.
pub fn playstyle_context(topic: PlaystyleTopic, window: &MatchWindow) -> String {
    let total = window.len();
    let per_game = |value: fn(&MatchRecord) -> Option<u32>| {
        or_na(window.field(|m| value(m).map(f64::from)).mean(), 1)
    };

    let mut out = String::new();
    let _ = writeln!(out, "# Patterns Beneath Chaos: {}", topic.title());
    let _ = writeln!(
        out,
        "Analyzing {total} matches to identify {} patterns.\n",
        topic.title().to_lowercase()
    );

    match topic {
        PlaystyleTopic::Aggression => {
            let first_bloods = count_where(window, |m| m.first_blood_kill == Some(true));
            let _ = writeln!(out, "## Aggression Metrics:");
            let _ = writeln!(out, "- Avg Kills/Game: {}", per_game(|m| m.kills));
            let _ = writeln!(out, "- First Bloods: {first_bloods}/{total}");
            let _ = writeln!(
                out,
                "- Total Takedowns: {}",
                total_of(window, |m| Some(u64::from(m.kills?) + u64::from(m.assists?)))
            );
        }
        PlaystyleTopic::Survivability => {
            let low = count_where(window, |m| m.deaths.is_some_and(|d| d <= 3));
            let perfect = count_where(window, |m| m.deaths == Some(0));
            let _ = writeln!(out, "## Survivability Metrics:");
            let _ = writeln!(out, "- Avg Deaths/Game: {}", per_game(|m| m.deaths));
            let _ = writeln!(out, "- Low Death Games (<=3): {low}/{total}");
            let _ = writeln!(out, "- Perfect Games (0 deaths): {perfect}");
        }
        PlaystyleTopic::SkirmishBias => {
            let kills: Vec<f64> = window.field(|m| m.kills.map(f64::from)).present();
            let assists: Vec<f64> = window.field(|m| m.assists.map(f64::from)).present();
            let _ = writeln!(out, "## Skirmish Analysis:");
            let _ = writeln!(
                out,
                "- Total Kills: {}",
                total_of(window, |m| m.kills.map(u64::from))
            );
            let _ = writeln!(
                out,
                "- Total Assists: {}",
                total_of(window, |m| m.assists.map(u64::from))
            );
            let kill_sum: f64 = kills.iter().sum();
            if kill_sum > 0.0 && !assists.is_empty() {
                let ratio = assists.iter().sum::<f64>() / kill_sum;
                let _ = writeln!(out, "- Assist/Kill Ratio: {ratio:.2}");
            }
        }
        PlaystyleTopic::ObjectiveImpact => {
            let _ = writeln!(out, "## Objective Metrics:");
            let _ = writeln!(
                out,
                "- Tower Takedowns: {} (avg {}/game)",
                total_of(window, |m| m.turret_takedowns.map(u64::from)),
                per_game(|m| m.turret_takedowns)
            );
            let _ = writeln!(
                out,
                "- Inhibitor Takedowns: {}",
                total_of(window, |m| m.inhibitor_takedowns.map(u64::from))
            );
        }
        PlaystyleTopic::VisionDiscipline => {
            let _ = writeln!(out, "## Vision Metrics:");
            let _ = writeln!(out, "- Avg Vision Score: {}", per_game(|m| m.vision_score));
            let _ = writeln!(
                out,
                "- Total Wards Placed: {}",
                total_of(window, |m| m.wards_placed.map(u64::from))
            );
            let _ = writeln!(out, "- Avg Wards/Game: {}", per_game(|m| m.wards_placed));
        }
        PlaystyleTopic::Utility => {
            let _ = writeln!(out, "## Utility Metrics:");
            let _ = writeln!(
                out,
                "- Total Team Healing: {}",
                total_of(window, |m| m.total_heals_on_teammates)
            );
            let _ = writeln!(
                out,
                "- Damage Mitigated: {}",
                total_of(window, |m| m.damage_self_mitigated)
            );
        }
        PlaystyleTopic::TempoProfile => {
            let minutes = or_na(window.field(MatchRecord::minutes).mean(), 1);
            let short =
                count_where(window, |m| m.game_duration.is_some_and(|d| d < SHORT_GAME_SECS));
            let long =
                count_where(window, |m| m.game_duration.is_some_and(|d| d > LONG_GAME_SECS));
            let _ = writeln!(out, "## Tempo Metrics:");
            let _ = writeln!(out, "- Avg Game Duration: {minutes} minutes");
            let _ = writeln!(out, "- Short Games (<25min): {short}/{total}");
            let _ = writeln!(out, "- Long Games (>35min): {long}/{total}");
        }
    }

    push_matches(&mut out, window, "Sample Matches", SAMPLE_MATCHES);
    out
}

/// Context for one scored axis. Carries `Score: N/100` so score-aware
/// fallbacks can band it.
pub fn axis_context(result: &AxisResult, window: &MatchWindow) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Faultlines: {}", result.title);
    let _ = writeln!(
        out,
        "Deep analysis of {} matches to identify strengths and weaknesses.",
        window.len()
    );
    let _ = writeln!(out, "{}\n", result.description);
    let _ = writeln!(out, "Score: {}/100 ({})", result.score, result.score_label);
    let _ = writeln!(out, "\n## Metrics:");
    for metric in &result.metrics {
        let _ = writeln!(
            out,
            "- {}: {} ({})",
            metric.label, metric.display_value, metric.comparison_text
        );
    }

    let trend: Vec<f64> = result.trend.values().collect();
    if !trend.is_empty() {
        let shown: Vec<String> = trend.iter().map(|v| format!("{v:.2}")).collect();
        let _ = writeln!(out, "\n## Trend ({}, oldest first): {}", result.trend.metric, shown.join(", "));
    }

    push_recent_matches(&mut out, window);
    out
}

/// Short context used for per-axis narratives in a full report.
pub fn narrative_context(result: &AxisResult) -> String {
    let metrics: Vec<String> = result
        .metrics
        .iter()
        .filter(|m| m.is_available())
        .map(|m| format!("{} {}", m.label, m.display_value))
        .collect();
    format!(
        "{} (Score: {}/100, {}). {}",
        result.title,
        result.score,
        result.score_label,
        metrics.join("; ")
    )
}

/// Directive for a single-topic deep dive.
pub fn topic_query(title: &str, matches: usize) -> String {
    format!(
        "Analyze the player's {title} from their last {matches} matches.\n\n\
         Provide a comprehensive analysis that includes:\n\
         1. Current performance summary with specific numbers\n\
         2. Key patterns and trends identified\n\
         3. Notable strengths to leverage\n\
         4. Areas for improvement with specific examples\n\
         5. 2-3 actionable recommendations\n\n\
         Be specific, data-driven, and provide concrete examples from their matches."
    )
}

/// Directive for a playstyle deep dive.
pub fn playstyle_query(title: &str, matches: usize) -> String {
    format!(
        "Analyze the player's {title} playstyle axis from their last {matches} matches.\n\n\
         Provide a detailed analysis covering:\n\
         1. Current playstyle profile with metrics\n\
         2. How they compare to typical players in this axis\n\
         3. Situational patterns (when they excel vs struggle)\n\
         4. Playstyle strengths to maintain\n\
         5. Adjustments that could improve their effectiveness\n\
         6. Specific in-game scenarios where they should adapt\n\n\
         Use concrete numbers and examples from their match data."
    )
}

pub const NARRATIVE_QUERY: &str =
    "Write a 15-word tactical insight for this player metric. Be specific and actionable.";
