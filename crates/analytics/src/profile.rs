//! Plain-text gameplay profile used as background context for generation.

use std::collections::BTreeMap;

use scope_core::{MatchRecord, Role, UNAVAILABLE_DISPLAY};

use crate::extract::MatchWindow;

const TOP_CHAMPIONS: usize = 5;
const RECENT_FORM: usize = 5;
const RECENT_MATCHES: usize = 3;

/// Fixed-precision number, or `N/A` when absent.
pub fn or_na(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(
        || UNAVAILABLE_DISPLAY.to_string(),
        |v| format!("{v:.decimals$}"),
    )
}

/// `part` as a percentage of `whole`; 0 for an empty whole.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `k/d/a` with `?` for any missing count.
pub fn kda_line(m: &MatchRecord) -> String {
    let show = |v: Option<u32>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
    format!("{}/{}/{}", show(m.kills), show(m.deaths), show(m.assists))
}

pub fn champion(m: &MatchRecord) -> &str {
    m.champion_name.as_deref().unwrap_or("Unknown")
}

#[derive(Default)]
struct WinTally {
    games: usize,
    wins: usize,
}

impl WinTally {
    fn add(&mut self, win: bool) {
        self.games += 1;
        self.wins += usize::from(win);
    }

    fn rate(&self) -> f64 {
        percent(self.wins, self.games)
    }
}

/// Most games first, ties broken by key.
fn by_games<K: Ord + Clone>(tallies: &BTreeMap<K, WinTally>) -> Vec<(K, &WinTally)> {
    let mut sorted: Vec<(K, &WinTally)> = tallies.iter().map(|(k, t)| (k.clone(), t)).collect();
    sorted.sort_by(|a, b| b.1.games.cmp(&a.1.games).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Summarize a match window: record, KDA, champion pool, roles, playstyle
/// indicators, recent form and the last few games.
pub fn build_profile_summary(window: &MatchWindow) -> String {
    let matches = window.most_recent_first();
    if matches.is_empty() {
        return "No recent match history available for this player.".to_string();
    }

    let n = matches.len();
    let wins = window.wins();
    let mut lines = vec![
        format!("# Player Gameplay Profile (Last {n} Matches)"),
        String::new(),
        "## Overall Performance".to_string(),
        format!(
            "- Record: {wins}W - {}L ({:.1}% Win Rate)",
            n - wins,
            percent(wins, n)
        ),
    ];

    let kills = window.field(|m| m.kills.map(f64::from));
    let deaths = window.field(|m| m.deaths.map(f64::from));
    let assists = window.field(|m| m.assists.map(f64::from));
    let total_deaths: f64 = deaths.present().iter().sum();
    let takedowns: f64 = kills.present().iter().sum::<f64>() + assists.present().iter().sum::<f64>();
    let kda_ratio = (!kills.is_absent() && !deaths.is_absent())
        .then(|| takedowns / total_deaths.max(1.0));
    lines.push(format!(
        "- Average KDA: {}/{}/{} (Ratio: {})",
        or_na(kills.mean(), 1),
        or_na(deaths.mean(), 1),
        or_na(assists.mean(), 1),
        or_na(kda_ratio, 2),
    ));

    let mut champions: BTreeMap<String, WinTally> = BTreeMap::new();
    let mut roles: BTreeMap<Role, WinTally> = BTreeMap::new();
    for m in matches {
        champions.entry(champion(m).to_string()).or_default().add(m.win);
        roles
            .entry(m.team_position.unwrap_or(Role::Unknown))
            .or_default()
            .add(m.win);
    }

    lines.push(String::new());
    lines.push(format!("## Champion Pool ({} unique champions)", champions.len()));
    for (name, tally) in by_games(&champions).into_iter().take(TOP_CHAMPIONS) {
        lines.push(format!(
            "- {name}: {} games ({}W-{}L, {:.0}% WR)",
            tally.games,
            tally.wins,
            tally.games - tally.wins,
            tally.rate()
        ));
    }

    lines.push(String::new());
    lines.push("## Role Distribution".to_string());
    for (role, tally) in by_games(&roles) {
        lines.push(format!("- {role}: {} games ({:.0}% WR)", tally.games, tally.rate()));
    }

    lines.push(String::new());
    lines.push("## Playstyle Indicators".to_string());
    let first_bloods = matches
        .iter()
        .filter(|m| m.took_first_blood_part() == Some(true))
        .count();
    lines.push(format!(
        "- First Blood Participation: {first_bloods}/{n} games ({:.0}%)",
        percent(first_bloods, n)
    ));
    lines.push(format!(
        "- Vision Score: {} avg ({} wards/game)",
        or_na(window.field(|m| m.vision_score.map(f64::from)).mean(), 1),
        or_na(window.field(|m| m.wards_placed.map(f64::from)).mean(), 1),
    ));
    lines.push(format!(
        "- Objectives: {} towers/game, {} dragons/game, {} barons/game",
        or_na(window.field(|m| m.turret_takedowns.map(f64::from)).mean(), 1),
        or_na(window.field(|m| m.dragon_takedowns.map(f64::from)).mean(), 1),
        or_na(window.field(|m| m.baron_takedowns.map(f64::from)).mean(), 1),
    ));
    lines.push(format!(
        "- Economy: {} gold/game, {} CS/game",
        or_na(window.field(|m| m.gold_earned.map(f64::from)).mean(), 0),
        or_na(window.field(|m| m.total_minions_killed.map(f64::from)).mean(), 0),
    ));
    lines.push(format!(
        "- Damage: {} to champions/game",
        or_na(
            window
                .field(|m| m.total_damage_dealt_to_champions.map(|d| d as f64))
                .mean(),
            0
        ),
    ));

    let recent = &matches[..n.min(RECENT_FORM)];
    let recent_wins = recent.iter().filter(|m| m.win).count();
    lines.push(String::new());
    lines.push("## Recent Form".to_string());
    lines.push(format!(
        "- Last {} Games: {recent_wins}W-{}L",
        recent.len(),
        recent.len() - recent_wins
    ));

    lines.push(String::new());
    lines.push("## Recent Matches".to_string());
    for (i, m) in matches.iter().take(RECENT_MATCHES).enumerate() {
        let role = m.team_position.map_or_else(|| "?".to_string(), |r| r.to_string());
        let minutes = m
            .game_duration
            .map_or_else(|| "?".to_string(), |secs| (secs / 60).to_string());
        lines.push(format!(
            "{}. {} ({role}) - {} - {} - {minutes}min",
            i + 1,
            champion(m),
            m.outcome(),
            kda_line(m)
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::fixtures::full_match;

    #[test]
    fn summary_sections() {
        let mut lux = full_match("c", false);
        lux.champion_name = Some("Lux".to_string());
        lux.team_position = Some(Role::Utility);
        let window = MatchWindow::new(vec![full_match("a", true), lux, full_match("b", true)]);
        let text = build_profile_summary(&window);

        assert!(text.contains("# Player Gameplay Profile (Last 3 Matches)"));
        assert!(text.contains("- Record: 2W - 1L (66.7% Win Rate)"));
        assert!(text.contains("- Average KDA: 6.0/3.0/8.0 (Ratio: 4.67)"));
        assert!(text.contains("## Champion Pool (2 unique champions)"));
        assert!(text.contains("- Ahri: 2 games (2W-0L, 100% WR)"));
        assert!(text.contains("- MIDDLE: 2 games (100% WR)"));
        assert!(text.contains("- First Blood Participation: 3/3 games (100%)"));
        assert!(text.contains("- Last 3 Games: 2W-1L"));
        assert!(text.contains("2. Lux (UTILITY) - Loss - 6/3/8 - 30min"));
    }

    #[test]
    fn missing_stats_render_as_unavailable() {
        let window = MatchWindow::new(vec![MatchRecord::bare("a", true)]);
        let text = build_profile_summary(&window);
        assert!(text.contains("- Average KDA: N/A/N/A/N/A (Ratio: N/A)"));
        assert!(text.contains("- Vision Score: N/A avg (N/A wards/game)"));
        assert!(text.contains("1. Unknown (?) - Win - ?/?/? - ?min"));
    }

    #[test]
    fn empty_window() {
        assert_eq!(
            build_profile_summary(&MatchWindow::default()),
            "No recent match history available for this player."
        );
    }
}
