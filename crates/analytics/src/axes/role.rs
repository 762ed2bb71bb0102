use std::collections::BTreeMap;

use scope_core::{AxisKey, AxisResult, MatchRecord, Role, TrendSeries};

use super::{build_axis, AxisScorer, Normalization, SubMetric, Unit};
use crate::extract::MatchWindow;
use crate::stats;

/// How well performance holds up away from the main role.
pub struct RoleScorer;

#[derive(Debug, Default)]
struct RoleTally<'a> {
    games: usize,
    wins: usize,
    matches: Vec<&'a MatchRecord>,
}

impl RoleTally<'_> {
    fn win_rate(&self) -> f64 {
        self.wins as f64 / self.games as f64
    }
}

/// Per-role tallies; `Unknown` positions are treated as missing.
fn tally(window: &MatchWindow) -> BTreeMap<Role, RoleTally<'_>> {
    let mut roles: BTreeMap<Role, RoleTally<'_>> = BTreeMap::new();
    for m in window.chronological() {
        let Some(role) = m.team_position.filter(|r| *r != Role::Unknown) else {
            continue;
        };
        let entry = roles.entry(role).or_default();
        entry.games += 1;
        entry.wins += usize::from(m.win);
        entry.matches.push(m);
    }
    roles
}

/// Most played role; ties go to the role that sorts first.
fn primary_of(roles: &BTreeMap<Role, RoleTally<'_>>) -> Option<Role> {
    roles
        .iter()
        .fold(None::<(Role, usize)>, |best, (role, t)| match best {
            Some((_, games)) if games >= t.games => best,
            _ => Some((*role, t.games)),
        })
        .map(|(role, _)| role)
}

fn mean_kda<'a>(matches: impl Iterator<Item = &'a MatchRecord>) -> Option<f64> {
    let kdas: Vec<f64> = matches.filter_map(MatchRecord::kda).collect();
    stats::mean(&kdas)
}

impl AxisScorer for RoleScorer {
    fn key(&self) -> AxisKey {
        AxisKey::RoleStability
    }

    fn score(&self, window: &MatchWindow) -> AxisResult {
        let roles = tally(window);
        let primary = primary_of(&roles);
        let total_games: usize = roles.values().map(|t| t.games).sum();

        let primary_share = primary
            .and_then(|role| roles.get(&role))
            .map(|t| t.games as f64 / total_games as f64);

        let win_rates: Vec<f64> = roles.values().map(RoleTally::win_rate).collect();
        let winrate_spread = win_rates
            .iter()
            .copied()
            .fold(None::<(f64, f64)>, |acc, wr| match acc {
                None => Some((wr, wr)),
                Some((lo, hi)) => Some((lo.min(wr), hi.max(wr))),
            })
            .map(|(lo, hi)| hi - lo);

        let kda_delta = primary.and_then(|role| {
            let on_role = mean_kda(roles.get(&role)?.matches.iter().copied())?;
            let off_role = roles
                .iter()
                .filter(|(r, _)| **r != role)
                .flat_map(|(_, t)| t.matches.iter().copied());
            // one-role players have no off-role gap
            Some(mean_kda(off_role).map_or(0.0, |off| (on_role - off).abs()))
        });

        let subs = vec![
            SubMetric::new(
                "primary_role_share",
                "Primary Role Share",
                Unit::Percent,
                0.30,
                Normalization::Ceiling(1.0),
                primary_share,
            ),
            SubMetric::new(
                "role_winrate_spread",
                "Win Rate Spread Across Roles",
                Unit::PercentagePoints,
                0.40,
                Normalization::Inverted(1.0),
                winrate_spread,
            ),
            SubMetric::new(
                "role_kda_delta",
                "Off-Role KDA Gap",
                Unit::Ratio,
                0.30,
                Normalization::Inverted(3.0),
                kda_delta,
            ),
        ];

        build_axis(self.key(), subs, TrendSeries::empty("none"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::fixtures::full_match;

    fn on(role: Role, win: bool, kills: u32) -> MatchRecord {
        let mut m = full_match("m", win);
        m.team_position = Some(role);
        m.kills = Some(kills);
        m.assists = Some(0);
        m.deaths = Some(1);
        m
    }

    #[test]
    fn single_role_player_is_perfectly_stable() {
        let window = MatchWindow::new(vec![on(Role::Jungle, true, 4), on(Role::Jungle, false, 2)]);
        let result = RoleScorer.score(&window);
        assert_eq!(result.metric("primary_role_share").unwrap().value, Some(1.0));
        assert_eq!(result.metric("role_winrate_spread").unwrap().value, Some(0.0));
        assert_eq!(result.metric("role_kda_delta").unwrap().value, Some(0.0));
        assert_eq!(result.score, 100);
        assert!(result.trend.is_empty());
    }

    #[test]
    fn off_role_gap_and_spread() {
        let window = MatchWindow::new(vec![
            on(Role::Middle, true, 6),
            on(Role::Middle, true, 4),
            on(Role::Top, false, 1),
        ]);
        let result = RoleScorer.score(&window);
        let share = result.metric("primary_role_share").unwrap().value.unwrap();
        assert!((share - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.metric("role_winrate_spread").unwrap().value, Some(1.0));
        assert_eq!(result.metric("role_winrate_spread").unwrap().display_value, "100pp");
        assert_eq!(result.metric("role_kda_delta").unwrap().value, Some(4.0));
    }

    #[test]
    fn ties_resolve_deterministically() {
        let window = MatchWindow::new(vec![on(Role::Utility, true, 1), on(Role::Top, true, 1)]);
        assert_eq!(primary_of(&tally(&window)), Some(Role::Top));
    }

    #[test]
    fn unknown_positions_are_missing() {
        let mut m = full_match("a", true);
        m.team_position = Some(Role::Unknown);
        let result = RoleScorer.score(&MatchWindow::new(vec![m]));
        assert!(result.metrics.iter().all(|metric| metric.value.is_none()));
        assert_eq!(result.score, 0);
    }
}
