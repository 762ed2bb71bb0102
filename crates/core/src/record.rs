use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a single match from the player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "Win"),
            Outcome::Loss => write!(f, "Loss"),
        }
    }
}

/// Lane / position the player was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Top,
    Jungle,
    Middle,
    Bottom,
    Utility,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Top => write!(f, "TOP"),
            Role::Jungle => write!(f, "JUNGLE"),
            Role::Middle => write!(f, "MIDDLE"),
            Role::Bottom => write!(f, "BOTTOM"),
            Role::Utility => write!(f, "UTILITY"),
            Role::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One played game, as delivered by the match source.
///
/// Every stat is optional: `None` means the key was absent from the source
/// payload, which is distinct from a recorded zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(default)]
    pub match_id: String,
    pub win: bool,
    pub champion_name: Option<String>,
    pub team_position: Option<Role>,
    /// Game length in seconds.
    pub game_duration: Option<u32>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub game_start_timestamp: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub game_end_timestamp: Option<DateTime<Utc>>,

    // Combat
    pub kills: Option<u32>,
    pub deaths: Option<u32>,
    pub assists: Option<u32>,
    /// Total kills scored by the player's team.
    pub team_kills: Option<u32>,
    pub total_damage_dealt_to_champions: Option<u64>,
    pub total_damage_taken: Option<u64>,
    pub first_blood_kill: Option<bool>,
    pub first_blood_assist: Option<bool>,

    // Objectives
    pub dragon_takedowns: Option<u32>,
    pub baron_takedowns: Option<u32>,
    pub turret_takedowns: Option<u32>,
    pub inhibitor_takedowns: Option<u32>,

    // Vision
    pub vision_score: Option<u32>,
    pub wards_placed: Option<u32>,
    pub wards_killed: Option<u32>,

    // Economy
    pub gold_earned: Option<u32>,
    pub gold_spent: Option<u32>,
    pub total_minions_killed: Option<u32>,

    // Utility
    pub total_heals_on_teammates: Option<u64>,
    pub damage_self_mitigated: Option<u64>,
}

impl MatchRecord {
    /// A record with only the outcome set; every stat absent.
    pub fn bare(match_id: impl Into<String>, win: bool) -> Self {
        Self {
            match_id: match_id.into(),
            win,
            champion_name: None,
            team_position: None,
            game_duration: None,
            game_start_timestamp: None,
            game_end_timestamp: None,
            kills: None,
            deaths: None,
            assists: None,
            team_kills: None,
            total_damage_dealt_to_champions: None,
            total_damage_taken: None,
            first_blood_kill: None,
            first_blood_assist: None,
            dragon_takedowns: None,
            baron_takedowns: None,
            turret_takedowns: None,
            inhibitor_takedowns: None,
            vision_score: None,
            wards_placed: None,
            wards_killed: None,
            gold_earned: None,
            gold_spent: None,
            total_minions_killed: None,
            total_heals_on_teammates: None,
            damage_self_mitigated: None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.win { Outcome::Win } else { Outcome::Loss }
    }

    /// Game length in minutes; absent or zero-length games have none.
    pub fn minutes(&self) -> Option<f64> {
        self.game_duration
            .filter(|&secs| secs > 0)
            .map(|secs| secs as f64 / 60.0)
    }

    /// kills + assists, widened so large counts cannot overflow.
    pub fn takedowns(&self) -> Option<f64> {
        Some(f64::from(self.kills?) + f64::from(self.assists?))
    }

    /// (kills + assists) / max(deaths, 1), when all three counts are present.
    pub fn kda(&self) -> Option<f64> {
        Some(self.takedowns()? / f64::from(self.deaths?.max(1)))
    }

    /// Divide a per-match total by the game length.
    pub fn per_minute(&self, total: Option<f64>) -> Option<f64> {
        Some(total? / self.minutes()?)
    }

    pub fn took_first_blood_part(&self) -> Option<bool> {
        match (self.first_blood_kill, self.first_blood_assist) {
            (None, None) => None,
            (k, a) => Some(k.unwrap_or(false) || a.unwrap_or(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_deserialize_to_none_and_zeros_stay_zero() {
        let json = r#"{"matchId":"NA1_1","win":true,"kills":0,"deaths":2,"assists":5,"teamPosition":"JUNGLE"}"#;
        let record: MatchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kills, Some(0));
        assert_eq!(record.team_kills, None);
        assert_eq!(record.vision_score, None);
        assert_eq!(record.team_position, Some(Role::Jungle));
        assert_eq!(record.outcome(), Outcome::Win);
    }

    #[test]
    fn unexpected_position_maps_to_unknown() {
        let json = r#"{"win":false,"teamPosition":""}"#;
        let record: MatchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.team_position, Some(Role::Unknown));
        assert_eq!(record.match_id, "");
    }

    #[test]
    fn timestamps_are_epoch_millis() {
        let json = r#"{"win":true,"gameStartTimestamp":1700000000000}"#;
        let record: MatchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.game_start_timestamp.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn kda_clamps_deaths_to_one() {
        let mut record = MatchRecord::bare("m", true);
        record.kills = Some(4);
        record.deaths = Some(0);
        record.assists = Some(2);
        assert_eq!(record.kda(), Some(6.0));

        record.assists = None;
        assert_eq!(record.kda(), None);
    }

    #[test]
    fn takedowns_do_not_overflow_at_the_count_limit() {
        let mut record = MatchRecord::bare("m", true);
        record.kills = Some(u32::MAX);
        record.assists = Some(1);
        record.deaths = Some(1);
        let expected = f64::from(u32::MAX) + 1.0;
        assert_eq!(record.takedowns(), Some(expected));
        assert_eq!(record.kda(), Some(expected));
    }

    #[test]
    fn per_minute_needs_a_duration() {
        let mut record = MatchRecord::bare("m", true);
        assert_eq!(record.per_minute(Some(60.0)), None);
        record.game_duration = Some(1800);
        assert_eq!(record.per_minute(Some(60.0)), Some(2.0));
        record.game_duration = Some(0);
        assert_eq!(record.minutes(), None);
    }
}
