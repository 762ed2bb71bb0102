/// End-to-end orchestration over a mock match source and scripted backends:
/// narrated reports, fallback behaviour, missing history, topics and chat.

use std::sync::Arc;
use std::time::Duration;

use scope_analytics::source::mock::MockMatchSource;
use scope_analytics::{IngestionStatus, MetricExtractor, ProfileCache};
use scope_core::config::AnalysisConfig;
use scope_core::{AxisKey, MatchRecord, Role};
use scope_insight::Orchestrator;
use scope_llm::mock::MockBackend;
use scope_llm::{BackendChain, BackendFailure, Message, RuleBasedBackend, Tier};

// ============================================================================
// Test Helpers
// ============================================================================

fn ranked_game(i: usize, win: bool) -> MatchRecord {
    let mut m = MatchRecord::bare(format!("m{i}"), win);
    m.champion_name = Some(if i % 2 == 0 { "Thresh" } else { "Nautilus" }.to_string());
    m.team_position = Some(Role::Utility);
    m.game_duration = Some(1500 + (i as u32) * 60);
    m.kills = Some(1 + (i as u32 % 3));
    m.deaths = Some(2 + (i as u32 % 4));
    m.assists = Some(10 + i as u32);
    m.team_kills = Some(28);
    m.total_damage_dealt_to_champions = Some(9_000);
    m.total_damage_taken = Some(18_000);
    m.first_blood_kill = Some(false);
    m.first_blood_assist = Some(i % 3 == 0);
    m.dragon_takedowns = Some(1);
    m.baron_takedowns = Some(0);
    m.turret_takedowns = Some(1);
    m.vision_score = Some(60);
    m.wards_placed = Some(30);
    m.wards_killed = Some(6);
    m.gold_earned = Some(8_500);
    m.gold_spent = Some(8_000);
    m.total_minions_killed = Some(40);
    m
}

fn history() -> Vec<MatchRecord> {
    (0..8).map(|i| ranked_game(i, i % 3 != 1)).collect()
}

fn source() -> Arc<MockMatchSource> {
    Arc::new(
        MockMatchSource::new()
            .with_player("support-main", history())
            .with_status("queued", IngestionStatus::Fetching),
    )
}

fn orchestrator(source: Arc<MockMatchSource>, tiers: Vec<Tier>) -> Orchestrator {
    let extractor = Arc::new(MetricExtractor::new(source, 20));
    Orchestrator::new(
        extractor,
        ProfileCache::new(Duration::from_secs(300), 50),
        &AnalysisConfig::default(),
        BackendChain::new(tiers, Box::new(RuleBasedBackend)),
    )
}

fn tier(backend: MockBackend, secs: u64) -> Tier {
    Tier::new(Box::new(backend), Duration::from_secs(secs))
}

fn band_prefix(score: u8) -> &'static str {
    match score {
        80.. => "Exceptional",
        65..=79 => "Strong fundamentals",
        50..=64 => "Solid baseline",
        _ => "Key growth",
    }
}

// ============================================================================
// Faultlines
// ============================================================================

#[tokio::test(start_paused = true)]
async fn narratives_come_from_the_first_responsive_tier() {
    let (hanging, partial) = MockBackend::hanging("DeepSeek-R1", "Ward the");
    let secondary = MockBackend::replying("Amazon Nova Micro", "  Rotate to drake after lane priority.  ");
    let orch = orchestrator(source(), vec![tier(hanging, 30), tier(secondary, 10)]);

    let report = orch.faultlines("support-main").await;

    assert!(report.is_ready());
    assert_eq!(report.match_count, 8);
    assert_eq!(report.axes.len(), AxisKey::ALL.len());
    let stalled = partial.lock().unwrap().clone();
    for axis in &report.axes {
        assert_eq!(axis.narrative_backend, "Amazon Nova Micro");
        assert_eq!(axis.result.narrative, "Rotate to drake after lane priority.");
        assert!(!axis.result.narrative.contains(stalled.as_str()));
        assert!(axis.result.score <= 100);
    }
}

#[tokio::test]
async fn failed_tiers_fall_back_to_score_banded_text() {
    let down = MockBackend::failing("relay", BackendFailure::Transport("connection refused".into()));
    let orch = orchestrator(source(), vec![tier(down, 5)]);

    let report = orch.faultlines("support-main").await;

    for axis in &report.axes {
        assert_eq!(axis.narrative_backend, "Rule-based");
        assert!(
            axis.result.narrative.starts_with(band_prefix(axis.result.score)),
            "{}: score {} got {:?}",
            axis.result.title,
            axis.result.score,
            axis.result.narrative
        );
    }
}

#[tokio::test]
async fn missing_history_yields_explained_empty_report() {
    let backend = MockBackend::replying("relay", "unused");
    let calls = backend.call_counter();
    let orch = orchestrator(source(), vec![tier(backend, 5)]);

    let report = orch.faultlines("nobody").await;
    assert_eq!(report.status, "NO_MATCHES");
    assert_eq!(report.match_count, 0);
    assert_eq!(report.axes.len(), 8);
    for axis in &report.axes {
        assert_eq!(axis.result.score, 0);
        assert_eq!(axis.narrative_backend, "none");
        assert!(axis.result.narrative.starts_with("Not enough match history"));
        assert!(axis.result.metrics.iter().all(|m| m.display_value == "N/A"));
    }

    let queued = orch.faultlines("queued").await;
    assert_eq!(queued.status, "FETCHING");
    assert!(!queued.is_ready());

    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn report_serializes_flattened_axes() {
    let orch = orchestrator(source(), vec![tier(MockBackend::replying("relay", "Ping less."), 5)]);
    let report = orch.faultlines("support-main").await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "READY");
    assert_eq!(json["playerId"], "support-main");
    assert_eq!(json["matchCount"], 8);
    assert_eq!(json["axes"][0]["axisKey"], "combat_efficiency");
    assert_eq!(json["axes"][0]["narrative"], "Ping less.");
    assert_eq!(json["axes"][0]["narrativeBackend"], "relay");
    assert!(json["requestId"].as_str().is_some_and(|id| !id.is_empty()));
}

// ============================================================================
// Topics
// ============================================================================

#[tokio::test]
async fn axis_topic_context_carries_score_and_recent_games() {
    let orch = orchestrator(source(), vec![tier(MockBackend::echoing_context("ctx"), 5)]);

    let insight = orch.topic_insight("support-main", "composure").await;
    assert_eq!(insight.topic, "Composure Index");
    assert_eq!(insight.backend_used, "ctx");
    assert!(insight.insight.contains("# Faultlines: Composure Index"));
    assert!(insight.insight.contains("Score: "));
    assert!(insight.insight.contains("## Recent Matches (last 5):"));
    assert!(insight.insight.contains("1. Thresh - Win - 1/2/10"));
}

#[tokio::test]
async fn history_topic_uses_battle_context() {
    let orch = orchestrator(source(), vec![tier(MockBackend::echoing_context("ctx"), 5)]);

    let insight = orch.topic_insight("support-main", "Role Influence").await;
    assert_eq!(insight.topic, "Role Influence");
    assert!(insight.insight.contains("# Echoes of Battle: Role Influence"));
    assert!(insight.insight.contains("- UTILITY: 5W-3L (62.5% WR)"));
}

#[tokio::test]
async fn playstyle_topic_uses_pattern_context() {
    let orch = orchestrator(source(), vec![tier(MockBackend::echoing_context("ctx"), 5)]);

    let insight = orch.topic_insight("support-main", "Vision Discipline").await;
    assert_eq!(insight.topic, "Vision Discipline");
    assert!(insight.insight.contains("# Patterns Beneath Chaos: Vision Discipline"));
    assert!(insight.insight.contains("- Avg Vision Score: 60.0"));
    assert!(insight.insight.contains("- Total Wards Placed: 240"));
    assert!(!insight.insight.contains("# Faultlines"));
}

#[tokio::test]
async fn topic_query_names_the_configured_window() {
    let orch = orchestrator(source(), vec![tier(MockBackend::echoing("echo"), 5)]);

    let insight = orch.topic_insight("support-main", "Tempo Profile").await;
    assert!(insight
        .insight
        .starts_with("Analyze the player's Tempo Profile playstyle axis from their last 20 matches."));
}

#[tokio::test]
async fn topic_without_history_is_reported_not_generated() {
    let backend = MockBackend::echoing_context("ctx");
    let calls = backend.call_counter();
    let orch = orchestrator(source(), vec![tier(backend, 5)]);

    let insight = orch.topic_insight("nobody", "Clutch Battles").await;
    assert_eq!(insight.backend_used, "none");
    assert!(insight.insight.starts_with("Insufficient match history"));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ad_hoc_topic_reuses_the_profile_seeded_by_a_report() {
    let source = source();
    let orch = orchestrator(source.clone(), vec![tier(MockBackend::echoing_context("ctx"), 5)]);

    orch.faultlines("support-main").await;
    assert_eq!(source.calls(), 1);

    let insight = orch.topic_insight("support-main", "What should I work on?").await;
    assert_eq!(insight.topic, "What should I work on?");
    assert!(insight.insight.contains("# Player Gameplay Profile (Last 8 Matches)"));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn ad_hoc_topic_without_profile_still_answers() {
    let orch = orchestrator(source(), vec![tier(MockBackend::echoing_context("ctx"), 5)]);
    let insight = orch.topic_insight("nobody", "Best champion?").await;
    assert_eq!(insight.backend_used, "ctx");
    assert!(insight.insight.starts_with("No player profile is available"));
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn chat_context_holds_profile_and_earlier_turns() {
    let orch = orchestrator(source(), vec![tier(MockBackend::echoing_context("ctx"), 5)]);
    let messages = vec![
        Message::new(scope_llm::Role::System, "ignored"),
        Message::new(scope_llm::Role::User, "How is my vision?"),
        Message::new(scope_llm::Role::Assistant, "Above average."),
        Message::new(scope_llm::Role::User, "And my deaths?"),
    ];

    let reply = orch.chat(&messages, Some("support-main")).await.unwrap();
    assert_eq!(reply.backend_used, "ctx");
    assert!(reply.reply.starts_with("# Player Gameplay Profile"));
    assert!(reply
        .reply
        .contains("# Previous Conversation:\nUser: How is my vision?\nAssistant: Above average."));
    assert!(!reply.reply.contains("ignored"));
    assert!(!reply.reply.contains("And my deaths?"));
}

#[tokio::test]
async fn chat_without_player_uses_default_context() {
    let orch = orchestrator(source(), vec![tier(MockBackend::echoing_context("ctx"), 5)]);
    let messages = vec![Message::new(scope_llm::Role::User, "hello")];
    let reply = orch.chat(&messages, None).await.unwrap();
    assert_eq!(reply.reply, "You are an AI strategist analyzing gameplay.");
}
