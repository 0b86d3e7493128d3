use std::sync::Arc;

use taskmesh::orchestrator::DEFAULT_TOP_K;
use taskmesh::registry::rank;
use taskmesh::{
    AgentDescriptor, Marketplace, Orchestrator, OrchestratorConfig, SearchQuery, TaskStatus,
};

fn orchestrator() -> Orchestrator {
    Orchestrator::new(Arc::new(Marketplace::default()))
}

fn ids(agents: &[AgentDescriptor]) -> Vec<&str> {
    agents.iter().map(|a| a.id.as_str()).collect()
}

#[test]
fn capability_match_beats_higher_rating() {
    let agents = vec![
        AgentDescriptor::new("a", "A")
            .capabilities(["cctv_analysis"])
            .rating(4.8),
        AgentDescriptor::new("b", "B")
            .capabilities(["wallet_balance"])
            .rating(4.9),
    ];
    let ranked = rank(
        &agents,
        &SearchQuery::new("cctv vision analysis").with_min_rating(4.0),
    );
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].agent.id, "a");
}

#[tokio::test]
async fn search_with_capability_filter() {
    let found = orchestrator()
        .search_agents(&SearchQuery::new("ride booking").with_capability("MULTI_PLATFORM"))
        .await
        .unwrap();
    assert_eq!(ids(&found), vec!["ride_002"]);
}

#[tokio::test]
async fn search_orders_by_score() {
    let found = orchestrator()
        .search_agents(&SearchQuery::new("cctv"))
        .await
        .unwrap();
    assert_eq!(ids(&found), vec!["cctv_001", "cctv_002"]);
}

#[tokio::test]
async fn search_respects_min_rating() {
    let found = orchestrator()
        .search_agents(&SearchQuery::new("uber").with_min_rating(4.6))
        .await
        .unwrap();
    assert_eq!(ids(&found), vec!["ride_001"]);
}

#[tokio::test]
async fn find_agents_caps_results() {
    let orchestrator = orchestrator();
    let found = orchestrator
        .find_agents("check wallet balance and weather analysis", DEFAULT_TOP_K)
        .await
        .unwrap();
    assert_eq!(found.len(), DEFAULT_TOP_K);

    let single = orchestrator.find_agents("weather", 1).await.unwrap();
    assert_eq!(ids(&single), vec!["weather_001"]);
}

#[test]
fn list_agents_by_category() {
    let orchestrator = orchestrator();
    assert_eq!(orchestrator.list_agents(None).len(), 8);
    assert_eq!(
        ids(&orchestrator.list_agents(Some("Wallet"))),
        vec!["wallet_001", "wallet_002"]
    );
    assert!(orchestrator.list_agents(Some("teleport")).is_empty());
}

#[test]
fn marketplace_stats_for_default_catalog() {
    let stats = orchestrator().marketplace_stats();
    assert_eq!(stats.total_agents, 8);
    assert_eq!(stats.categories["cctv_analysis"], 2);
    assert_eq!(stats.categories["wallet_balance"], 2);
    assert_eq!(stats.categories["ride_booking"], 2);
    assert_eq!(stats.categories["weather"], 2);
    assert!((stats.average_rating - 4.7375).abs() < 1e-9);
}

#[test]
fn get_agent_by_id() {
    let orchestrator = orchestrator();
    let agent = orchestrator.get_agent("weather_001").unwrap();
    assert_eq!(agent.name, "WeatherWise");
    assert!(orchestrator.get_agent("nope").is_none());
}

#[tokio::test]
async fn rating_floor_from_config_limits_assignment() {
    let config = OrchestratorConfig {
        min_rating: 4.95,
        ..OrchestratorConfig::default()
    };
    let orchestrator = orchestrator().with_config(config);
    let response = orchestrator
        .process_prompt("Book an Uber if the tennis court is dry")
        .await;

    let summary = &response.execution_summary;
    assert!(summary.tasks.iter().all(|t| t.assigned_agent_id.is_none()));
    assert_eq!(summary.tasks[0].status, TaskStatus::Failed);
    assert_eq!(
        response.result.as_deref(),
        Some("Task aborted: precondition not met (surface not dry)")
    );
}
