use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::{Result, TaskMeshError};
use crate::utils::clock::now_millis;

use super::descriptor::{AgentDescriptor, AgentReply, TaskPayload};
use super::registry::AgentRegistry;

/// 内存版 Agent 市场
///
/// 目录在构造时固定，执行结果按首个能力标签模拟生成。
pub struct Marketplace {
    agents: Vec<AgentDescriptor>,
    latency: Duration,
    bookings: AtomicU64,
}

impl Default for Marketplace {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl Marketplace {
    pub fn new(agents: Vec<AgentDescriptor>) -> Self {
        Self {
            agents,
            latency: Duration::ZERO,
            bookings: AtomicU64::new(0),
        }
    }

    /// 模拟执行耗时
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn mock_result(&self, agent: &AgentDescriptor) -> Value {
        let primary = agent
            .capabilities
            .first()
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| "general".to_string());

        if primary.contains("cctv") || primary.contains("vision") {
            json!({
                "analysis": "Tennis court is dry",
                "confidence": 0.95,
                "weather": "sunny",
                "moisture_level": "low"
            })
        } else if primary.contains("wallet") || primary.contains("balance") {
            json!({
                "balance": 150.0,
                "currency": "USD",
                "sufficient": true
            })
        } else if primary.contains("uber") || primary.contains("ride") {
            let seq = self.bookings.fetch_add(1, Ordering::Relaxed);
            json!({
                "booking_id": format!("RIDE-{}", 10000 + seq),
                "eta": "8 minutes",
                "driver": "John Doe",
                "vehicle": "Toyota Camry",
                "fare": 18.5
            })
        } else if primary.contains("weather") {
            json!({
                "condition": "sunny",
                "temperature": 72,
                "humidity": 45,
                "forecast": "clear skies"
            })
        } else {
            json!({
                "result": format!("Task completed by {}", agent.name),
                "timestamp": now_millis() / 1000
            })
        }
    }
}

#[async_trait]
impl AgentRegistry for Marketplace {
    fn agents(&self) -> Vec<AgentDescriptor> {
        self.agents.clone()
    }

    fn get(&self, agent_id: &str) -> Option<AgentDescriptor> {
        self.agents.iter().find(|a| a.id == agent_id).cloned()
    }

    #[instrument(skip(self, payload), fields(task_id = %payload.task_id))]
    async fn execute(&self, agent_id: &str, payload: &TaskPayload) -> Result<AgentReply> {
        let Some(agent) = self.agents.iter().find(|a| a.id == agent_id) else {
            let missing = TaskMeshError::AgentNotFound(agent_id.to_string());
            return Ok(AgentReply::error(agent_id, missing.to_string()));
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        debug!(agent = %agent.name, "mock agent execution");
        Ok(AgentReply::success(agent_id, self.mock_result(agent)))
    }
}

/// 默认目录：视觉、钱包、打车、天气、决策五类共八个 Agent
pub fn default_catalog() -> Vec<AgentDescriptor> {
    vec![
        AgentDescriptor::new("cctv_001", "VisionGuard Pro")
            .description("Advanced CCTV analysis for weather and surface conditions")
            .capabilities(["cctv_analysis", "weather_detection", "surface_moisture"])
            .rating(4.8)
            .cost(0.05),
        AgentDescriptor::new("cctv_002", "SmartEye Vision")
            .description("Real-time camera feed analysis and object detection")
            .capabilities(["cctv_analysis", "object_detection", "scene_understanding"])
            .rating(4.6)
            .cost(0.03),
        AgentDescriptor::new("wallet_001", "CryptoBalance Checker")
            .description("Wallet balance verification and transaction management")
            .capabilities(["wallet_balance", "crypto_balance", "transaction_check"])
            .rating(4.9)
            .cost(0.01),
        AgentDescriptor::new("wallet_002", "FinanceGuard")
            .description("Multi-wallet balance checking and fund verification")
            .capabilities(["wallet_balance", "fund_verification", "balance_check"])
            .rating(4.7)
            .cost(0.02),
        AgentDescriptor::new("ride_001", "UberConnect Pro")
            .description("Seamless Uber ride booking and management")
            .capabilities(["uber_booking", "ride_hailing", "transportation"])
            .rating(4.9)
            .cost(0.10),
        AgentDescriptor::new("ride_002", "RideShare Master")
            .description("Multi-platform ride booking (Uber, Lyft, etc.)")
            .capabilities(["uber_booking", "ride_hailing", "multi_platform"])
            .rating(4.5)
            .cost(0.08),
        AgentDescriptor::new("weather_001", "WeatherWise")
            .description("Real-time weather analysis and forecasting")
            .capabilities(["weather_analysis", "forecasting", "conditions"])
            .rating(4.7)
            .cost(0.02),
        AgentDescriptor::new("decision_001", "LogicFlow AI")
            .description("Complex decision making and reasoning")
            .capabilities(["decision_making", "reasoning", "logic"])
            .rating(4.8)
            .cost(0.05),
    ]
}
