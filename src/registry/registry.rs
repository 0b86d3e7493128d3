use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::descriptor::{AgentDescriptor, AgentReply, TaskPayload};
use super::matcher::{rank, SearchQuery};

/// 统计分类：名称 → 能力文本中需要出现的任一关键字
const STAT_CATEGORIES: &[(&str, &[&str])] = &[
    ("cctv_analysis", &["cctv"]),
    ("wallet_balance", &["wallet"]),
    ("ride_booking", &["uber", "ride"]),
    ("weather", &["weather"]),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceStats {
    pub total_agents: usize,
    pub categories: BTreeMap<String, usize>,
    pub average_rating: f64,
}

impl MarketplaceStats {
    pub fn from_agents(agents: &[AgentDescriptor]) -> Self {
        let categories = STAT_CATEGORIES
            .iter()
            .map(|(name, keywords)| {
                let count = agents
                    .iter()
                    .filter(|agent| {
                        let text = agent.capability_text();
                        keywords.iter().any(|kw| text.contains(kw))
                    })
                    .count();
                (name.to_string(), count)
            })
            .collect();

        let average_rating = if agents.is_empty() {
            0.0
        } else {
            agents.iter().map(|a| a.rating).sum::<f64>() / agents.len() as f64
        };

        Self {
            total_agents: agents.len(),
            categories,
            average_rating,
        }
    }
}

/// Agent 注册表边界
///
/// 检索、列举、统计都基于 `agents()` 快照提供默认实现；
/// 实现方只需给出目录与执行逻辑。注册表在运行期间只读。
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    fn agents(&self) -> Vec<AgentDescriptor>;

    async fn execute(&self, agent_id: &str, payload: &TaskPayload) -> Result<AgentReply>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<AgentDescriptor>> {
        let agents = self.agents();
        Ok(rank(&agents, query).into_iter().map(|s| s.agent).collect())
    }

    fn get(&self, agent_id: &str) -> Option<AgentDescriptor> {
        self.agents().into_iter().find(|a| a.id == agent_id)
    }

    /// 按分类列出；分类为能力标签拼接文本中的子串（不区分大小写）
    fn list(&self, category: Option<&str>) -> Vec<AgentDescriptor> {
        let agents = self.agents();
        match category {
            Some(category) => {
                let category = category.to_lowercase();
                agents
                    .into_iter()
                    .filter(|a| a.capability_text().contains(&category))
                    .collect()
            }
            None => agents,
        }
    }

    fn stats(&self) -> MarketplaceStats {
        MarketplaceStats::from_agents(&self.agents())
    }
}

pub type DynAgentRegistry = Arc<dyn AgentRegistry>;
