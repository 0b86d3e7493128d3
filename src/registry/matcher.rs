use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::descriptor::AgentDescriptor;

const NAME_SCORE: u32 = 3;
const DESCRIPTION_SCORE: u32 = 2;
const CAPABILITY_SCORE: u32 = 5;
/// 查询拆词后，短于该长度的词不参与能力匹配
const MIN_TERM_LEN: usize = 3;

/// 注册表检索条件
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub capability: Option<String>,
    #[serde(default)]
    pub min_rating: Option<f64>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            capability: None,
            min_rating: None,
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredAgent {
    pub score: u32,
    pub agent: AgentDescriptor,
}

fn query_terms(query: &str) -> impl Iterator<Item = &str> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| term.len() >= MIN_TERM_LEN)
}

/// 能力标签与查询是否匹配：整串互相包含，或查询中任一词出现在标签中
fn capability_matches(capability: &str, query: &str) -> bool {
    let tag = capability.to_lowercase();
    if tag.contains(query) || query.contains(&tag) || query.contains(&tag.replace('_', " ")) {
        return true;
    }
    query_terms(query).any(|term| tag.contains(term))
}

/// 计算相关度；名称 +3，描述 +2，每个匹配的能力标签 +5
pub fn score(agent: &AgentDescriptor, query: &str) -> u32 {
    let query = query.trim().to_lowercase();
    let mut total = 0;
    if agent.name.to_lowercase().contains(&query) {
        total += NAME_SCORE;
    }
    if agent.description.to_lowercase().contains(&query) {
        total += DESCRIPTION_SCORE;
    }
    total += agent
        .capabilities
        .iter()
        .filter(|cap| capability_matches(cap, &query))
        .count() as u32
        * CAPABILITY_SCORE;
    total
}

/// 过滤并排序：先按得分、再按评分降序；得分为 0 的候选被排除
pub fn rank<'a, I>(agents: I, search: &SearchQuery) -> Vec<ScoredAgent>
where
    I: IntoIterator<Item = &'a AgentDescriptor>,
{
    let mut scored: Vec<ScoredAgent> = agents
        .into_iter()
        .filter(|agent| {
            search
                .capability
                .as_deref()
                .map_or(true, |cap| agent.has_capability(cap))
        })
        .filter(|agent| search.min_rating.map_or(true, |min| agent.rating >= min))
        .filter_map(|agent| {
            let score = score(agent, &search.query);
            (score > 0).then(|| ScoredAgent {
                score,
                agent: agent.clone(),
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.agent.rating.partial_cmp(&a.agent.rating).unwrap_or(Ordering::Equal))
    });
    scored
}
