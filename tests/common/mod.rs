#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use taskmesh::registry::{default_catalog, rank};
use taskmesh::{
    AgentDescriptor, AgentRegistry, AgentReply, Marketplace, RunRecord, SearchQuery, TaskMeshError,
    TaskPayload, TelemetrySink,
};

pub enum Scripted {
    Reply(Value),
    ErrorReply(String),
    Fail(String),
}

/// 默认目录 + 按 Agent 覆盖的执行结果，并记录每次调用
pub struct FakeRegistry {
    agents: Vec<AgentDescriptor>,
    inner: Marketplace,
    overrides: HashMap<String, Scripted>,
    pub calls: Mutex<Vec<String>>,
    fail_search: bool,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::with_agents(default_catalog())
    }

    pub fn with_agents(agents: Vec<AgentDescriptor>) -> Self {
        Self {
            inner: Marketplace::new(agents.clone()),
            agents,
            overrides: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            fail_search: false,
        }
    }

    pub fn empty() -> Self {
        Self::with_agents(Vec::new())
    }

    pub fn script(mut self, agent_id: &str, scripted: Scripted) -> Self {
        self.overrides.insert(agent_id.to_string(), scripted);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn calls_to(&self, agent_id: &str) -> usize {
        self.calls.lock().iter().filter(|id| *id == agent_id).count()
    }
}

#[async_trait]
impl AgentRegistry for FakeRegistry {
    fn agents(&self) -> Vec<AgentDescriptor> {
        self.agents.clone()
    }

    async fn search(&self, query: &SearchQuery) -> taskmesh::Result<Vec<AgentDescriptor>> {
        if self.fail_search {
            return Err(TaskMeshError::Registry("registry offline".to_string()));
        }
        Ok(rank(&self.agents, query).into_iter().map(|s| s.agent).collect())
    }

    async fn execute(&self, agent_id: &str, payload: &TaskPayload) -> taskmesh::Result<AgentReply> {
        self.calls.lock().push(agent_id.to_string());
        match self.overrides.get(agent_id) {
            Some(Scripted::Reply(value)) => Ok(AgentReply::success(agent_id, value.clone())),
            Some(Scripted::ErrorReply(message)) => Ok(AgentReply::error(agent_id, message.clone())),
            Some(Scripted::Fail(message)) => Err(TaskMeshError::Registry(message.clone())),
            None => self.inner.execute(agent_id, payload).await,
        }
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    pub records: Mutex<Vec<RunRecord>>,
}

#[async_trait]
impl TelemetrySink for RecordingTelemetry {
    async fn record(&self, record: &RunRecord) -> taskmesh::Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

pub struct FailingTelemetry;

#[async_trait]
impl TelemetrySink for FailingTelemetry {
    async fn record(&self, _record: &RunRecord) -> taskmesh::Result<()> {
        Err(TaskMeshError::Telemetry("sink unavailable".to_string()))
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
