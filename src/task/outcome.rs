use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
    Skipped,
}

/// 单个任务的执行结果
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub status: OutcomeStatus,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TaskOutcome {
    pub fn success(result: Value) -> Self {
        Self {
            status: OutcomeStatus::Success,
            result,
            agent_id: None,
            fallback: false,
            generated_by: None,
            error: None,
            reason: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            result: Value::Null,
            agent_id: None,
            fallback: false,
            generated_by: None,
            error: Some(message.into()),
            reason: None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Skipped,
            result: Value::Null,
            agent_id: None,
            fallback: false,
            generated_by: None,
            error: None,
            reason: Some(reason.into()),
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn from_fallback(mut self, generated_by: impl Into<String>) -> Self {
        self.fallback = true;
        self.generated_by = Some(generated_by.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == OutcomeStatus::Error
    }

    /// 读取结果负载中的字段
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.result.get(name)
    }
}
