use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::TaskStatus;
use crate::utils::clock::now_millis;

/// 运行阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStatus {
    Initializing,
    Decomposing,
    Discovering,
    Executing,
    Synthesizing,
    Completed,
    Failed,
}

impl ContextStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ContextStatus::Completed | ContextStatus::Failed)
    }
}

impl fmt::Display for ContextStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContextStatus::Initializing => "initializing",
            ContextStatus::Decomposing => "decomposing",
            ContextStatus::Discovering => "discovering",
            ContextStatus::Executing => "executing",
            ContextStatus::Synthesizing => "synthesizing",
            ContextStatus::Completed => "completed",
            ContextStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtKind {
    Reasoning,
    Decision,
    AgentCall,
    Fallback,
    Result,
}

/// 思考过程记录
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Thought {
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: ThoughtKind,
    pub content: String,
    #[serde(default)]
    pub metadata: Value,
}

impl Thought {
    pub fn new(kind: ThoughtKind, content: impl Into<String>, metadata: Value) -> Self {
        let metadata = if metadata.is_null() {
            Value::Object(Default::default())
        } else {
            metadata
        };
        Self {
            timestamp: now_millis(),
            kind,
            content: content.into(),
            metadata,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    StatusChanged {
        status: ContextStatus,
        message: String,
    },
    AgentAssigned {
        task_id: String,
        agent: String,
    },
    TaskStarted {
        task_id: String,
        description: String,
    },
    TaskFinished {
        task_id: String,
        status: TaskStatus,
    },
    ConditionNotMet {
        reason: String,
    },
}

/// 生命周期事件
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextEvent {
    pub timestamp: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl ContextEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            timestamp: now_millis(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = ContextEvent::new(EventKind::AgentAssigned {
            task_id: "task_1".to_string(),
            agent: "VisionGuard Pro".to_string(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "agent_assigned");
        assert_eq!(json["task_id"], "task_1");
        assert!(json["timestamp"].is_u64());
    }

    #[test]
    fn test_thought_defaults_metadata_to_object() {
        let thought = Thought::new(ThoughtKind::Reasoning, "thinking", Value::Null);
        assert!(thought.metadata.is_object());
        let json = serde_json::to_value(&thought).unwrap();
        assert_eq!(json["type"], "reasoning");
    }
}
