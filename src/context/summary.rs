use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskOutcome, TaskStatus};

use super::event::{ContextEvent, ContextStatus, Thought};

/// 对外暴露的执行摘要（进度查询返回值）
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub context_id: String,
    pub prompt: String,
    pub status: ContextStatus,
    pub current_step: usize,
    pub total_steps: usize,
    pub tasks: Vec<Task>,
    pub results: BTreeMap<String, TaskOutcome>,
    pub decisions: BTreeMap<String, bool>,
    pub elapsed_ms: u64,
    pub events: Vec<ContextEvent>,
    pub thought_process: Vec<Thought>,
}

impl ExecutionSummary {
    pub fn task_status(&self, task_id: &str) -> Option<TaskStatus> {
        self.tasks.iter().find(|t| t.id == task_id).map(|t| t.status)
    }

    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}
