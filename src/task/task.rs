use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskMeshError};

use super::kind::TaskKind;
use super::outcome::TaskOutcome;

/// 任务状态，只能沿 `pending → running → {completed|failed}` 前进；
/// 未运行的任务可以直接进入 `skipped` 或 `blocked`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
    Blocked,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Pending, TaskStatus::Skipped)
                | (TaskStatus::Pending, TaskStatus::Blocked)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::Skipped)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Blocked => "blocked",
        };
        f.write_str(label)
    }
}

/// 分解器输出的任务描述
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    #[serde(default, alias = "task_id")]
    pub id: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: TaskKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

fn default_kind() -> TaskKind {
    TaskKind::General
}

impl TaskSpec {
    pub fn new(id: impl Into<String>, kind: TaskKind, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, deps: Vec<String>) -> Self {
        self.dependencies = deps;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub description: String,
    pub dependencies: Vec<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<TaskOutcome>,
    #[serde(default)]
    pub assigned_agent_id: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, kind: TaskKind, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
            result: None,
            assigned_agent_id: None,
        }
    }

    /// 依赖按首次出现顺序去重
    pub fn with_dependencies(mut self, deps: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(deps.len());
        for dep in deps {
            if !unique.contains(&dep) {
                unique.push(dep);
            }
        }
        self.dependencies = unique;
        self
    }

    pub fn is_ready<'a, I>(&self, processed: I) -> bool
    where
        I: IntoIterator<Item = &'a String> + Copy,
    {
        self.status == TaskStatus::Pending
            && self
                .dependencies
                .iter()
                .all(|dep| processed.into_iter().any(|done| done == dep))
    }

    pub fn transition(&mut self, next: TaskStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(TaskMeshError::InvalidTransition {
                task: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

impl From<TaskSpec> for Task {
    fn from(spec: TaskSpec) -> Self {
        Task::new(spec.id, spec.kind, spec.description).with_dependencies(spec.dependencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("task_1", TaskKind::Booking, "Book ride");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.dependencies.is_empty());
        assert!(task.assigned_agent_id.is_none());
    }

    #[test]
    fn test_task_is_ready_with_deps() {
        let task = Task::new("task_2", TaskKind::Booking, "Book ride")
            .with_dependencies(vec!["task_1".to_string()]);
        let none: Vec<String> = Vec::new();
        assert!(!task.is_ready(&none));
        let done = vec!["task_1".to_string()];
        assert!(task.is_ready(&done));
    }

    #[test]
    fn test_dependencies_deduplicated() {
        let task = Task::new("task_3", TaskKind::General, "x").with_dependencies(vec![
            "task_1".to_string(),
            "task_2".to_string(),
            "task_1".to_string(),
        ]);
        assert_eq!(task.dependencies, vec!["task_1", "task_2"]);
    }

    #[test]
    fn test_status_moves_forward_only() {
        let mut task = Task::new("task_1", TaskKind::General, "x");
        task.transition(TaskStatus::Running).unwrap();
        task.transition(TaskStatus::Completed).unwrap();
        let err = task.transition(TaskStatus::Running).unwrap_err();
        assert!(matches!(err, TaskMeshError::InvalidTransition { .. }));
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_spec_accepts_task_id_alias() {
        let spec: TaskSpec = serde_json::from_str(
            r#"{"task_id": "t1", "type": "cctv_check", "description": "look", "dependencies": []}"#,
        )
        .unwrap();
        assert_eq!(spec.id, "t1");
        assert_eq!(spec.kind, TaskKind::VisionCheck);
    }
}
