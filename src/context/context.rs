use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::Value;

use crate::error::{Result, TaskMeshError};
use crate::task::{Task, TaskOutcome, TaskStatus};
use crate::utils::clock::now_millis;

use super::event::{ContextEvent, ContextStatus, EventKind, Thought, ThoughtKind};
use super::log::AppendLog;
use super::summary::ExecutionSummary;

pub const DEFAULT_EVENT_WINDOW: usize = 10;

/// 执行上下文
///
/// 一次端到端请求的完整运行记录。`prompt` 在创建后不可变；
/// 任务顺序为分解顺序而非执行顺序。
#[derive(Debug)]
pub struct ExecutionContext {
    id: String,
    prompt: String,
    tasks: Vec<Task>,
    results: BTreeMap<String, TaskOutcome>,
    decisions: BTreeMap<String, bool>,
    thoughts: AppendLog<Thought>,
    events: AppendLog<ContextEvent>,
    status: ContextStatus,
    current_step: usize,
    created_at: u64,
    started: Instant,
    event_window: usize,
}

impl ExecutionContext {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            tasks: Vec::new(),
            results: BTreeMap::new(),
            decisions: BTreeMap::new(),
            thoughts: AppendLog::new(),
            events: AppendLog::new(),
            status: ContextStatus::Initializing,
            current_step: 0,
            created_at: now_millis(),
            started: Instant::now(),
            event_window: DEFAULT_EVENT_WINDOW,
        }
    }

    pub fn with_event_window(mut self, window: usize) -> Self {
        self.event_window = window.max(1);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn status(&self) -> ContextStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn total_steps(&self) -> usize {
        self.tasks.len()
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn results(&self) -> &BTreeMap<String, TaskOutcome> {
        &self.results
    }

    pub fn decisions(&self) -> &BTreeMap<String, bool> {
        &self.decisions
    }

    pub fn decision(&self, key: &str) -> Option<bool> {
        self.decisions.get(key).copied()
    }

    pub fn set_decision(&mut self, key: impl Into<String>, value: bool) {
        self.decisions.insert(key.into(), value);
    }

    pub fn thoughts(&self) -> &AppendLog<Thought> {
        &self.thoughts
    }

    pub fn events(&self) -> &AppendLog<ContextEvent> {
        &self.events
    }

    pub fn assign_agent(&mut self, task_id: &str, agent_id: impl Into<String>) -> Result<()> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| TaskMeshError::Other(anyhow::anyhow!("unknown task `{task_id}`")))?;
        task.assigned_agent_id = Some(agent_id.into());
        Ok(())
    }

    /// 将任务标记为运行中，并推进步数计数
    pub fn start_task(&mut self, task_id: &str) -> Result<()> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| TaskMeshError::Other(anyhow::anyhow!("unknown task `{task_id}`")))?;
        task.transition(TaskStatus::Running)?;
        self.current_step += 1;
        Ok(())
    }

    pub fn finish_task(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        outcome: TaskOutcome,
    ) -> Result<()> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| TaskMeshError::Other(anyhow::anyhow!("unknown task `{task_id}`")))?;
        task.transition(status)?;
        task.result = Some(outcome.clone());
        self.results.insert(task_id.to_string(), outcome);
        Ok(())
    }

    /// 阶段切换，同时追加 `status_changed` 事件
    pub fn set_status(&mut self, status: ContextStatus, message: impl Into<String>) -> ContextEvent {
        self.status = status;
        self.push_event(EventKind::StatusChanged {
            status,
            message: message.into(),
        })
    }

    pub fn push_event(&mut self, kind: EventKind) -> ContextEvent {
        let event = ContextEvent::new(kind);
        self.events.append(event.clone());
        event
    }

    pub fn add_thought(&mut self, kind: ThoughtKind, content: impl Into<String>, metadata: Value) {
        self.thoughts.append(Thought::new(kind, content, metadata));
    }

    pub fn agents_used(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter_map(|t| t.assigned_agent_id.clone())
            .collect()
    }

    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary {
            context_id: self.id.clone(),
            prompt: self.prompt.clone(),
            status: self.status,
            current_step: self.current_step,
            total_steps: self.total_steps(),
            tasks: self.tasks.clone(),
            results: self.results.clone(),
            decisions: self.decisions.clone(),
            elapsed_ms: self.elapsed_ms(),
            events: self.events.recent(self.event_window),
            thought_process: self.thoughts.all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;
    use serde_json::json;

    #[test]
    fn test_summary_caps_events() {
        let mut ctx = ExecutionContext::new("ctx_1", "book a ride");
        for i in 0..15 {
            ctx.push_event(EventKind::ConditionNotMet {
                reason: format!("r{i}"),
            });
        }
        let summary = ctx.summary();
        assert_eq!(summary.events.len(), 10);
        assert_eq!(ctx.events().len(), 15);
        assert_eq!(
            summary.events.last().map(|e| e.kind.clone()),
            Some(EventKind::ConditionNotMet {
                reason: "r14".to_string()
            })
        );
    }

    #[test]
    fn test_summary_reflects_last_transition() {
        let mut ctx = ExecutionContext::new("ctx_1", "book a ride");
        ctx.add_task(Task::new("task_1", TaskKind::Booking, "Book ride"));
        ctx.start_task("task_1").unwrap();
        assert_eq!(ctx.summary().tasks[0].status, TaskStatus::Running);

        ctx.finish_task(
            "task_1",
            TaskStatus::Completed,
            TaskOutcome::success(json!({"booking_id": "RIDE-1"})),
        )
        .unwrap();
        let summary = ctx.summary();
        assert_eq!(summary.tasks[0].status, TaskStatus::Completed);
        assert_eq!(summary.current_step, 1);
        assert_eq!(summary.total_steps, 1);
        assert!(summary.results.contains_key("task_1"));
    }

    #[test]
    fn test_set_status_appends_event() {
        let mut ctx = ExecutionContext::new("ctx_1", "hello");
        ctx.set_status(ContextStatus::Decomposing, "Breaking down your request...");
        assert_eq!(ctx.status(), ContextStatus::Decomposing);
        assert_eq!(ctx.events().len(), 1);
        assert!(!ctx.is_terminal());
    }
}
