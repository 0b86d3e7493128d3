use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::context::{EventKind, SharedContext, ThoughtKind};
use crate::error::{Result, TaskMeshError};
use crate::llm::{DynLlmClient, LlmRequest};
use crate::registry::{AgentRegistry, TaskPayload};
use crate::task::{Task, TaskKind, TaskOutcome, TaskStatus};

use super::parse::parse_structured;
use super::policy::{derive_decision, ContinuationPolicy};
use super::updates::{note, note_with, UpdateBus};

pub const SKIP_REASON: &str = "Conditional requirement not met";
pub const FALLBACK_SOURCE: &str = "fallback";
const FALLBACK_SYSTEM: &str = "You stand in for an unavailable agent and reply with JSON only.";
const PREVIEW_LEN: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub task_id: String,
    pub task_type: TaskKind,
    pub result: TaskOutcome,
}

/// 图执行结果
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub execution_log: Vec<ExecutionRecord>,
    pub decisions: BTreeMap<String, bool>,
    pub aborted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// 因依赖无法满足而未运行的任务
    #[serde(default)]
    pub blocked: Vec<String>,
}

impl ExecutionOutcome {
    pub fn processed(&self) -> usize {
        self.execution_log.len()
    }

    pub fn is_incomplete(&self) -> bool {
        !self.blocked.is_empty()
    }
}

fn fallback_prompt(task: &Task, prompt: &str) -> String {
    format!(
        "You are helping with one step of a multi-agent orchestration.\n\n\
         Task Type: {kind}\n\
         Task Description: {description}\n\
         User Context: {prompt}\n\n\
         Please provide a realistic response for this task. If it involves:\n\
         - Camera analysis: include `analysis` and `confidence`\n\
         - Wallet check: include `balance`, `currency` and `sufficient`\n\
         - Ride booking: include `booking_id`, `eta` and `driver`\n\
         - Weather: include `condition` and `temperature`\n\n\
         Respond in JSON format matching what the agent would return.",
        kind = task.kind,
        description = task.description,
    )
}

fn preview(value: &serde_json::Value) -> String {
    value.to_string().chars().take(PREVIEW_LEN).collect()
}

/// 按依赖顺序执行任务图
///
/// 同一上下文内的任务串行执行；只在调用注册表与推理服务时让出。
pub struct GraphExecutor<'a> {
    registry: &'a dyn AgentRegistry,
    reasoner: Option<&'a DynLlmClient>,
    policy: &'a ContinuationPolicy,
    bus: &'a UpdateBus,
    funds_threshold: f64,
}

impl<'a> GraphExecutor<'a> {
    pub fn new(
        registry: &'a dyn AgentRegistry,
        reasoner: Option<&'a DynLlmClient>,
        policy: &'a ContinuationPolicy,
        bus: &'a UpdateBus,
        funds_threshold: f64,
    ) -> Self {
        Self {
            registry,
            reasoner,
            policy,
            bus,
            funds_threshold,
        }
    }

    /// 反复扫描任务列表，依赖全部“已处理”（完成或失败）的任务即可运行。
    /// 一轮扫描没有进展时停止，剩余任务标记为 `blocked`。
    pub async fn execute(&self, ctx: &SharedContext) -> Result<ExecutionOutcome> {
        let (prompt, order) = {
            let guard = ctx.read();
            let order: Vec<String> = guard.tasks().iter().map(|t| t.id.clone()).collect();
            (guard.prompt().to_string(), order)
        };

        let mut outcome = ExecutionOutcome::default();
        let mut processed: Vec<String> = Vec::with_capacity(order.len());

        while processed.len() < order.len() {
            let mut progress = false;

            for task_id in &order {
                if processed.contains(task_id) {
                    continue;
                }
                let task = {
                    let guard = ctx.read();
                    match guard.task(task_id) {
                        Some(task) if task.is_ready(&processed) => task.clone(),
                        _ => continue,
                    }
                };

                ctx.write().start_task(task_id)?;
                self.bus.event(
                    ctx,
                    EventKind::TaskStarted {
                        task_id: task_id.clone(),
                        description: task.description.clone(),
                    },
                );
                debug!(task_id = %task_id, kind = %task.kind, "task started");

                let result = self.execute_task(&task, ctx).await;
                let status = if result.is_error() {
                    TaskStatus::Failed
                } else {
                    TaskStatus::Completed
                };

                let decisions = {
                    let mut guard = ctx.write();
                    guard.finish_task(task_id, status, result.clone())?;
                    if let Some((key, value)) =
                        derive_decision(&task.kind, &result, self.funds_threshold)
                    {
                        guard.set_decision(key, value);
                    }
                    guard.decisions().clone()
                };
                self.bus.event(
                    ctx,
                    EventKind::TaskFinished {
                        task_id: task_id.clone(),
                        status,
                    },
                );

                outcome.execution_log.push(ExecutionRecord {
                    task_id: task_id.clone(),
                    task_type: task.kind.clone(),
                    result,
                });
                processed.push(task_id.clone());
                progress = true;

                if let Some(reason) = self.policy.check(&prompt, &task.kind, &decisions) {
                    info!(task_id = %task_id, reason, "continuation policy aborted execution");
                    self.abort(ctx, &processed, reason)?;
                    outcome.decisions = decisions;
                    outcome.aborted = true;
                    outcome.reason = Some(reason.to_string());
                    return Ok(outcome);
                }
            }

            if !progress {
                break;
            }
        }

        outcome.blocked = self.mark_blocked(ctx, &processed)?;
        outcome.decisions = ctx.read().decisions().clone();
        Ok(outcome)
    }

    fn abort(&self, ctx: &SharedContext, processed: &[String], reason: &str) -> Result<()> {
        self.bus.event(
            ctx,
            EventKind::ConditionNotMet {
                reason: reason.to_string(),
            },
        );
        let mut guard = ctx.write();
        let remaining: Vec<String> = guard
            .tasks()
            .iter()
            .filter(|t| !processed.contains(&t.id))
            .map(|t| t.id.clone())
            .collect();
        for task_id in &remaining {
            guard.finish_task(task_id, TaskStatus::Skipped, TaskOutcome::skipped(SKIP_REASON))?;
        }
        guard.add_thought(
            ThoughtKind::Decision,
            format!("Stopping execution: {reason}"),
            json!({ "skipped": remaining }),
        );
        Ok(())
    }

    fn mark_blocked(&self, ctx: &SharedContext, processed: &[String]) -> Result<Vec<String>> {
        let mut guard = ctx.write();
        let blocked: Vec<String> = guard
            .tasks()
            .iter()
            .filter(|t| !processed.contains(&t.id) && t.status == TaskStatus::Pending)
            .map(|t| t.id.clone())
            .collect();
        for task_id in &blocked {
            let task = guard
                .task_mut(task_id)
                .ok_or_else(|| TaskMeshError::Other(anyhow::anyhow!("unknown task `{task_id}`")))?;
            task.transition(TaskStatus::Blocked)?;
        }
        if !blocked.is_empty() {
            warn!(blocked = ?blocked, "task graph made no progress");
            guard.add_thought(
                ThoughtKind::Decision,
                "Some tasks could not run because their dependencies never completed",
                json!({ "blocked": blocked }),
            );
        }
        Ok(blocked)
    }

    /// 执行单个任务；指派的 Agent 不可用或失败时走一次兜底推理，不重试 Agent
    pub async fn execute_task(&self, task: &Task, ctx: &SharedContext) -> TaskOutcome {
        let Some(agent_id) = task.assigned_agent_id.clone() else {
            note(
                ctx,
                ThoughtKind::Decision,
                format!("No agent assigned for {}, attempting fallback", task.id),
            );
            return self.fallback(task, ctx).await;
        };

        let agent_name = self
            .registry
            .get(&agent_id)
            .map(|a| a.name)
            .unwrap_or_else(|| agent_id.clone());
        note_with(
            ctx,
            ThoughtKind::AgentCall,
            format!("Calling {agent_name} for {}", task.kind),
            json!({ "agent_id": agent_id, "task_id": task.id }),
        );

        let payload = TaskPayload {
            task_id: task.id.clone(),
            description: task.description.clone(),
            prompt_context: ctx.read().prompt().to_string(),
        };

        let failure = match self.registry.execute(&agent_id, &payload).await {
            Ok(reply) if !reply.is_error() => {
                note_with(
                    ctx,
                    ThoughtKind::AgentCall,
                    format!("{agent_name} completed successfully"),
                    json!({ "result_preview": preview(&reply.result) }),
                );
                return TaskOutcome::success(reply.result).with_agent(agent_id);
            }
            Ok(reply) => reply
                .error
                .unwrap_or_else(|| "agent reported an error".to_string()),
            Err(err) => err.to_string(),
        };

        warn!(task_id = %task.id, agent_id = %agent_id, error = %failure, "agent execution failed");
        note_with(
            ctx,
            ThoughtKind::Fallback,
            format!("Agent {agent_name} failed, using fallback"),
            json!({ "error": failure }),
        );
        self.fallback(task, ctx).await
    }

    async fn fallback(&self, task: &Task, ctx: &SharedContext) -> TaskOutcome {
        let Some(reasoner) = self.reasoner else {
            note(
                ctx,
                ThoughtKind::Fallback,
                "Fallback unavailable: no reasoning service configured",
            );
            return TaskOutcome::error("No agent available and reasoning service not configured");
        };

        note(
            ctx,
            ThoughtKind::Fallback,
            format!("Using reasoning service to handle {}", task.kind),
        );
        let prompt = ctx.read().prompt().to_string();

        let request =
            LlmRequest::user(fallback_prompt(task, &prompt)).with_system(FALLBACK_SYSTEM);
        match reasoner.complete(request).await.map(|response| response.content) {
            Ok(text) => {
                let data = parse_structured(&text).unwrap_or_else(|| {
                    json!({ "fallbackResponse": text, "generatedBy": FALLBACK_SOURCE })
                });
                note(ctx, ThoughtKind::Fallback, "Reasoning service provided fallback response");
                TaskOutcome::success(data).from_fallback(FALLBACK_SOURCE)
            }
            Err(err) => {
                warn!(task_id = %task.id, error = %err, "fallback failed");
                note_with(
                    ctx,
                    ThoughtKind::Fallback,
                    format!("Fallback also failed: {err}"),
                    json!({ "error": err.to_string() }),
                );
                TaskOutcome::error(format!("Fallback failed: {err}"))
            }
        }
    }
}
