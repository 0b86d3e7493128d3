use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::{ContextStatus, ExecutionContext, Thought};
use crate::error::Result;
use crate::task::Task;

/// 一次编排运行结束后的记录
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub context_id: String,
    pub prompt: String,
    pub status: ContextStatus,
    pub tasks: Vec<Task>,
    pub thought_log: Vec<Thought>,
    pub agents_used: Vec<String>,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub final_result: Option<String>,
}

impl RunRecord {
    pub fn from_context(ctx: &ExecutionContext, final_result: Option<String>) -> Self {
        Self {
            context_id: ctx.id().to_string(),
            prompt: ctx.prompt().to_string(),
            status: ctx.status(),
            tasks: ctx.tasks().to_vec(),
            thought_log: ctx.thoughts().all(),
            agents_used: ctx.agents_used(),
            elapsed_ms: ctx.elapsed_ms(),
            final_result,
        }
    }
}

/// 遥测落地点；写入失败只记录日志，不影响运行结果
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn record(&self, record: &RunRecord) -> Result<()>;
}

pub type DynTelemetrySink = Arc<dyn TelemetrySink>;

/// 默认实现：以结构化日志输出
#[derive(Default, Clone)]
pub struct TracingTelemetry;

#[async_trait]
impl TelemetrySink for TracingTelemetry {
    async fn record(&self, record: &RunRecord) -> Result<()> {
        info!(
            target: "taskmesh::telemetry",
            context_id = %record.context_id,
            status = %record.status,
            tasks = record.tasks.len(),
            thoughts = record.thought_log.len(),
            agents_used = ?record.agents_used,
            elapsed_ms = record.elapsed_ms,
            "orchestration run recorded"
        );
        Ok(())
    }
}
