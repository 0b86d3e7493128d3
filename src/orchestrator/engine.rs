use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};

use crate::config::OrchestratorConfig;
use crate::context::{
    ContextStatus, ContextStore, ExecutionContext, ExecutionSummary, SharedContext, ThoughtKind,
};
use crate::error::Result;
use crate::llm::DynLlmClient;
use crate::registry::{AgentDescriptor, DynAgentRegistry, MarketplaceStats, SearchQuery};

use super::assign::assign_agents;
use super::decomposer::Decomposer;
use super::executor::GraphExecutor;
use super::policy::ContinuationPolicy;
use super::synthesis::synthesize;
use super::telemetry::{DynTelemetrySink, RunRecord, TracingTelemetry};
use super::updates::{note, ContextUpdate, UpdateBus};

const RESULT_PREVIEW_LEN: usize = 100;
pub const DEFAULT_TOP_K: usize = 3;

/// `process_prompt` 的返回值；失败时同样携带部分摘要
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptResponse {
    pub success: bool,
    pub context_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_summary: ExecutionSummary,
}

/// 编排器：分解 → 指派 → 执行 → 汇总 → 记录
///
/// 所有协作方通过构造注入；多个请求可以并发调用 `process_prompt`，
/// 各自拥有独立的上下文，只共享只读的注册表。
pub struct Orchestrator {
    registry: DynAgentRegistry,
    decomposer: Decomposer,
    reasoner: Option<DynLlmClient>,
    telemetry: DynTelemetrySink,
    policy: ContinuationPolicy,
    config: OrchestratorConfig,
    contexts: Arc<ContextStore>,
    bus: UpdateBus,
}

impl Orchestrator {
    pub fn new(registry: DynAgentRegistry) -> Self {
        let config = OrchestratorConfig::default();
        Self {
            registry,
            decomposer: Decomposer::default(),
            reasoner: None,
            telemetry: Arc::new(TracingTelemetry),
            policy: ContinuationPolicy::default(),
            contexts: Arc::new(ContextStore::new(config.max_contexts)),
            config,
            bus: UpdateBus::default(),
        }
    }

    /// 替换配置；上下文存储按新的保留上限重建
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.contexts = Arc::new(ContextStore::new(config.max_contexts));
        self.config = config;
        self
    }

    /// 任务分解使用的语言模型
    pub fn with_planner(mut self, planner: DynLlmClient) -> Self {
        self.decomposer = Decomposer::new(Some(planner));
        self
    }

    /// 兜底推理使用的语言模型
    pub fn with_reasoner(mut self, reasoner: DynLlmClient) -> Self {
        self.reasoner = Some(reasoner);
        self
    }

    /// 分解与兜底共用同一个模型
    pub fn with_llm(self, llm: DynLlmClient) -> Self {
        self.with_planner(Arc::clone(&llm)).with_reasoner(llm)
    }

    pub fn with_telemetry(mut self, telemetry: DynTelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_policy(mut self, policy: ContinuationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn contexts(&self) -> &Arc<ContextStore> {
        &self.contexts
    }

    /// 订阅所有上下文的生命周期事件
    pub fn subscribe(&self) -> broadcast::Receiver<ContextUpdate> {
        self.bus.subscribe()
    }

    #[instrument(skip(self), fields(context_id = tracing::field::Empty))]
    pub async fn process_prompt(&self, prompt: &str) -> PromptResponse {
        let context_id = self.contexts.next_id();
        tracing::Span::current().record("context_id", context_id.as_str());

        let ctx = self.contexts.insert(
            ExecutionContext::new(context_id.clone(), prompt)
                .with_event_window(self.config.event_window),
        );
        info!("processing prompt");

        let outcome = self.run_pipeline(prompt, &ctx).await;
        let (result, error) = match outcome {
            Ok(text) => (Some(text), None),
            Err(err) => {
                error!(error = %err, "orchestration failed");
                self.bus
                    .status(&ctx, ContextStatus::Failed, &format!("Error: {err}"));
                (None, Some(err.to_string()))
            }
        };

        self.record_telemetry(&ctx, result.clone()).await;

        let execution_summary = ctx.read().summary();
        PromptResponse {
            success: error.is_none(),
            context_id,
            result,
            error,
            execution_summary,
        }
    }

    async fn run_pipeline(&self, prompt: &str, ctx: &SharedContext) -> Result<String> {
        self.bus.status(
            ctx,
            ContextStatus::Decomposing,
            "Breaking down your request...",
        );
        note(
            ctx,
            ThoughtKind::Reasoning,
            format!("Analyzing user command: '{prompt}'"),
        );
        let tasks = self.decomposer.decompose(prompt, ctx).await;
        {
            let mut guard = ctx.write();
            let count = tasks.len();
            for task in tasks {
                guard.add_task(task);
            }
            guard.add_thought(
                ThoughtKind::Reasoning,
                format!("Identified {count} subtasks to execute"),
                serde_json::Value::Null,
            );
        }

        self.bus.status(
            ctx,
            ContextStatus::Discovering,
            "Finding agents for each task...",
        );
        note(
            ctx,
            ThoughtKind::Reasoning,
            "Searching the registry for specialized agents",
        );
        assign_agents(self.registry.as_ref(), ctx, &self.bus, self.config.min_rating).await?;

        self.bus
            .status(ctx, ContextStatus::Executing, "Executing tasks...");
        note(
            ctx,
            ThoughtKind::Reasoning,
            "Beginning task execution with dependency management",
        );
        let executor = GraphExecutor::new(
            self.registry.as_ref(),
            self.reasoner.as_ref(),
            &self.policy,
            &self.bus,
            self.config.funds_threshold,
        );
        let outcome = executor.execute(ctx).await?;

        self.bus.status(
            ctx,
            ContextStatus::Synthesizing,
            "Generating final response...",
        );
        note(
            ctx,
            ThoughtKind::Reasoning,
            "Synthesizing results into human-readable format",
        );
        let text = {
            let guard = ctx.read();
            synthesize(guard.tasks(), &outcome)
        };

        self.bus
            .status(ctx, ContextStatus::Completed, "Task completed successfully!");
        let preview: String = text.chars().take(RESULT_PREVIEW_LEN).collect();
        note(ctx, ThoughtKind::Result, format!("Final result: {preview}"));
        info!(
            processed = outcome.processed(),
            aborted = outcome.aborted,
            blocked = outcome.blocked.len(),
            "orchestration completed"
        );
        Ok(text)
    }

    async fn record_telemetry(&self, ctx: &SharedContext, final_result: Option<String>) {
        let record = RunRecord::from_context(&ctx.read(), final_result);
        if let Err(err) = self.telemetry.record(&record).await {
            warn!(context_id = %record.context_id, error = %err, "failed to record telemetry");
        }
    }

    /// 进度查询；未知 id 返回 `None`
    pub fn get_context_status(&self, context_id: &str) -> Option<ExecutionSummary> {
        self.contexts.summary(context_id)
    }

    pub fn list_agents(&self, category: Option<&str>) -> Vec<AgentDescriptor> {
        self.registry.list(category)
    }

    pub fn get_agent(&self, agent_id: &str) -> Option<AgentDescriptor> {
        self.registry.get(agent_id)
    }

    pub fn marketplace_stats(&self) -> MarketplaceStats {
        self.registry.stats()
    }

    pub async fn search_agents(&self, query: &SearchQuery) -> Result<Vec<AgentDescriptor>> {
        self.registry.search(query).await
    }

    /// 按任务描述检索，返回前 `top_k` 个候选
    pub async fn find_agents(
        &self,
        description: &str,
        top_k: usize,
    ) -> Result<Vec<AgentDescriptor>> {
        let mut agents = self.registry.search(&SearchQuery::new(description)).await?;
        agents.truncate(top_k);
        Ok(agents)
    }
}
