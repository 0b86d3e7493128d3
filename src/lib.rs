pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod registry;
pub mod task;
pub mod utils;

pub use config::{EnvConfig, LlmSettings, OrchestratorConfig};
pub use context::{
    AppendLog, ContextEvent, ContextStatus, ContextStore, EventKind, ExecutionContext,
    ExecutionSummary, SharedContext, Thought, ThoughtKind,
};
pub use error::{Result, TaskMeshError};
pub use llm::{DynLlmClient, LlmClient, LlmRequest, LlmResponse, LocalEchoClient, ScriptedClient};
#[cfg(feature = "openai-client")]
pub use llm::OpenAiClient;
pub use orchestrator::{
    ContextUpdate, ContinuationPolicy, ContinuationRule, Decomposer, DynTelemetrySink,
    ExecutionOutcome, ExecutionRecord, GraphExecutor, Orchestrator, PromptGate, PromptResponse,
    RunRecord, TelemetrySink, TracingTelemetry, UpdateBus,
};
pub use registry::{
    AgentDescriptor, AgentRegistry, AgentReply, DynAgentRegistry, Marketplace, MarketplaceStats,
    ReplyStatus, SearchQuery, TaskPayload,
};
pub use task::{OutcomeStatus, Task, TaskKind, TaskOutcome, TaskSpec, TaskStatus};
pub use utils::{logging, validation};
