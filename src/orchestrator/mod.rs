// 编排核心：分解、指派、图执行、兜底与汇总

mod assign;
mod decomposer;
mod engine;
mod executor;
mod parse;
mod policy;
mod rules;
mod synthesis;
mod telemetry;
mod updates;

pub use assign::assign_agents;
pub use decomposer::{decomposition_prompt, normalize_specs, parse_task_specs, Decomposer};
pub use engine::{Orchestrator, PromptResponse, DEFAULT_TOP_K};
pub use executor::{ExecutionOutcome, ExecutionRecord, GraphExecutor, FALLBACK_SOURCE, SKIP_REASON};
pub use parse::{clean_response, parse_structured};
pub use policy::{
    derive_decision, ContinuationPolicy, ContinuationRule, PromptGate, COURT_DRY,
    DEFAULT_FUNDS_THRESHOLD, SUFFICIENT_FUNDS,
};
pub use rules::{agent_query, has_conditional_marker, rule_based_specs, KeywordRule, TASK_RULES};
pub use synthesis::{summarize_task, synthesize, GENERIC_SUCCESS};
pub use telemetry::{DynTelemetrySink, RunRecord, TelemetrySink, TracingTelemetry};
pub use updates::{ContextUpdate, UpdateBus};
