// 执行上下文模块

#[allow(clippy::module_inception)]
mod context;
mod event;
mod log;
mod store;
mod summary;

pub use context::{ExecutionContext, DEFAULT_EVENT_WINDOW};
pub use event::{ContextEvent, ContextStatus, EventKind, Thought, ThoughtKind};
pub use log::AppendLog;
pub use store::{ContextStore, SharedContext, DEFAULT_MAX_CONTEXTS};
pub use summary::ExecutionSummary;
