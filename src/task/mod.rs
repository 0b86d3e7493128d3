// 任务数据模型

mod kind;
mod outcome;
#[allow(clippy::module_inception)]
mod task;

pub use kind::TaskKind;
pub use outcome::{OutcomeStatus, TaskOutcome};
pub use task::{Task, TaskSpec, TaskStatus};
