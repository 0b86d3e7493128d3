// 配置模块

mod env;
mod settings;

pub use env::EnvConfig;
pub use settings::{LlmSettings, OrchestratorConfig};
