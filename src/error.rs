use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskMeshError>;

#[derive(Debug, Error)]
pub enum TaskMeshError {
    #[error("Agent {0} not found")]
    AgentNotFound(String),
    #[error("invalid status transition for task `{task}` from `{from}` to `{to}`")]
    InvalidTransition {
        task: String,
        from: String,
        to: String,
    },
    #[error("decomposition failed: {0}")]
    Decomposition(String),
    #[error("registry error: {0}")]
    Registry(String),
    #[error("language model error: {0}")]
    Llm(String),
    #[error("telemetry error: {0}")]
    Telemetry(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for TaskMeshError {
    fn from(err: serde_json::Error) -> Self {
        TaskMeshError::Serialization(err.to_string())
    }
}
