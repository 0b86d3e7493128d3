// 语言模型客户端

mod client;
mod echo;
#[cfg(feature = "openai-client")]
mod openai;
mod scripted;
mod types;

pub use client::{DynLlmClient, LlmClient};
pub use echo::LocalEchoClient;
#[cfg(feature = "openai-client")]
pub use openai::OpenAiClient;
pub use scripted::ScriptedClient;
pub use types::{LlmRequest, LlmResponse};
