use std::sync::Arc;

use async_trait::async_trait;

use super::types::{LlmRequest, LlmResponse};
use crate::error::Result;

/// 语言模型边界：任务分解与兜底推理共用
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// 纯文本生成的便捷入口
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(self.complete(LlmRequest::user(prompt)).await?.content)
    }
}

pub type DynLlmClient = Arc<dyn LlmClient>;
