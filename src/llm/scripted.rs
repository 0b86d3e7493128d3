use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::LlmClient;
use super::types::{LlmRequest, LlmResponse};
use crate::error::{Result, TaskMeshError};

/// 按顺序回放预设回复的客户端；队列耗尽后返回错误
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().push_back(Ok(reply.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .push_back(Err(TaskMeshError::Llm(message.into())));
    }

    /// 已收到的提示词
    pub fn prompts(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.user.clone()).collect()
    }

    /// 完整请求，含系统提示与温度
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().push(request);
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TaskMeshError::Llm("no scripted reply left".to_string())))?;
        Ok(LlmResponse {
            content: reply,
            metadata: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_then_fails() {
        let client = ScriptedClient::new(["first"]);
        client.push_failure("offline");
        assert_eq!(client.generate("a").await.unwrap(), "first");
        assert!(client.generate("b").await.is_err());
        assert!(client.generate("c").await.is_err());
        assert_eq!(client.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_records_system_and_temperature() {
        let client = ScriptedClient::new(["ok"]);
        client
            .complete(LlmRequest::user("plan").with_system("planner").with_temperature(0.0))
            .await
            .unwrap();
        let request = &client.requests()[0];
        assert_eq!(request.system.as_deref(), Some("planner"));
        assert_eq!(request.temperature, 0.0);
    }
}
