use serde_json::Value;
use tokio::sync::broadcast;

use crate::context::{ContextEvent, ContextStatus, EventKind, SharedContext, ThoughtKind};

const UPDATE_CAPACITY: usize = 256;

/// 推送给订阅方的上下文更新
#[derive(Clone, Debug)]
pub struct ContextUpdate {
    pub context_id: String,
    pub event: ContextEvent,
}

/// 事件写入上下文后同时广播；没有订阅方时直接丢弃
#[derive(Clone)]
pub struct UpdateBus {
    tx: broadcast::Sender<ContextUpdate>,
}

impl Default for UpdateBus {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(UPDATE_CAPACITY);
        Self { tx }
    }
}

impl UpdateBus {
    pub fn subscribe(&self) -> broadcast::Receiver<ContextUpdate> {
        self.tx.subscribe()
    }

    fn publish(&self, context_id: String, event: ContextEvent) {
        let _ = self.tx.send(ContextUpdate { context_id, event });
    }

    pub fn event(&self, ctx: &SharedContext, kind: EventKind) {
        let (id, event) = {
            let mut guard = ctx.write();
            let event = guard.push_event(kind);
            (guard.id().to_string(), event)
        };
        self.publish(id, event);
    }

    pub fn status(&self, ctx: &SharedContext, status: ContextStatus, message: &str) {
        let (id, event) = {
            let mut guard = ctx.write();
            let event = guard.set_status(status, message);
            (guard.id().to_string(), event)
        };
        self.publish(id, event);
    }
}

/// 追加一条思考记录
pub(crate) fn note(ctx: &SharedContext, kind: ThoughtKind, content: impl Into<String>) {
    ctx.write().add_thought(kind, content, Value::Null);
}

pub(crate) fn note_with(
    ctx: &SharedContext,
    kind: ThoughtKind,
    content: impl Into<String>,
    metadata: Value,
) {
    ctx.write().add_thought(kind, content, metadata);
}
