use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::utils::clock::now_millis;

use super::context::ExecutionContext;
use super::summary::ExecutionSummary;

/// 每个上下文一把锁：写者只有所属请求，其它调用方只读轮询
pub type SharedContext = Arc<RwLock<ExecutionContext>>;

pub const DEFAULT_MAX_CONTEXTS: usize = 256;

#[derive(Default)]
struct StoreInner {
    contexts: HashMap<String, SharedContext>,
    order: VecDeque<String>,
}

/// 进程级上下文存储（context id → context）
pub struct ContextStore {
    inner: RwLock<StoreInner>,
    max_contexts: usize,
    sequence: AtomicU64,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXTS)
    }
}

impl ContextStore {
    pub fn new(max_contexts: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            max_contexts: max_contexts.max(1),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("ctx_{}_{seq}", now_millis())
    }

    pub fn insert(&self, context: ExecutionContext) -> SharedContext {
        let id = context.id().to_string();
        let shared = Arc::new(RwLock::new(context));
        let mut inner = self.inner.write();
        if inner.contexts.insert(id.clone(), Arc::clone(&shared)).is_none() {
            inner.order.push_back(id);
        }
        self.evict(&mut inner);
        shared
    }

    pub fn get(&self, id: &str) -> Option<SharedContext> {
        self.inner.read().contexts.get(id).cloned()
    }

    pub fn summary(&self, id: &str) -> Option<ExecutionSummary> {
        self.get(id).map(|ctx| ctx.read().summary())
    }

    pub fn remove(&self, id: &str) -> Option<SharedContext> {
        let mut inner = self.inner.write();
        inner.order.retain(|existing| existing != id);
        inner.contexts.remove(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.read().order.iter().cloned().collect()
    }

    /// 超出容量时按插入顺序淘汰已结束的上下文，运行中的上下文保留
    fn evict(&self, inner: &mut StoreInner) {
        while inner.contexts.len() > self.max_contexts {
            let victim = inner.order.iter().position(|id| {
                inner
                    .contexts
                    .get(id)
                    .map(|ctx| ctx.read().is_terminal())
                    .unwrap_or(true)
            });
            let Some(index) = victim else {
                break;
            };
            if let Some(id) = inner.order.remove(index) {
                inner.contexts.remove(&id);
                debug!(context_id = %id, "evicted terminal context");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextStatus;

    #[test]
    fn test_insert_and_get() {
        let store = ContextStore::default();
        let id = store.next_id();
        store.insert(ExecutionContext::new(id.clone(), "hello"));
        assert!(store.get(&id).is_some());
        assert_eq!(store.summary(&id).map(|s| s.prompt), Some("hello".to_string()));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let store = ContextStore::default();
        assert_ne!(store.next_id(), store.next_id());
    }

    #[test]
    fn test_evicts_only_terminal_contexts() {
        let store = ContextStore::new(2);
        let first = store.insert(ExecutionContext::new("a", "one"));
        store.insert(ExecutionContext::new("b", "two"));
        store.insert(ExecutionContext::new("c", "three"));
        // nothing terminal yet
        assert_eq!(store.len(), 3);

        first.write().set_status(ContextStatus::Completed, "done");
        store.insert(ExecutionContext::new("d", "four"));
        assert!(store.get("a").is_none());
        assert_eq!(store.ids(), vec!["b", "c", "d"]);
    }
}
