// Agent 注册表与匹配排序

mod descriptor;
mod marketplace;
mod matcher;
#[allow(clippy::module_inception)]
mod registry;

pub use descriptor::{AgentDescriptor, AgentReply, ReplyStatus, TaskPayload};
pub use marketplace::{default_catalog, Marketplace};
pub use matcher::{rank, score, ScoredAgent, SearchQuery};
pub use registry::{AgentRegistry, DynAgentRegistry, MarketplaceStats};
