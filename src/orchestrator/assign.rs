use serde_json::json;
use tracing::{debug, info};

use crate::context::{EventKind, SharedContext, ThoughtKind};
use crate::error::Result;
use crate::registry::{AgentRegistry, SearchQuery};

use super::rules::agent_query;
use super::updates::{note_with, UpdateBus};

/// 为每个任务检索并指派排名第一的 Agent；检索为空时保持未指派
pub async fn assign_agents(
    registry: &dyn AgentRegistry,
    ctx: &SharedContext,
    bus: &UpdateBus,
    min_rating: f64,
) -> Result<usize> {
    let tasks: Vec<_> = ctx
        .read()
        .tasks()
        .iter()
        .map(|t| (t.id.clone(), t.kind.clone(), t.description.clone()))
        .collect();

    let mut assigned = 0;
    for (task_id, kind, description) in tasks {
        let query = agent_query(&kind, &description);
        let candidates = registry
            .search(&SearchQuery::new(query.as_str()).with_min_rating(min_rating))
            .await?;

        match candidates.into_iter().next() {
            Some(best) => {
                ctx.write().assign_agent(&task_id, best.id.clone())?;
                bus.event(
                    ctx,
                    EventKind::AgentAssigned {
                        task_id: task_id.clone(),
                        agent: best.name.clone(),
                    },
                );
                note_with(
                    ctx,
                    ThoughtKind::Decision,
                    format!("Selected {} for {task_id} ({kind})", best.name),
                    json!({ "agent_id": best.id, "rating": best.rating, "query": query }),
                );
                debug!(task_id = %task_id, agent_id = %best.id, "agent assigned");
                assigned += 1;
            }
            None => {
                note_with(
                    ctx,
                    ThoughtKind::Decision,
                    format!("No agent found for {task_id} ({kind})"),
                    json!({ "query": query }),
                );
            }
        }
    }

    info!(assigned, "agent discovery finished");
    Ok(assigned)
}
