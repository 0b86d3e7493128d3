use std::fmt::Write;

use crate::orchestrator::PromptResponse;
use crate::registry::{AgentDescriptor, MarketplaceStats};
use crate::task::TaskStatus;

/// Agent 列表的纯文本表格
pub fn render_agents(agents: &[AgentDescriptor]) -> String {
    if agents.is_empty() {
        return "no agents found\n".to_string();
    }
    let mut out = String::new();
    for agent in agents {
        let _ = writeln!(
            out,
            "{:<14} {:<24} {:.1}  ${:<6.2} {}",
            agent.id,
            agent.name,
            agent.rating,
            agent.cost,
            agent.capabilities.join(", ")
        );
    }
    out
}

pub fn render_stats(stats: &MarketplaceStats) -> String {
    let mut out = format!(
        "total agents: {}\naverage rating: {:.2}\n",
        stats.total_agents, stats.average_rating
    );
    for (category, count) in &stats.categories {
        let _ = writeln!(out, "  {category}: {count}");
    }
    out
}

/// 一次运行的简要报告：任务状态 + 最终结果
pub fn render_response(response: &PromptResponse) -> String {
    let summary = &response.execution_summary;
    let mut out = format!("context: {} [{}]\n", response.context_id, summary.status);
    for task in &summary.tasks {
        let marker = match task.status {
            TaskStatus::Completed => "ok",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Pending | TaskStatus::Running => "-",
        };
        let _ = writeln!(
            out,
            "  {:<8} {:<8} {:<14} {}",
            task.id,
            marker,
            task.kind,
            task.assigned_agent_id.as_deref().unwrap_or("(none)")
        );
    }
    match (&response.result, &response.error) {
        (Some(result), _) => {
            let _ = writeln!(out, "\n{result}");
        }
        (None, Some(error)) => {
            let _ = writeln!(out, "\nerror: {error}");
        }
        (None, None) => {}
    }
    out
}
