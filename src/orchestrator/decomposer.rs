use std::collections::HashSet;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::context::{SharedContext, ThoughtKind};
use crate::error::{Result, TaskMeshError};
use crate::llm::{DynLlmClient, LlmRequest};
use crate::task::{Task, TaskKind, TaskSpec};

use super::parse::parse_structured;
use super::rules::rule_based_specs;
use super::updates::{note, note_with};

const DECOMPOSITION_TEMPLATE: &str = r#"Analyze this user request and break it down into a sequence of subtasks.
Each task must have a clear type (vision-check, balance-check, booking, weather-check, decision, general).

User Request: "{prompt}"

Return a JSON array of tasks with this format:
[
    {"id": "task_1", "type": "vision-check", "description": "Check if tennis court is dry", "dependencies": []},
    {"id": "task_2", "type": "balance-check", "description": "Verify sufficient balance", "dependencies": ["task_1"]},
    {"id": "task_3", "type": "booking", "description": "Book a ride to the location", "dependencies": ["task_1", "task_2"]}
]

Only return the JSON array, no other text."#;

const DECOMPOSITION_SYSTEM: &str =
    "You break user requests into ordered subtasks and answer with JSON only.";
/// 分解要求输出稳定，温度取 0
const DECOMPOSITION_TEMPERATURE: f32 = 0.0;

pub fn decomposition_prompt(prompt: &str) -> String {
    DECOMPOSITION_TEMPLATE.replace("{prompt}", prompt)
}

/// 解析模型返回的任务数组；空数组视为失败
pub fn parse_task_specs(response: &str) -> Result<Vec<TaskSpec>> {
    let value = parse_structured(response).ok_or_else(|| {
        TaskMeshError::Decomposition("response is not a JSON task array".to_string())
    })?;
    let specs: Vec<TaskSpec> = serde_json::from_value(value)?;
    if specs.is_empty() {
        return Err(TaskMeshError::Decomposition(
            "response contained no tasks".to_string(),
        ));
    }
    Ok(specs)
}

/// 规范化任务集合
///
/// 缺失或重复的 id 改写为 `task_<序号>`；指向不存在任务（或自身）的依赖被移除，
/// 返回值第二项为被移除的 `(任务, 依赖)` 对。
pub fn normalize_specs(specs: Vec<TaskSpec>, prompt: &str) -> (Vec<Task>, Vec<(String, String)>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut renamed: Vec<TaskSpec> = Vec::with_capacity(specs.len());

    for (index, mut spec) in specs.into_iter().enumerate() {
        let trimmed = spec.id.trim().to_string();
        if trimmed.is_empty() || seen.contains(&trimmed) {
            let mut candidate = format!("task_{}", index + 1);
            let mut suffix = 1;
            while seen.contains(&candidate) {
                candidate = format!("task_{}_{suffix}", index + 1);
                suffix += 1;
            }
            spec.id = candidate;
        } else {
            spec.id = trimmed;
        }
        if spec.description.trim().is_empty() {
            spec.description = match spec.kind {
                TaskKind::General => prompt.to_string(),
                ref kind => kind.to_string(),
            };
        }
        seen.insert(spec.id.clone());
        renamed.push(spec);
    }

    let mut dropped = Vec::new();
    let tasks = renamed
        .into_iter()
        .map(|mut spec| {
            let (kept, removed): (Vec<String>, Vec<String>) = spec
                .dependencies
                .drain(..)
                .partition(|dep| dep != &spec.id && seen.contains(dep));
            dropped.extend(removed.into_iter().map(|dep| (spec.id.clone(), dep)));
            spec.dependencies = kept;
            Task::from(spec)
        })
        .collect();

    (tasks, dropped)
}

/// 任务分解器：优先语言模型，失败时退回关键字规则
#[derive(Clone, Default)]
pub struct Decomposer {
    llm: Option<DynLlmClient>,
}

impl Decomposer {
    pub fn new(llm: Option<DynLlmClient>) -> Self {
        Self { llm }
    }

    pub async fn decompose(&self, prompt: &str, ctx: &SharedContext) -> Vec<Task> {
        let specs = match &self.llm {
            Some(llm) => {
                note(
                    ctx,
                    ThoughtKind::Reasoning,
                    "Using language model for task decomposition",
                );
                match self.llm_specs(llm, prompt).await {
                    Ok(specs) => {
                        debug!(count = specs.len(), "language model decomposition succeeded");
                        specs
                    }
                    Err(err) => {
                        warn!(error = %err, "language model decomposition failed, using rules");
                        note_with(
                            ctx,
                            ThoughtKind::Fallback,
                            "Language model decomposition failed, falling back to rule-based decomposition",
                            json!({ "error": err.to_string() }),
                        );
                        rule_based_specs(prompt)
                    }
                }
            }
            None => {
                note(ctx, ThoughtKind::Reasoning, "Using rule-based task decomposition");
                rule_based_specs(prompt)
            }
        };

        let (mut tasks, dropped) = normalize_specs(specs, prompt);
        for (task_id, dep) in &dropped {
            note_with(
                ctx,
                ThoughtKind::Decision,
                format!("Dropped unknown dependency `{dep}` from {task_id}"),
                json!({ "task_id": task_id, "dependency": dep }),
            );
        }

        if tasks.is_empty() {
            tasks.push(Task::new("task_1", TaskKind::General, prompt));
        }
        info!(count = tasks.len(), "prompt decomposed");
        tasks
    }

    async fn llm_specs(&self, llm: &DynLlmClient, prompt: &str) -> Result<Vec<TaskSpec>> {
        let request = LlmRequest::user(decomposition_prompt(prompt))
            .with_system(DECOMPOSITION_SYSTEM)
            .with_temperature(DECOMPOSITION_TEMPERATURE);
        let response = llm.complete(request).await?;
        parse_task_specs(&response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_specs_fenced() {
        let response = r#"```json
[{"task_id": "a", "type": "cctv_check", "description": "look", "dependencies": []},
 {"id": "b", "type": "booking", "description": "ride", "dependencies": ["a"]}]
```"#;
        let specs = parse_task_specs(response).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].kind, TaskKind::VisionCheck);
        assert_eq!(specs[1].dependencies, vec!["a"]);
    }

    #[test]
    fn test_parse_task_specs_rejects_empty_and_prose() {
        assert!(parse_task_specs("[]").is_err());
        assert!(parse_task_specs("I cannot help with that").is_err());
    }

    #[test]
    fn test_normalize_renames_and_drops() {
        let specs = vec![
            TaskSpec::new("a", TaskKind::VisionCheck, "look"),
            TaskSpec::new("a", TaskKind::Booking, "ride")
                .with_dependencies(vec!["a".into(), "ghost".into()]),
            TaskSpec::new("", TaskKind::General, ""),
        ];
        let (tasks, dropped) = normalize_specs(specs, "the prompt");
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "task_2", "task_3"]);
        assert_eq!(tasks[1].dependencies, vec!["a"]);
        assert_eq!(dropped, vec![("task_2".to_string(), "ghost".to_string())]);
        assert_eq!(tasks[2].description, "the prompt");
    }
}
