//! 关键字规则表
//!
//! 任务类型识别、条件标记、类型到检索词的映射都集中在这里，
//! 便于单独测试，也方便以后替换成真正的意图分类器。

use once_cell::sync::Lazy;

use crate::task::{TaskKind, TaskSpec};

/// 条件标记：出现任一词时，后续任务依赖之前的全部任务
pub const CONDITIONAL_MARKERS: &[&str] = &["if", "when", "unless", "provided"];

/// 小写提示词中是否出现任一关键字（子串匹配）
pub fn contains_any(prompt_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| prompt_lower.contains(kw))
}

pub fn has_conditional_marker(prompt: &str) -> bool {
    contains_any(&prompt.to_lowercase(), CONDITIONAL_MARKERS)
}

/// 一条任务识别规则：提示中包含任一 `any_of` 子串且不包含任何 `none_of` 子串时生效
#[derive(Clone, Debug)]
pub struct KeywordRule {
    pub kind: TaskKind,
    pub description: &'static str,
    pub any_of: &'static [&'static str],
    pub none_of: &'static [&'static str],
}

impl KeywordRule {
    pub fn matches(&self, prompt_lower: &str) -> bool {
        contains_any(prompt_lower, self.any_of) && !contains_any(prompt_lower, self.none_of)
    }
}

/// 顺序有意义：视觉 → 余额 → 打车 → 单独天气
pub static TASK_RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    vec![
        KeywordRule {
            kind: TaskKind::VisionCheck,
            description: "Analyze camera feed to determine conditions",
            any_of: &["camera", "cctv", "tennis court", "dry", "wet", "weather"],
            none_of: &[],
        },
        KeywordRule {
            kind: TaskKind::BalanceCheck,
            description: "Check wallet balance",
            any_of: &["wallet", "balance", "funds", "money", "afford"],
            none_of: &[],
        },
        KeywordRule {
            kind: TaskKind::Booking,
            description: "Book ride to destination",
            any_of: &["uber", "ride", "book", "taxi", "drive"],
            none_of: &[],
        },
        KeywordRule {
            kind: TaskKind::WeatherCheck,
            description: "Check weather conditions",
            any_of: &["weather"],
            none_of: &["cctv"],
        },
    ]
});

/// 基于规则的分解；始终至少返回一个任务
pub fn rule_based_specs(prompt: &str) -> Vec<TaskSpec> {
    let prompt_lower = prompt.to_lowercase();
    let conditional = has_conditional_marker(prompt);
    let mut specs: Vec<TaskSpec> = Vec::new();

    for rule in TASK_RULES.iter().filter(|r| r.matches(&prompt_lower)) {
        let dependencies = if conditional {
            specs.iter().map(|s| s.id.clone()).collect()
        } else {
            Vec::new()
        };
        let id = format!("task_{}", specs.len() + 1);
        specs.push(
            TaskSpec::new(id, rule.kind.clone(), rule.description).with_dependencies(dependencies),
        );
    }

    if specs.is_empty() {
        specs.push(TaskSpec::new("task_1", TaskKind::General, prompt));
    }
    specs
}

/// 任务类型 → 注册表检索词；未知类型直接用任务描述
pub fn agent_query(kind: &TaskKind, description: &str) -> String {
    match kind {
        TaskKind::VisionCheck => "cctv vision analysis weather moisture".to_string(),
        TaskKind::BalanceCheck => "wallet balance check funds".to_string(),
        TaskKind::Booking => "uber ride booking transportation".to_string(),
        TaskKind::WeatherCheck => "weather forecast conditions".to_string(),
        TaskKind::Decision => "decision making logic reasoning".to_string(),
        TaskKind::General | TaskKind::Other(_) => description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keywords_yields_single_general_task() {
        let specs = rule_based_specs("Summarize the quarterly report");
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].kind, TaskKind::General);
        assert_eq!(specs[0].description, "Summarize the quarterly report");
        assert!(specs[0].dependencies.is_empty());
    }

    #[test]
    fn test_conditional_prompt_chains_dependencies() {
        let specs = rule_based_specs("book an uber if the court is dry");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].kind, TaskKind::VisionCheck);
        assert_eq!(specs[1].kind, TaskKind::Booking);
        assert_eq!(specs[1].dependencies, vec![specs[0].id.clone()]);
    }

    #[test]
    fn test_each_new_task_depends_on_all_previous() {
        let specs = rule_based_specs("If the court is dry and my wallet has funds, book a taxi");
        let kinds: Vec<_> = specs.iter().map(|s| s.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![TaskKind::VisionCheck, TaskKind::BalanceCheck, TaskKind::Booking]
        );
        assert_eq!(specs[2].dependencies, vec!["task_1", "task_2"]);
    }

    #[test]
    fn test_unconditional_tasks_are_independent() {
        let specs = rule_based_specs("Check wallet balance before booking a ride");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].kind, TaskKind::BalanceCheck);
        assert_eq!(specs[1].kind, TaskKind::Booking);
        assert!(specs.iter().all(|s| s.dependencies.is_empty()));
    }

    #[test]
    fn test_standalone_weather_adds_weather_check() {
        let specs = rule_based_specs("What's the weather like?");
        let kinds: Vec<_> = specs.iter().map(|s| s.kind.clone()).collect();
        assert_eq!(kinds, vec![TaskKind::VisionCheck, TaskKind::WeatherCheck]);

        let with_cctv = rule_based_specs("use cctv to check the weather");
        assert_eq!(with_cctv.len(), 1);
    }

    #[test]
    fn test_marker_matches_inside_words() {
        assert!(has_conditional_marker("Book it, provided it's sunny"));
        assert!(has_conditional_marker("verify the options"));
        assert!(!has_conditional_marker("Check wallet balance before booking a ride"));
    }

    #[test]
    fn test_plain_court_is_not_a_vision_cue() {
        let specs = rule_based_specs("Get me a ride to the food court");
        let kinds: Vec<_> = specs.iter().map(|s| s.kind.clone()).collect();
        assert_eq!(kinds, vec![TaskKind::Booking]);

        let tennis = rule_based_specs("Is the tennis court open?");
        assert_eq!(tennis[0].kind, TaskKind::VisionCheck);
    }

    #[test]
    fn test_agent_query_falls_back_to_description() {
        assert_eq!(
            agent_query(&TaskKind::Other("translate".into()), "Translate the memo"),
            "Translate the memo"
        );
        assert_eq!(
            agent_query(&TaskKind::Booking, "ignored"),
            "uber ride booking transportation"
        );
    }
}
