use std::collections::BTreeMap;

use crate::task::{TaskKind, TaskOutcome};

use super::rules::contains_any;

pub const COURT_DRY: &str = "court_dry";
pub const SUFFICIENT_FUNDS: &str = "sufficient_funds";
pub const DEFAULT_FUNDS_THRESHOLD: f64 = 20.0;

/// 从任务结果推导跨任务的条件事实
///
/// 视觉检查总会给出 `court_dry`；余额检查只有在结果里确实报告了余额时
/// 才写入 `sufficient_funds`，否则保持未知。
pub fn derive_decision(
    kind: &TaskKind,
    outcome: &TaskOutcome,
    funds_threshold: f64,
) -> Option<(&'static str, bool)> {
    match kind {
        TaskKind::VisionCheck => {
            let analysis = outcome
                .field("analysis")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_lowercase();
            Some((
                COURT_DRY,
                analysis.contains("dry") || analysis.contains("clear"),
            ))
        }
        TaskKind::BalanceCheck => outcome
            .field("balance")
            .and_then(|v| v.as_f64().or_else(|| v.as_str()?.trim().parse().ok()))
            .map(|balance| (SUFFICIENT_FUNDS, balance >= funds_threshold)),
        _ => None,
    }
}

/// 提示词门控条件（对小写提示词做子串匹配）
#[derive(Clone, Debug)]
pub enum PromptGate {
    AllOf(Vec<&'static str>),
    AnyOf(Vec<&'static str>),
}

impl PromptGate {
    pub fn is_open(&self, prompt_lower: &str) -> bool {
        match self {
            PromptGate::AllOf(keywords) => keywords.iter().all(|kw| prompt_lower.contains(kw)),
            PromptGate::AnyOf(keywords) => contains_any(prompt_lower, keywords),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ContinuationRule {
    pub gate: PromptGate,
    pub kind: TaskKind,
    pub decision: &'static str,
    /// 决策缺失时的取值
    pub default: bool,
    pub reason: &'static str,
}

/// 继续执行策略：某类任务完成后，依据提示词与决策决定是否中止
#[derive(Clone, Debug)]
pub struct ContinuationPolicy {
    rules: Vec<ContinuationRule>,
}

impl Default for ContinuationPolicy {
    fn default() -> Self {
        Self::new(vec![
            ContinuationRule {
                gate: PromptGate::AllOf(vec!["if", "dry"]),
                kind: TaskKind::VisionCheck,
                decision: COURT_DRY,
                default: false,
                reason: "precondition not met (surface not dry)",
            },
            ContinuationRule {
                gate: PromptGate::AnyOf(vec!["wallet", "balance"]),
                kind: TaskKind::BalanceCheck,
                decision: SUFFICIENT_FUNDS,
                default: true,
                reason: "insufficient funds",
            },
        ])
    }
}

impl ContinuationPolicy {
    pub fn new(rules: Vec<ContinuationRule>) -> Self {
        Self { rules }
    }

    /// 不设任何门控，始终继续
    pub fn permissive() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[ContinuationRule] {
        &self.rules
    }

    /// 返回 `Some(reason)` 表示应当中止
    pub fn check(
        &self,
        prompt: &str,
        kind: &TaskKind,
        decisions: &BTreeMap<String, bool>,
    ) -> Option<&'static str> {
        let prompt_lower = prompt.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| &rule.kind == kind && rule.gate.is_open(&prompt_lower))
            .find(|rule| !decisions.get(rule.decision).copied().unwrap_or(rule.default))
            .map(|rule| rule.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decisions(pairs: &[(&str, bool)]) -> BTreeMap<String, bool> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_vision_decision_from_analysis() {
        let wet = TaskOutcome::success(json!({"analysis": "court is wet"}));
        assert_eq!(
            derive_decision(&TaskKind::VisionCheck, &wet, 20.0),
            Some((COURT_DRY, false))
        );
        let clear = TaskOutcome::success(json!({"analysis": "Skies CLEAR"}));
        assert_eq!(
            derive_decision(&TaskKind::VisionCheck, &clear, 20.0),
            Some((COURT_DRY, true))
        );
    }

    #[test]
    fn test_balance_decision_uses_threshold() {
        let low = TaskOutcome::success(json!({"balance": 12.5}));
        assert_eq!(
            derive_decision(&TaskKind::BalanceCheck, &low, 20.0),
            Some((SUFFICIENT_FUNDS, false))
        );
        let exact = TaskOutcome::success(json!({"balance": "20"}));
        assert_eq!(
            derive_decision(&TaskKind::BalanceCheck, &exact, 20.0),
            Some((SUFFICIENT_FUNDS, true))
        );
        let missing = TaskOutcome::error("agent down");
        assert_eq!(derive_decision(&TaskKind::BalanceCheck, &missing, 20.0), None);
    }

    #[test]
    fn test_dry_gate_aborts_when_wet() {
        let policy = ContinuationPolicy::default();
        let reason = policy.check(
            "Book an uber if the court is dry",
            &TaskKind::VisionCheck,
            &decisions(&[(COURT_DRY, false)]),
        );
        assert_eq!(reason, Some("precondition not met (surface not dry)"));
    }

    #[test]
    fn test_dry_gate_closed_without_if() {
        let policy = ContinuationPolicy::default();
        let reason = policy.check(
            "Tell me whether the court is dry",
            &TaskKind::VisionCheck,
            &decisions(&[(COURT_DRY, false)]),
        );
        assert_eq!(reason, None);
    }

    #[test]
    fn test_funds_default_to_sufficient() {
        let policy = ContinuationPolicy::default();
        let prompt = "Check wallet balance before booking a ride";
        assert_eq!(
            policy.check(prompt, &TaskKind::BalanceCheck, &BTreeMap::new()),
            None
        );
        assert_eq!(
            policy.check(
                prompt,
                &TaskKind::BalanceCheck,
                &decisions(&[(SUFFICIENT_FUNDS, false)])
            ),
            Some("insufficient funds")
        );
        // gate only applies to balance-check tasks
        assert_eq!(
            policy.check(
                prompt,
                &TaskKind::Booking,
                &decisions(&[(SUFFICIENT_FUNDS, false)])
            ),
            None
        );
    }

    #[test]
    fn test_gates_match_inflected_keywords() {
        let policy = ContinuationPolicy::default();
        assert_eq!(
            policy.check(
                "Check my wallets before booking a ride",
                &TaskKind::BalanceCheck,
                &decisions(&[(SUFFICIENT_FUNDS, false)])
            ),
            Some("insufficient funds")
        );
        assert_eq!(
            policy.check(
                "Book an uber if the court dryness looks fine",
                &TaskKind::VisionCheck,
                &decisions(&[(COURT_DRY, false)])
            ),
            Some("precondition not met (surface not dry)")
        );
    }

    #[test]
    fn test_permissive_policy_never_aborts() {
        let policy = ContinuationPolicy::permissive();
        assert!(policy
            .check(
                "book if dry",
                &TaskKind::VisionCheck,
                &decisions(&[(COURT_DRY, false)])
            )
            .is_none());
    }
}
