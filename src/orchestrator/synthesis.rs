use serde_json::Value;

use crate::task::{Task, TaskKind, TaskStatus};

use super::executor::ExecutionOutcome;

pub const GENERIC_SUCCESS: &str = "Task completed successfully";
const UNKNOWN: &str = "Unknown";

fn text(data: &Value, field: &str) -> String {
    match data.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => UNKNOWN.to_string(),
        Some(other) => other.to_string(),
    }
}

fn number(data: &Value, field: &str) -> f64 {
    data.get(field).and_then(Value::as_f64).unwrap_or_default()
}

/// 单个已完成任务的一行摘要；没有对应模板的类型返回 `None`
pub fn summarize_task(task: &Task) -> Option<String> {
    if task.status != TaskStatus::Completed {
        return None;
    }
    let data = task.result.as_ref().map(|r| &r.result)?;

    match task.kind {
        TaskKind::VisionCheck => Some(format!(
            "Camera Analysis: {} ({:.0}% confidence)",
            text(data, "analysis"),
            number(data, "confidence") * 100.0
        )),
        TaskKind::BalanceCheck => {
            let sufficient = data
                .get("sufficient")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let label = if sufficient { "Sufficient" } else { "Insufficient" };
            Some(format!("{label} Balance: ${:.2}", number(data, "balance")))
        }
        TaskKind::Booking => Some(format!(
            "Ride Booked! ID: {}, ETA: {}, Driver: {}",
            text(data, "booking_id"),
            text(data, "eta"),
            text(data, "driver")
        )),
        TaskKind::WeatherCheck => Some(format!(
            "Weather: {}, {}°F",
            text(data, "condition"),
            text(data, "temperature")
        )),
        _ => None,
    }
}

/// 汇总最终结果文本
pub fn synthesize(tasks: &[Task], outcome: &ExecutionOutcome) -> String {
    if outcome.aborted {
        let reason = outcome.reason.as_deref().unwrap_or("Conditions not met");
        return format!("Task aborted: {reason}");
    }

    let lines: Vec<String> = tasks.iter().filter_map(summarize_task).collect();
    if lines.is_empty() {
        GENERIC_SUCCESS.to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskOutcome;
    use serde_json::json;

    fn completed(id: &str, kind: TaskKind, data: Value) -> Task {
        let mut task = Task::new(id, kind, "d");
        task.status = TaskStatus::Completed;
        task.result = Some(TaskOutcome::success(data));
        task
    }

    #[test]
    fn test_lines_follow_task_order() {
        let tasks = vec![
            completed(
                "task_1",
                TaskKind::VisionCheck,
                json!({"analysis": "Tennis court is dry", "confidence": 0.95}),
            ),
            completed(
                "task_2",
                TaskKind::Booking,
                json!({"booking_id": "RIDE-10000", "eta": "8 minutes", "driver": "John Doe"}),
            ),
        ];
        let text = synthesize(&tasks, &ExecutionOutcome::default());
        assert_eq!(
            text,
            "Camera Analysis: Tennis court is dry (95% confidence)\n\
             Ride Booked! ID: RIDE-10000, ETA: 8 minutes, Driver: John Doe"
        );
    }

    #[test]
    fn test_balance_and_weather_lines() {
        let balance = completed(
            "task_1",
            TaskKind::BalanceCheck,
            json!({"balance": 150.0, "sufficient": true}),
        );
        assert_eq!(
            summarize_task(&balance).as_deref(),
            Some("Sufficient Balance: $150.00")
        );
        let weather = completed(
            "task_2",
            TaskKind::WeatherCheck,
            json!({"condition": "sunny", "temperature": 72}),
        );
        assert_eq!(summarize_task(&weather).as_deref(), Some("Weather: sunny, 72°F"));
    }

    #[test]
    fn test_aborted_message_embeds_reason() {
        let outcome = ExecutionOutcome {
            aborted: true,
            reason: Some("insufficient funds".to_string()),
            ..Default::default()
        };
        assert_eq!(synthesize(&[], &outcome), "Task aborted: insufficient funds");
    }

    #[test]
    fn test_generic_message_when_nothing_renderable() {
        let tasks = vec![completed("task_1", TaskKind::General, json!({"result": "ok"}))];
        assert_eq!(synthesize(&tasks, &ExecutionOutcome::default()), GENERIC_SUCCESS);
    }
}
