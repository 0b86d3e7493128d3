use std::fmt;

use serde::{Deserialize, Serialize};

/// 任务类型
///
/// 开放枚举：未知类型保存在 `Other` 中，不会导致解析失败。
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskKind {
    VisionCheck,
    BalanceCheck,
    Booking,
    WeatherCheck,
    Decision,
    General,
    Other(String),
}

impl TaskKind {
    pub fn as_str(&self) -> &str {
        match self {
            TaskKind::VisionCheck => "vision-check",
            TaskKind::BalanceCheck => "balance-check",
            TaskKind::Booking => "booking",
            TaskKind::WeatherCheck => "weather-check",
            TaskKind::Decision => "decision",
            TaskKind::General => "general",
            TaskKind::Other(name) => name.as_str(),
        }
    }

    /// 解析类型标签，兼容语言模型常用的别名（`cctv_check`、`wallet_check`、`ride_booking` 等）
    pub fn parse(tag: &str) -> Self {
        let normalized = tag.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "vision-check" | "cctv-check" | "vision" | "cctv" => TaskKind::VisionCheck,
            "balance-check" | "wallet-check" | "balance" | "wallet" => TaskKind::BalanceCheck,
            "booking" | "ride-booking" | "ride" => TaskKind::Booking,
            "weather-check" | "weather" => TaskKind::WeatherCheck,
            "decision" => TaskKind::Decision,
            "general" | "" => TaskKind::General,
            _ => TaskKind::Other(normalized),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for TaskKind {
    fn from(value: String) -> Self {
        TaskKind::parse(&value)
    }
}

impl From<&str> for TaskKind {
    fn from(value: &str) -> Self {
        TaskKind::parse(value)
    }
}

impl From<TaskKind> for String {
    fn from(kind: TaskKind) -> Self {
        kind.as_str().to_string()
    }
}
