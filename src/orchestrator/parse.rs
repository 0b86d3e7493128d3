use serde_json::Value;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// 去掉模型输出外层的代码块包裹
pub fn clean_response(response: &str) -> String {
    let start_marker = if response.contains(JSON_FENCE) {
        JSON_FENCE
    } else if response.contains(FENCE) {
        FENCE
    } else {
        return response.trim().to_string();
    };

    if let Some(start) = response.find(start_marker) {
        let body_start = start + start_marker.len();
        if let Some(end) = response[body_start..].find(FENCE) {
            return response[body_start..body_start + end].trim().to_string();
        }
    }
    response.trim().to_string()
}

/// 尝试把模型输出解析为 JSON 对象或数组；前后夹带说明文字时截取最外层括号
///
/// 先出现的开括号优先，避免把对象内部的数组当成整体结果。
pub fn parse_structured(response: &str) -> Option<Value> {
    let cleaned = clean_response(response);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return (value.is_object() || value.is_array()).then_some(value);
    }

    let mut spans: Vec<(usize, usize)> = [('[', ']'), ('{', '}')]
        .into_iter()
        .filter_map(|(open, close)| Some((cleaned.find(open)?, cleaned.rfind(close)?)))
        .filter(|(start, end)| start < end)
        .collect();
    spans.sort_by_key(|(start, _)| *start);

    spans
        .into_iter()
        .find_map(|(start, end)| serde_json::from_str::<Value>(&cleaned[start..=end]).ok())
}
