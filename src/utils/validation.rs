use crate::error::{Result, TaskMeshError};

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证 API Key 格式
    pub fn validate_api_key(api_key: &str) -> Result<()> {
        if api_key.is_empty() {
            return Err(TaskMeshError::Config("API Key 不能为空".to_string()));
        }

        if api_key.starts_with("your_") || api_key.starts_with("sk-") && api_key.len() < 20 {
            return Err(TaskMeshError::Config(
                "API Key 看起来是占位符，请提供真实的 API Key".to_string(),
            ));
        }

        Ok(())
    }

    /// 验证 URL 格式
    pub fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(TaskMeshError::Config("URL 不能为空".to_string()));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(TaskMeshError::Config(format!(
                "URL 必须以 http:// 或 https:// 开头: {url}"
            )));
        }

        Ok(())
    }

    pub fn validate_model_name(model: &str) -> Result<()> {
        if model.trim().is_empty() {
            return Err(TaskMeshError::Config("模型名称不能为空".to_string()));
        }
        Ok(())
    }

    /// 评分范围 0.0 ~ 5.0
    pub fn validate_rating(rating: f64) -> Result<()> {
        if !(0.0..=5.0).contains(&rating) {
            return Err(TaskMeshError::Config(format!(
                "最低评分必须在 0.0 到 5.0 之间，当前值: {rating}"
            )));
        }
        Ok(())
    }

    pub fn validate_threshold(threshold: f64) -> Result<()> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(TaskMeshError::Config(format!(
                "资金阈值不能为负数，当前值: {threshold}"
            )));
        }
        Ok(())
    }

    pub fn validate_event_window(window: usize) -> Result<()> {
        if window == 0 {
            return Err(TaskMeshError::Config("事件窗口必须大于 0".to_string()));
        }
        Ok(())
    }
}
