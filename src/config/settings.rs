use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::{DEFAULT_EVENT_WINDOW, DEFAULT_MAX_CONTEXTS};
use crate::error::{Result, TaskMeshError};
use crate::orchestrator::DEFAULT_FUNDS_THRESHOLD;
use crate::utils::validation::ConfigValidator;

use super::env::EnvConfig;

pub const DEFAULT_MIN_RATING: f64 = 4.0;
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// 推理 / 分解服务的连接参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub model: String,
    /// 直接填写或使用 `${VAR}` 引用环境变量；为空时读取 `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: String,
}

fn default_base_url() -> String {
    DEFAULT_LLM_BASE_URL.to_string()
}

impl LlmSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            model: model.into(),
            api_key: String::new(),
        }
    }

    /// 解析后的 API Key
    pub fn resolve_api_key(&self) -> Result<String> {
        let key = EnvConfig::get_api_key(&self.api_key, DEFAULT_API_KEY_VAR)?;
        ConfigValidator::validate_api_key(&key)?;
        Ok(key)
    }
}

/// 编排器运行参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// 指派 Agent 时的最低评分
    pub min_rating: f64,
    /// 余额低于该值视为资金不足
    pub funds_threshold: f64,
    /// 摘要中保留的最近事件数
    pub event_window: usize,
    /// 进程内保留的上下文上限
    pub max_contexts: usize,
    pub llm: Option<LlmSettings>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_rating: DEFAULT_MIN_RATING,
            funds_threshold: DEFAULT_FUNDS_THRESHOLD,
            event_window: DEFAULT_EVENT_WINDOW,
            max_contexts: DEFAULT_MAX_CONTEXTS,
            llm: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            TaskMeshError::Config(format!("failed to read `{}`: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loading orchestrator config");
        Self::from_json_str(&raw)
    }

    /// 默认值叠加环境变量
    pub fn from_env() -> Result<Self> {
        Self::default().overlay_env()
    }

    /// 用 `TASKMESH_*` 环境变量覆盖当前配置
    pub fn overlay_env(mut self) -> Result<Self> {
        if let Some(v) = EnvConfig::get_parsed("TASKMESH_MIN_RATING")? {
            self.min_rating = v;
        }
        if let Some(v) = EnvConfig::get_parsed("TASKMESH_FUNDS_THRESHOLD")? {
            self.funds_threshold = v;
        }
        if let Some(v) = EnvConfig::get_parsed("TASKMESH_EVENT_WINDOW")? {
            self.event_window = v;
        }
        if let Some(v) = EnvConfig::get_parsed("TASKMESH_MAX_CONTEXTS")? {
            self.max_contexts = v;
        }

        let model = EnvConfig::get_env_optional("TASKMESH_LLM_MODEL");
        let base_url = EnvConfig::get_env_optional("TASKMESH_LLM_BASE_URL");
        let api_key = EnvConfig::get_env_optional("TASKMESH_LLM_API_KEY");
        if model.is_some() || base_url.is_some() || api_key.is_some() {
            let mut llm = self
                .llm
                .take()
                .unwrap_or_else(|| LlmSettings::new(String::new()));
            if let Some(model) = model {
                llm.model = model;
            }
            if let Some(base_url) = base_url {
                llm.base_url = base_url;
            }
            if let Some(api_key) = api_key {
                llm.api_key = api_key;
            }
            self.llm = Some(llm);
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_rating(self.min_rating)?;
        ConfigValidator::validate_threshold(self.funds_threshold)?;
        ConfigValidator::validate_event_window(self.event_window)?;
        if let Some(llm) = &self.llm {
            ConfigValidator::validate_url(&llm.base_url)?;
            ConfigValidator::validate_model_name(&llm.model)?;
        }
        Ok(())
    }
}
