use crate::error::{Result, TaskMeshError};
use std::env;
use std::str::FromStr;

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 获取 API Key
    ///
    /// 优先级：
    /// 1. 直接传入的 api_key（不以 ${} 包裹）
    /// 2. `${VAR_NAME}` 形式时读取对应环境变量
    /// 3. 为空时读取 `default_env_var`
    pub fn get_api_key(api_key: &str, default_env_var: &str) -> Result<String> {
        if api_key.starts_with("${") && api_key.ends_with('}') {
            let env_var_name = &api_key[2..api_key.len() - 1];
            Self::get_env(env_var_name)
        } else if api_key.is_empty() {
            Self::get_env(default_env_var)
        } else {
            Ok(api_key.to_string())
        }
    }

    pub fn get_env(key: &str) -> Result<String> {
        env::var(key)
            .map_err(|_| TaskMeshError::Config(format!("environment variable `{key}` is not set")))
    }

    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// 读取并解析环境变量；未设置返回 `Ok(None)`，格式错误返回错误
    pub fn get_parsed<T>(key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::get_env_optional(key) {
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
                TaskMeshError::Config(format!("invalid value `{raw}` for `{key}`: {e}"))
            }),
            None => Ok(None),
        }
    }

    pub fn is_debug_mode() -> bool {
        env::var("TASKMESH_DEBUG").is_ok()
    }
}
