use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEBUG_VAR: &str = "TASKMESH_DEBUG";

/// 日志配置
pub struct LoggingConfig;

impl LoggingConfig {
    /// 初始化日志系统
    ///
    /// 支持通过环境变量配置：
    /// - RUST_LOG: 设置日志级别（error, warn, info, debug, trace）
    /// - TASKMESH_DEBUG: 启用详细调试输出
    ///
    /// 重复调用不会 panic，后续调用被忽略。
    ///
    /// ```no_run
    /// use taskmesh::utils::LoggingConfig;
    ///
    /// LoggingConfig::init();
    /// ```
    pub fn init() {
        let is_debug = Self::is_debug();

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if is_debug {
                EnvFilter::new("taskmesh=debug,info")
            } else {
                EnvFilter::new("taskmesh=info,warn")
            }
        });

        let fmt_layer = fmt::layer()
            .with_target(is_debug)
            .with_file(is_debug)
            .with_line_number(is_debug)
            .with_thread_ids(is_debug);

        let installed = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok();

        if installed && is_debug {
            tracing::debug!("调试模式已启用");
        }
    }

    /// 初始化日志系统（带自定义过滤器）
    pub fn init_with_filter(filter: &str) {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new(filter))
            .with(fmt::layer())
            .try_init();
    }

    /// 检查是否启用调试模式
    pub fn is_debug() -> bool {
        env::var(DEBUG_VAR).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_debug() {
        env::remove_var(DEBUG_VAR);
        assert!(!LoggingConfig::is_debug());

        env::set_var(DEBUG_VAR, "1");
        assert!(LoggingConfig::is_debug());

        env::remove_var(DEBUG_VAR);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        LoggingConfig::init_with_filter("taskmesh=warn");
        LoggingConfig::init_with_filter("taskmesh=warn");
    }
}
