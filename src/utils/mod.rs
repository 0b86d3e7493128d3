/// 工具模块 - 提供通用工具函数
pub mod clock;
pub mod logging;
pub mod validation;

pub use logging::LoggingConfig;
pub use validation::ConfigValidator;
