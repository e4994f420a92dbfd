//! # 运维支撑模块
//!
//! 服务配置加载与日志初始化

pub mod config;
pub mod logging;

pub use config::{
    AuthConfig, ClinicConfig, DatabaseConfig, LoggingConfig, ServerConfig, StorageBackend,
};
pub use logging::init_logging;
