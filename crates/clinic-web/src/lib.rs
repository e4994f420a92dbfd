//! # 档案Web服务模块
//!
//! 提供四类档案的REST接口、仪表盘统计接口以及令牌检查中间件。

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthSettings;
pub use error::{ApiError, ApiResult};
pub use server::{create_app, WebServer};
