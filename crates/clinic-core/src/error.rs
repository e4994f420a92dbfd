//! 错误定义模块

use thiserror::Error;

/// 诊所档案系统统一错误类型
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Database(String),

    /// 持久化层不可用（连接失败、连接池关闭等），与“未找到”区分
    #[error("存储不可用: {0}")]
    Unavailable(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("未授权: {0}")]
    Unauthorized(String),

    #[error("系统内部错误: {0}")]
    Internal(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl ClinicError {
    /// 持久化层是否不可用
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClinicError::Unavailable(_))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for ClinicError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => ClinicError::Unavailable(err.to_string()),
            sqlx::Error::Configuration(_) => ClinicError::Config(err.to_string()),
            other => ClinicError::Database(other.to_string()),
        }
    }
}

/// 诊所档案系统统一结果类型
pub type Result<T> = std::result::Result<T, ClinicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_is_distinct_from_not_found() {
        assert!(ClinicError::Unavailable("pool closed".to_string()).is_unavailable());
        assert!(!ClinicError::NotFound("SJMC-1".to_string()).is_unavailable());
    }

    #[cfg(feature = "database")]
    #[test]
    fn test_sqlx_error_classification() {
        assert!(ClinicError::from(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(ClinicError::from(sqlx::Error::PoolClosed).is_unavailable());
        assert!(matches!(
            ClinicError::from(sqlx::Error::RowNotFound),
            ClinicError::Database(_)
        ));
    }
}
