//! 令牌检查
//!
//! 只检查 `Authorization: Bearer <token>` 是否存在且非空，不校验令牌内容。

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use clinic_core::ClinicError;
use tracing::debug;

use crate::error::ApiError;

/// 认证设置
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    pub require_token: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            require_token: true,
        }
    }
}

/// 从请求头中取出 Bearer 令牌
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// 认证中间件
pub async fn auth_middleware(
    State(settings): State<AuthSettings>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !settings.require_token {
        return Ok(next.run(request).await);
    }

    let has_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .is_some();

    if !has_token {
        debug!("Rejected {} {}: missing token", request.method(), request.uri());
        return Err(ClinicError::Unauthorized("No authentication token found".to_string()).into());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer    "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
