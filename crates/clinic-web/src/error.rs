//! 错误到HTTP响应的映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clinic_core::ClinicError;
use serde_json::json;
use tracing::{error, warn};

/// 处理器错误
#[derive(Debug)]
pub struct ApiError(pub ClinicError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<ClinicError> for ApiError {
    fn from(err: ClinicError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicError::Validation(_) | ClinicError::Serialization(_) => StatusCode::BAD_REQUEST,
            ClinicError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ClinicError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ClinicError::Database(_)
            | ClinicError::Config(_)
            | ClinicError::Internal(_)
            | ClinicError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = Json(json!({
            "error": true,
            "message": self.0.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ClinicError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ClinicError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ClinicError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ClinicError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ClinicError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
