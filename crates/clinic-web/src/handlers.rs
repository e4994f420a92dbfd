//! HTTP处理器
//!
//! 档案处理器对类别泛型，状态为对应类别的 `RecordStore`。

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use clinic_core::{
    ClinicError, DashboardStats, DeleteOutcome, RecordKind, RecordView,
};
use clinic_records::{KindPatch, RecordStore, StatsAggregator};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiResult;

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "SJMC Records API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "personal": "/api/personal",
            "family": "/api/family",
            "referral": "/api/referral",
            "emergency": "/api/emergency",
            "stats": "/api/stats"
        }
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 解析请求体，格式错误或缺少字段时返回验证错误
fn parse_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> ApiResult<T> {
    let Json(value) = body.map_err(|e| ClinicError::Validation(e.body_text()))?;
    serde_json::from_value(value)
        .map_err(|e| ClinicError::Validation(e.to_string()).into())
}

fn not_found<K: RecordKind>(id: &str) -> ClinicError {
    ClinicError::NotFound(format!("{} record {}", K::KIND, id))
}

/// 档案列表处理器
pub async fn list_records<K: RecordKind>(
    State(store): State<Arc<RecordStore<K>>>,
) -> ApiResult<Json<Vec<RecordView<K::Fields>>>> {
    let now = store.now();
    let records = store.find().await?;
    Ok(Json(
        records
            .into_iter()
            .map(|record| record.with_status(now))
            .collect(),
    ))
}

/// 单个档案处理器
pub async fn get_record<K: RecordKind>(
    State(store): State<Arc<RecordStore<K>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordView<K::Fields>>> {
    let record = store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found::<K>(&id))?;
    Ok(Json(record.with_status(store.now())))
}

/// 创建档案处理器
pub async fn create_record<K: RecordKind>(
    State(store): State<Arc<RecordStore<K>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordView<K::Fields>>)> {
    let fields: K::Fields = parse_body(body)?;
    let record = store.create(fields).await?;
    info!("Registered {} record {}", K::KIND, record.id);
    Ok((StatusCode::CREATED, Json(record.with_status(store.now()))))
}

/// 部分更新档案处理器
pub async fn update_record<K: RecordKind>(
    State(store): State<Arc<RecordStore<K>>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<RecordView<K::Fields>>> {
    let patch: KindPatch<K> = parse_body(body)?;
    let record = store
        .update(&id, patch)
        .await?
        .ok_or_else(|| not_found::<K>(&id))?;
    Ok(Json(record.with_status(store.now())))
}

/// 删除档案处理器，记录不存在时返回 success=false
pub async fn delete_record<K: RecordKind>(
    State(store): State<Arc<RecordStore<K>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(store.delete(&id).await?))
}

/// 仪表盘统计处理器
pub async fn get_stats(
    State(aggregator): State<Arc<StatsAggregator>>,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(aggregator.compute_stats().await?))
}
