//! Web服务器

use axum::{routing::get, Router};
use clinic_core::{RecordKind, Result};
use clinic_records::{ClinicRecords, RecordStore};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::{auth_middleware, AuthSettings};
use crate::handlers::{
    api_root, create_record, delete_record, get_record, get_stats, health, list_records,
    update_record,
};

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, records: &ClinicRecords, auth: AuthSettings) -> Self {
        let app = create_app(records, auth);

        Self { addr, app }
    }

    /// 运行服务器，`shutdown` 完成后停止接收新连接并等待请求处理完毕
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("Starting web server on {}", listener.local_addr()?);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Web server stopped");
        Ok(())
    }
}

/// 组装路由
pub fn create_app(records: &ClinicRecords, auth: AuthSettings) -> Router {
    Router::new()
        // 根路径
        .route("/", get(api_root))

        // 健康检查
        .route("/health", get(health))

        // API路由（需要令牌）
        .nest(
            "/api",
            api_routes(records).layer(axum::middleware::from_fn_with_state(
                auth,
                auth_middleware,
            )),
        )

        // 全局中间件
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// /api 路由
fn api_routes(records: &ClinicRecords) -> Router {
    Router::new()
        .nest("/personal", record_routes(records.personal.clone()))
        .nest("/family", record_routes(records.family.clone()))
        .nest("/referral", record_routes(records.referral.clone()))
        .nest("/emergency", record_routes(records.emergency.clone()))
        .route("/stats", get(get_stats).with_state(Arc::new(records.stats())))
}

/// 单个类别的 CRUD 路由
fn record_routes<K: RecordKind>(store: Arc<RecordStore<K>>) -> Router {
    Router::new()
        .route("/", get(list_records::<K>).post(create_record::<K>))
        .route(
            "/:id",
            get(get_record::<K>)
                .put(update_record::<K>)
                .patch(update_record::<K>)
                .delete(delete_record::<K>),
        )
        .with_state(store)
}
