//! 诊所档案服务主程序

use anyhow::{Context, Result};
use clap::Parser;
use clinic_admin::{init_logging, ClinicConfig, StorageBackend};
use clinic_core::{Clock, SystemClock};
use clinic_database::{postgres_repositories, DatabasePool, DatabaseQueries, DatabaseSettings};
use clinic_records::{seed_demo_data, ClinicRecords, Repositories};
use clinic_web::{AuthSettings, WebServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "clinic-server")]
#[command(about = "SJMC 诊所档案管理服务")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 监听主机
    #[arg(long)]
    host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 使用内存存储（不连接数据库）
    #[arg(long)]
    memory: bool,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    /// 命令行参数最后覆盖配置
    fn apply(&self, config: &mut ClinicConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.memory {
            config.database.backend = StorageBackend::Memory;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ClinicConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    // 初始化日志
    init_logging(&config.logging)?;

    info!("启动SJMC档案服务...");
    info!("  监听地址: {}", config.listen_addr());
    info!("  存储后端: {}", config.database.backend);
    info!("  令牌检查: {}", config.auth.require_token);

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.listen_addr()))?;

    let (repositories, pool) = match config.database.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage, records are lost on shutdown");
            (Repositories::in_memory(), None)
        }
        StorageBackend::Postgres => {
            let settings = DatabaseSettings {
                url: config.database.url.clone(),
                max_connections: config.database.max_connections,
                min_connections: config.database.min_connections,
                connect_timeout: config.database.connect_timeout(),
            };
            let pool = DatabasePool::connect(&settings).await?;
            if config.database.run_migrations {
                DatabaseQueries::new(&pool).create_tables().await?;
            }
            (postgres_repositories(&pool), Some(pool))
        }
    };

    let clock = Arc::new(SystemClock);
    if config.database.seed_demo_data {
        let seeded = seed_demo_data(&repositories, clock.now()).await?;
        info!("Seeded {} demo records", seeded);
    }

    let records = ClinicRecords::new(repositories, clock);
    let auth = AuthSettings {
        require_token: config.auth.require_token,
    };

    WebServer::new(addr, &records, auth)
        .run(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
    }

    info!("服务已停止");
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
