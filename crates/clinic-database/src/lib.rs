//! # 档案数据库模块
//!
//! 提供PostgreSQL连接池、建表以及四类档案的通用持久化实现。

pub mod connection;
pub mod models;
pub mod queries;
pub mod repository;

// 重新导出主要类型
pub use connection::{DatabasePool, DatabaseSettings};
pub use models::PgFields;
pub use queries::DatabaseQueries;
pub use repository::{postgres_repositories, PgRecordRepository};
