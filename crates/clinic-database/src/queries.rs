//! 数据库结构管理

use crate::connection::DatabasePool;
use crate::models::PgFields;
use clinic_core::{FamilyFields, FileKind, PersonFields, ReferralFields, Result};

/// 建表语句
fn create_table_sql<F: PgFields>(kind: FileKind) -> String {
    format!(
        r#"
            CREATE TABLE IF NOT EXISTS {} (
                id VARCHAR(32) PRIMARY KEY,{}
                registration_date TIMESTAMP WITH TIME ZONE NOT NULL,
                expiry_date TIMESTAMP WITH TIME ZONE NOT NULL
            )
        "#,
        kind.table_name(),
        F::COLUMN_DEFINITIONS
    )
}

/// 数据库结构操作接口
pub struct DatabaseQueries<'a> {
    pool: &'a DatabasePool,
}

impl<'a> DatabaseQueries<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建四类档案表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        let tables = [
            create_table_sql::<PersonFields>(FileKind::Personal),
            create_table_sql::<FamilyFields>(FileKind::Family),
            create_table_sql::<ReferralFields>(FileKind::Referral),
            create_table_sql::<PersonFields>(FileKind::Emergency),
        ];

        for table_sql in &tables {
            sqlx::query(table_sql).execute(pool).await?;
        }

        // 创建索引以优化列表排序和统计查询
        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        for kind in FileKind::ALL {
            let table = kind.table_name();
            let indexes = [
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{0}_registration_date ON {0}(registration_date)",
                    table
                ),
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{0}_expiry_date ON {0}(expiry_date)",
                    table
                ),
            ];

            for index_sql in &indexes {
                sqlx::query(index_sql).execute(pool).await?;
            }
        }

        tracing::info!("Database indexes created successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql::<ReferralFields>(FileKind::Referral);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS referral_files"));
        assert!(sql.contains("id VARCHAR(32) PRIMARY KEY,"));
        assert!(sql.contains("referral_name VARCHAR(255) NOT NULL,"));
        assert!(sql.contains("patient_count INTEGER NOT NULL,"));
        assert!(sql.contains("expiry_date TIMESTAMP WITH TIME ZONE NOT NULL"));

        let sql = create_table_sql::<PersonFields>(FileKind::Emergency);
        assert!(sql.contains("emergency_files"));
        assert!(sql.contains("CHECK (gender IN ('Male', 'Female', 'Other'))"));
    }
}
