//! 档案仓储的 Postgres 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinic_core::{
    Emergency, Family, FileKind, KindStats, Personal, Record, RecordKind, Referral, Result,
};
use clinic_records::{KindRecord, RecordRepository, Repositories};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

use crate::connection::DatabasePool;
use crate::models::{PgFields, PgQuery};

/// 单个类别的 SQL 语句，由静态列清单生成
#[derive(Debug, Clone)]
pub(crate) struct Statements {
    pub list: String,
    pub get: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
    pub counts: String,
}

impl Statements {
    pub(crate) fn new(kind: FileKind, columns: &[&str]) -> Self {
        let table = kind.table_name();
        let select_columns = format!(
            "id, {}, registration_date, expiry_date",
            columns.join(", ")
        );

        // 参数顺序：$1 = id，随后是类别列，最后是登记日期和到期日期
        let placeholders: Vec<String> = (1..=columns.len() + 3).map(|i| format!("${}", i)).collect();
        let assignments: Vec<String> = columns
            .iter()
            .chain(["registration_date", "expiry_date"].iter())
            .enumerate()
            .map(|(i, column)| format!("{} = ${}", column, i + 2))
            .collect();

        Self {
            list: format!(
                "SELECT {} FROM {} ORDER BY registration_date DESC, id",
                select_columns, table
            ),
            get: format!("SELECT {} FROM {} WHERE id = $1", select_columns, table),
            insert: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                select_columns,
                placeholders.join(", ")
            ),
            update: format!(
                "UPDATE {} SET {} WHERE id = $1",
                table,
                assignments.join(", ")
            ),
            delete: format!("DELETE FROM {} WHERE id = $1", table),
            counts: format!(
                "SELECT COUNT(*) AS total, \
                 COUNT(*) FILTER (WHERE registration_date >= $1) AS weekly, \
                 COUNT(*) FILTER (WHERE expiry_date < $2) AS expired, \
                 COUNT(*) FILTER (WHERE expiry_date >= $2) AS active \
                 FROM {}",
                table
            ),
        }
    }
}

/// Postgres 档案仓储
pub struct PgRecordRepository<K: RecordKind> {
    pool: DatabasePool,
    sql: Statements,
    _kind: PhantomData<K>,
}

impl<K> PgRecordRepository<K>
where
    K: RecordKind,
    K::Fields: PgFields,
{
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            sql: Statements::new(K::KIND, <K::Fields as PgFields>::COLUMNS),
            _kind: PhantomData,
        }
    }

    fn decode(row: &PgRow) -> std::result::Result<KindRecord<K>, sqlx::Error> {
        Ok(Record {
            id: row.try_get("id")?,
            fields: <K::Fields as PgFields>::from_row(row)?,
            registration_date: row.try_get("registration_date")?,
            expiry_date: row.try_get("expiry_date")?,
        })
    }

    fn bind_record<'q>(query: PgQuery<'q>, record: &'q KindRecord<K>) -> PgQuery<'q> {
        record
            .fields
            .bind(query.bind(&record.id))
            .bind(record.registration_date)
            .bind(record.expiry_date)
    }
}

fn count(row: &PgRow, column: &str) -> std::result::Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    Ok(value.max(0) as u64)
}

#[async_trait]
impl<K> RecordRepository<K> for PgRecordRepository<K>
where
    K: RecordKind,
    K::Fields: PgFields,
{
    async fn list(&self) -> Result<Vec<KindRecord<K>>> {
        let rows = sqlx::query(&self.sql.list)
            .fetch_all(self.pool.pool())
            .await?;

        let records = rows
            .iter()
            .map(Self::decode)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<KindRecord<K>>> {
        let row = sqlx::query(&self.sql.get)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(row.as_ref().map(Self::decode).transpose()?)
    }

    async fn insert(&self, record: &KindRecord<K>) -> Result<()> {
        Self::bind_record(sqlx::query(&self.sql.insert), record)
            .execute(self.pool.pool())
            .await?;
        debug!("Inserted {} row {}", K::KIND, record.id);
        Ok(())
    }

    async fn replace(&self, record: &KindRecord<K>) -> Result<bool> {
        let result = Self::bind_record(sqlx::query(&self.sql.update), record)
            .execute(self.pool.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(&self.sql.delete)
            .bind(id)
            .execute(self.pool.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn counts(&self, now: DateTime<Utc>) -> Result<KindStats> {
        let row = sqlx::query(&self.sql.counts)
            .bind(clinic_core::week_start(now))
            .bind(now)
            .fetch_one(self.pool.pool())
            .await?;

        Ok(KindStats {
            total: count(&row, "total")?,
            weekly: count(&row, "weekly")?,
            expired: count(&row, "expired")?,
            active: count(&row, "active")?,
        })
    }
}

/// 四个类别的 Postgres 仓储，共享同一个连接池
pub fn postgres_repositories(pool: &DatabasePool) -> Repositories {
    Repositories {
        personal: Arc::new(PgRecordRepository::<Personal>::new(pool.clone())),
        family: Arc::new(PgRecordRepository::<Family>::new(pool.clone())),
        referral: Arc::new(PgRecordRepository::<Referral>::new(pool.clone())),
        emergency: Arc::new(PgRecordRepository::<Emergency>::new(pool.clone())),
    }
}
