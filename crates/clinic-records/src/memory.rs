//! 内存档案存储
//!
//! 用于开发模式和测试，行为与数据库实现一致：编号为主键，列表按登记时间倒序。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinic_core::{ClinicError, KindStats, RecordKind, Result};
use std::collections::HashMap;
use std::marker::PhantomData;
use tokio::sync::RwLock;
use tracing::debug;

use crate::repository::{KindRecord, RecordRepository};

/// 基于 `RwLock<HashMap>` 的档案集合
pub struct MemoryRepository<K: RecordKind> {
    records: RwLock<HashMap<String, KindRecord<K>>>,
    _kind: PhantomData<K>,
}

impl<K: RecordKind> MemoryRepository<K> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            _kind: PhantomData,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl<K: RecordKind> Default for MemoryRepository<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: RecordKind> RecordRepository<K> for MemoryRepository<K> {
    async fn list(&self) -> Result<Vec<KindRecord<K>>> {
        let records = self.records.read().await;
        let mut list: Vec<KindRecord<K>> = records.values().cloned().collect();
        list.sort_by(|a, b| {
            b.registration_date
                .cmp(&a.registration_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(list)
    }

    async fn get(&self, id: &str) -> Result<Option<KindRecord<K>>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn insert(&self, record: &KindRecord<K>) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(ClinicError::Database(format!(
                "duplicate {} id: {}",
                K::KIND,
                record.id
            )));
        }
        records.insert(record.id.clone(), record.clone());
        debug!("Inserted {} record {} into memory", K::KIND, record.id);
        Ok(())
    }

    async fn replace(&self, record: &KindRecord<K>) -> Result<bool> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn counts(&self, now: DateTime<Utc>) -> Result<KindStats> {
        let records = self.records.read().await;
        Ok(KindStats::tally(records.values(), now))
    }
}
