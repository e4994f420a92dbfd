//! 持久化接口

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinic_core::{
    Emergency, Family, KindStats, Personal, Record, RecordFields, RecordKind, RecordPatch,
    Referral, Result,
};
use std::sync::Arc;

use crate::memory::MemoryRepository;

/// 某类别的档案
pub type KindRecord<K> = Record<<K as RecordKind>::Fields>;

/// 某类别的部分更新
pub type KindPatch<K> = RecordPatch<<<K as RecordKind>::Fields as RecordFields>::Patch>;

/// 单个类别档案集合的持久化操作
///
/// 每个调用在单条记录级别上是原子的，不提供跨调用事务。
#[async_trait]
pub trait RecordRepository<K: RecordKind>: Send + Sync {
    /// 全部档案，按登记时间倒序
    async fn list(&self) -> Result<Vec<KindRecord<K>>>;

    async fn get(&self, id: &str) -> Result<Option<KindRecord<K>>>;

    async fn insert(&self, record: &KindRecord<K>) -> Result<()>;

    /// 按编号整行写回，记录不存在时返回 false
    async fn replace(&self, record: &KindRecord<K>) -> Result<bool>;

    /// 按编号删除，记录不存在时返回 false
    async fn remove(&self, id: &str) -> Result<bool>;

    /// 以给定时间计算统计
    async fn counts(&self, now: DateTime<Utc>) -> Result<KindStats>;
}

/// 四个类别的持久化实现
#[derive(Clone)]
pub struct Repositories {
    pub personal: Arc<dyn RecordRepository<Personal>>,
    pub family: Arc<dyn RecordRepository<Family>>,
    pub referral: Arc<dyn RecordRepository<Referral>>,
    pub emergency: Arc<dyn RecordRepository<Emergency>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            personal: Arc::new(MemoryRepository::<Personal>::new()),
            family: Arc::new(MemoryRepository::<Family>::new()),
            referral: Arc::new(MemoryRepository::<Referral>::new()),
            emergency: Arc::new(MemoryRepository::<Emergency>::new()),
        }
    }
}
