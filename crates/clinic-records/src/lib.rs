//! # 档案存储与统计模块
//!
//! 提供诊所档案的核心业务：
//! - 档案存储：按类别泛型化的创建/查询/部分更新/删除
//! - 统计汇总：按类别计算总数、有效、过期和本周新增
//! - 持久化接口：`RecordRepository` 及其内存实现
//! - 演示数据：为空库填充示例档案

pub mod memory;
pub mod repository;
pub mod seed;
pub mod stats;
pub mod store;

use clinic_core::{Clock, Emergency, Family, Personal, Referral};
use std::sync::Arc;

// 重新导出主要类型
pub use memory::MemoryRepository;
pub use repository::{KindPatch, KindRecord, RecordRepository, Repositories};
pub use seed::seed_demo_data;
pub use stats::StatsAggregator;
pub use store::RecordStore;

/// 四类档案存储的集合
#[derive(Clone)]
pub struct ClinicRecords {
    pub personal: Arc<RecordStore<Personal>>,
    pub family: Arc<RecordStore<Family>>,
    pub referral: Arc<RecordStore<Referral>>,
    pub emergency: Arc<RecordStore<Emergency>>,
    clock: Arc<dyn Clock>,
}

impl ClinicRecords {
    pub fn new(repositories: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            personal: Arc::new(RecordStore::new(repositories.personal, clock.clone())),
            family: Arc::new(RecordStore::new(repositories.family, clock.clone())),
            referral: Arc::new(RecordStore::new(repositories.referral, clock.clone())),
            emergency: Arc::new(RecordStore::new(repositories.emergency, clock.clone())),
            clock,
        }
    }

    /// 使用内存存储
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Repositories::in_memory(), clock)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// 统计汇总器
    pub fn stats(&self) -> StatsAggregator {
        StatsAggregator::new(
            self.personal.clone(),
            self.family.clone(),
            self.referral.clone(),
            self.emergency.clone(),
            self.clock.clone(),
        )
    }
}
