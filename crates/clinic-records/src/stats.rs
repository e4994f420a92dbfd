//! 统计汇总
//!
//! 汇总开始时固定一次“当前时间”，四个类别都用同一个时间判断有效/过期，
//! 因此每个类别都满足 active + expired = total。

use chrono::{DateTime, Utc};
use clinic_core::{Clock, DashboardStats, Emergency, Family, Personal, Referral, Result};
use std::sync::Arc;
use tracing::debug;

use crate::store::RecordStore;

/// 仪表盘统计汇总器
pub struct StatsAggregator {
    personal: Arc<RecordStore<Personal>>,
    family: Arc<RecordStore<Family>>,
    referral: Arc<RecordStore<Referral>>,
    emergency: Arc<RecordStore<Emergency>>,
    clock: Arc<dyn Clock>,
}

impl StatsAggregator {
    pub fn new(
        personal: Arc<RecordStore<Personal>>,
        family: Arc<RecordStore<Family>>,
        referral: Arc<RecordStore<Referral>>,
        emergency: Arc<RecordStore<Emergency>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            personal,
            family,
            referral,
            emergency,
            clock,
        }
    }

    /// 以当前时间计算统计
    pub async fn compute_stats(&self) -> Result<DashboardStats> {
        self.compute_stats_at(self.clock.now()).await
    }

    /// 以给定时间计算统计，四个类别并发查询
    pub async fn compute_stats_at(&self, now: DateTime<Utc>) -> Result<DashboardStats> {
        let (personal, family, referral, emergency) = tokio::try_join!(
            self.personal.stats_at(now),
            self.family.stats_at(now),
            self.referral.stats_at(now),
            self.emergency.stats_at(now),
        )?;

        debug!(
            "Computed stats at {}: personal={}, family={}, referral={}, emergency={}",
            now.to_rfc3339(),
            personal.total,
            family.total,
            referral.total,
            emergency.total
        );

        Ok(DashboardStats {
            personal,
            family,
            referral,
            emergency,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ClinicRecords;
    use chrono::{Duration, TimeZone, Utc};
    use clinic_core::{
        FamilyFields, FileKind, Gender, ManualClock, PersonFields, ReferralFields,
    };
    use std::sync::Arc;

    fn person(name: &str) -> PersonFields {
        PersonFields {
            name: name.to_string(),
            age: 30,
            gender: Gender::Male,
        }
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let records = ClinicRecords::in_memory(clock);

        let stats = records.stats().compute_stats().await.unwrap();
        for kind in FileKind::ALL {
            let kind_stats = stats.get(kind);
            assert_eq!(kind_stats.total, 0);
            assert_eq!(kind_stats.active + kind_stats.expired, 0);
        }
    }

    #[tokio::test]
    async fn test_personal_record_moves_to_expired() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(t));
        let records = ClinicRecords::in_memory(clock.clone());

        let created = records.personal.create(person("A")).await.unwrap();
        assert_eq!(created.expiry_date, t + chrono::Months::new(12));

        let stats = records.stats().compute_stats().await.unwrap();
        assert_eq!(stats.personal.total, 1);
        assert_eq!(stats.personal.active, 1);
        assert_eq!(stats.personal.expired, 0);
        assert_eq!(stats.personal.weekly, 1);

        clock.set(created.expiry_date + Duration::days(1));
        let stats = records.stats().compute_stats().await.unwrap();
        assert_eq!(stats.personal.active, 0);
        assert_eq!(stats.personal.expired, 1);
        assert_eq!(stats.personal.weekly, 0);
    }

    #[tokio::test]
    async fn test_kinds_are_counted_independently() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(t));
        let records = ClinicRecords::in_memory(clock.clone());

        records.personal.create(person("A")).await.unwrap();
        clock.advance(Duration::days(10));
        records
            .family
            .create(FamilyFields {
                head_name: "B".to_string(),
                member_count: 3,
            })
            .await
            .unwrap();
        records
            .referral
            .create(ReferralFields {
                referral_name: "General Hospital".to_string(),
                patient_count: 45,
            })
            .await
            .unwrap();

        // 个人档案在一年后过期，家庭和转诊档案仍然有效
        let later = t + Duration::days(400);
        let stats = records.stats().compute_stats_at(later).await.unwrap();

        assert_eq!(stats.personal.expired, 1);
        assert_eq!(stats.family.active, 1);
        assert_eq!(stats.referral.active, 1);
        assert_eq!(stats.emergency.total, 0);
        for kind in FileKind::ALL {
            let s = stats.get(kind);
            assert_eq!(s.active + s.expired, s.total);
        }
    }

    #[tokio::test]
    async fn test_weekly_window() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(t));
        let records = ClinicRecords::in_memory(clock.clone());

        records.emergency.create(person("old")).await.unwrap();
        clock.advance(Duration::days(6));
        records.emergency.create(person("recent")).await.unwrap();

        let stats = records
            .stats()
            .compute_stats_at(t + Duration::days(7))
            .await
            .unwrap();
        // 恰好7天前登记的也计入本周
        assert_eq!(stats.emergency.weekly, 2);

        let stats = records
            .stats()
            .compute_stats_at(t + Duration::days(8))
            .await
            .unwrap();
        assert_eq!(stats.emergency.weekly, 1);
    }
}
