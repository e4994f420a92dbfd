//! 档案存储
//!
//! 四类档案共用同一个泛型存储，类别差异（编号前缀、有效期、字段规则）
//! 全部来自 `RecordKind`。

use chrono::{DateTime, Utc};
use clinic_core::utils::generate_record_id;
use clinic_core::{
    Clock, DeleteOutcome, FileKind, KindStats, Record, RecordFields, RecordKind, Result,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::repository::{KindPatch, KindRecord, RecordRepository};

/// 单个类别的档案存储
pub struct RecordStore<K: RecordKind> {
    repository: Arc<dyn RecordRepository<K>>,
    clock: Arc<dyn Clock>,
}

impl<K: RecordKind> RecordStore<K> {
    pub fn new(repository: Arc<dyn RecordRepository<K>>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn kind(&self) -> FileKind {
        K::KIND
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// 全部档案，按登记时间倒序
    pub async fn find(&self) -> Result<Vec<KindRecord<K>>> {
        let records = self.repository.list().await?;
        debug!("Listed {} {} records", records.len(), K::KIND);
        Ok(records)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<KindRecord<K>>> {
        self.repository.get(id).await
    }

    /// 创建档案：分配编号，登记时间为当前时间，到期时间按类别有效期推算
    pub async fn create(&self, fields: K::Fields) -> Result<KindRecord<K>> {
        if let Err(e) = fields.validate() {
            warn!("Rejected new {} record: {}", K::KIND, e);
            return Err(e);
        }

        let registration_date = self.clock.now();
        let record = Record {
            id: generate_record_id(K::KIND.prefix()),
            fields,
            registration_date,
            expiry_date: K::KIND.expiry_from(registration_date)?,
        };

        self.repository.insert(&record).await?;
        info!(
            "Created {} record {} (expires {})",
            K::KIND,
            record.id,
            record.expiry_date.to_rfc3339()
        );
        Ok(record)
    }

    /// 部分更新：只修改补丁中出现的字段，记录不存在时返回 None
    pub async fn update(&self, id: &str, patch: KindPatch<K>) -> Result<Option<KindRecord<K>>> {
        let Some(mut record) = self.repository.get(id).await? else {
            debug!("Update skipped, {} record {} not found", K::KIND, id);
            return Ok(None);
        };

        if patch.is_empty::<K::Fields>() {
            return Ok(Some(record));
        }

        record.apply(&patch);
        if let Err(e) = record.validate() {
            warn!("Rejected update of {} record {}: {}", K::KIND, id, e);
            return Err(e);
        }

        // 读取与写回之间被删除时按未找到处理
        if !self.repository.replace(&record).await? {
            return Ok(None);
        }

        info!("Updated {} record {}", K::KIND, id);
        Ok(Some(record))
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let success = self.repository.remove(id).await?;
        if success {
            info!("Deleted {} record {}", K::KIND, id);
        } else {
            debug!("Delete skipped, {} record {} not found", K::KIND, id);
        }
        Ok(DeleteOutcome { success })
    }

    /// 以给定时间计算本类别统计
    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<KindStats> {
        self.repository.counts(now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRepository;
    use chrono::{Duration, Months, TimeZone};
    use clinic_core::{
        ClinicError, Emergency, Family, FamilyFields, FamilyPatch, Gender, ManualClock,
        PersonFields, PersonPatch, Personal, Referral, ReferralFields, RecordPatch,
    };

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
    }

    fn store<K: RecordKind>() -> (RecordStore<K>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let store = RecordStore::new(Arc::new(MemoryRepository::<K>::new()), clock.clone());
        (store, clock)
    }

    fn person(name: &str) -> PersonFields {
        PersonFields {
            name: name.to_string(),
            age: 30,
            gender: Gender::Male,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_dates() {
        let (personal, _) = store::<Personal>();
        let record = personal.create(person("A")).await.unwrap();

        assert!(record.id.starts_with("SJMC-"));
        assert_eq!(record.registration_date, start());
        assert_eq!(record.expiry_date, start() + Months::new(12));
        assert!(record.is_active_at(start()));
    }

    #[tokio::test]
    async fn test_expiry_duration_per_kind() {
        let (family, _) = store::<Family>();
        let record = family
            .create(FamilyFields {
                head_name: "B".to_string(),
                member_count: 3,
            })
            .await
            .unwrap();
        assert!(record.id.starts_with("FAM-"));
        assert_eq!(record.expiry_date, record.registration_date + Months::new(24));

        let (referral, _) = store::<Referral>();
        let record = referral
            .create(ReferralFields {
                referral_name: "Dr. Anderson".to_string(),
                patient_count: 12,
            })
            .await
            .unwrap();
        assert!(record.id.starts_with("REF-"));
        assert_eq!(record.expiry_date, record.registration_date + Months::new(60));

        let (emergency, _) = store::<Emergency>();
        let record = emergency.create(person("Anonymous")).await.unwrap();
        assert!(record.id.starts_with("EMG-"));
        assert_eq!(record.expiry_date, record.registration_date + Months::new(12));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let (family, _) = store::<Family>();
        let result = family
            .create(FamilyFields {
                head_name: "B".to_string(),
                member_count: 0,
            })
            .await;
        assert!(matches!(result, Err(ClinicError::Validation(_))));
        assert!(family.find().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_orders_by_registration_desc() {
        let (personal, clock) = store::<Personal>();
        let first = personal.create(person("first")).await.unwrap();
        clock.advance(Duration::minutes(5));
        let second = personal.create(person("second")).await.unwrap();

        let ids: Vec<String> = personal.find().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_empty_update_is_noop() {
        let (personal, clock) = store::<Personal>();
        let created = personal.create(person("A")).await.unwrap();
        clock.advance(Duration::days(1));

        let updated = personal
            .update(&created.id, RecordPatch::default())
            .await
            .unwrap();
        assert_eq!(updated, Some(created));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let (personal, _) = store::<Personal>();
        let created = personal.create(person("A")).await.unwrap();

        let patch = RecordPatch::fields(PersonPatch {
            age: Some(31),
            ..Default::default()
        });
        let updated = personal.update(&created.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.fields.age, 31);
        assert_eq!(updated.fields.name, "A");
        assert_eq!(updated.fields.gender, Gender::Male);
        assert_eq!(updated.registration_date, created.registration_date);
        assert_eq!(updated.expiry_date, created.expiry_date);
        assert_eq!(personal.find_by_id(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let (family, _) = store::<Family>();
        let patch = RecordPatch::fields(FamilyPatch {
            member_count: Some(5),
            ..Default::default()
        });
        assert_eq!(family.update("FAM-NOPE", patch).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_date_edit_validated_for_every_kind() {
        let (family, _) = store::<Family>();
        let created = family
            .create(FamilyFields {
                head_name: "B".to_string(),
                member_count: 2,
            })
            .await
            .unwrap();

        let mut patch = RecordPatch::<FamilyPatch>::default();
        patch.expiry_date = Some(created.registration_date - Duration::days(1));
        let result = family.update(&created.id, patch).await;
        assert!(matches!(result, Err(ClinicError::Validation(_))));
        assert_eq!(family.find_by_id(&created.id).await.unwrap(), Some(created.clone()));

        let mut patch = RecordPatch::<FamilyPatch>::default();
        patch.expiry_date = Some(created.registration_date + Duration::days(30));
        let updated = family.update(&created.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.expiry_date, created.registration_date + Duration::days(30));
    }

    #[tokio::test]
    async fn test_delete() {
        let (personal, _) = store::<Personal>();
        let keep = personal.create(person("keep")).await.unwrap();
        let gone = personal.create(person("gone")).await.unwrap();

        assert!(personal.delete(&gone.id).await.unwrap().success);
        let ids: Vec<String> = personal.find().await.unwrap().into_iter().map(|r| r.id).collect();
        assert!(!ids.contains(&gone.id));

        let again = personal.delete(&gone.id).await.unwrap();
        assert!(!again.success);
        let ids_after: Vec<String> =
            personal.find().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids_after, vec![keep.id]);
    }

    #[tokio::test]
    async fn test_record_expires_as_time_passes() {
        let (personal, clock) = store::<Personal>();
        let record = personal.create(person("A")).await.unwrap();

        let stats = personal.stats_at(clock.now()).await.unwrap();
        assert_eq!((stats.active, stats.expired), (1, 0));

        clock.set(record.expiry_date + Duration::seconds(1));
        let stats = personal.stats_at(clock.now()).await.unwrap();
        assert_eq!((stats.active, stats.expired), (0, 1));
        assert_eq!(stats.total, 1);
    }
}
