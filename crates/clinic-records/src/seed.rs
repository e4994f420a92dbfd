//! 演示数据
//!
//! 仅向空的档案集合写入示例记录，时间相对于给定的当前时间。

use chrono::{DateTime, Duration, Utc};
use clinic_core::{
    FamilyFields, Gender, PersonFields, Record, RecordKind, ReferralFields, Result,
};
use tracing::info;

use crate::repository::{RecordRepository, Repositories};

fn person(name: &str, age: i32, gender: Gender) -> PersonFields {
    PersonFields {
        name: name.to_string(),
        age,
        gender,
    }
}

fn record<F>(id: &str, fields: F, registered: DateTime<Utc>, expires: DateTime<Utc>) -> Record<F> {
    Record {
        id: id.to_string(),
        fields,
        registration_date: registered,
        expiry_date: expires,
    }
}

async fn seed_kind<K: RecordKind>(
    repository: &dyn RecordRepository<K>,
    records: Vec<Record<K::Fields>>,
) -> Result<usize> {
    if !repository.list().await?.is_empty() {
        return Ok(0);
    }
    let count = records.len();
    for record in &records {
        repository.insert(record).await?;
    }
    info!("Seeded {} demo {} records", count, K::KIND);
    Ok(count)
}

/// 写入演示数据，返回新写入的记录数
pub async fn seed_demo_data(repositories: &Repositories, now: DateTime<Utc>) -> Result<usize> {
    let days = Duration::days;
    let years = |n: i64| Duration::days(365 * n);

    let personal = vec![
        record("SJMC-1", person("John Doe", 34, Gender::Male), now - days(5), now + years(1)),
        record("SJMC-2", person("Jane Smith", 28, Gender::Female), now - days(12), now + years(1)),
        record("SJMC-3", person("Peter Jones", 52, Gender::Male), now - days(45), now - days(10)),
        record("SJMC-4", person("Mary Williams", 41, Gender::Female), now - days(2), now + years(1)),
    ];

    let family = vec![
        record(
            "FAM-1",
            FamilyFields {
                head_name: "Michael Miller".to_string(),
                member_count: 4,
            },
            now - days(20),
            now + years(2),
        ),
        record(
            "FAM-2",
            FamilyFields {
                head_name: "Jessica Wilson".to_string(),
                member_count: 3,
            },
            now - days(60),
            now + years(2),
        ),
    ];

    let referral = vec![
        record(
            "REF-1",
            ReferralFields {
                referral_name: "Dr. Anderson".to_string(),
                patient_count: 12,
            },
            now - days(10),
            now + years(5),
        ),
        record(
            "REF-2",
            ReferralFields {
                referral_name: "General Hospital".to_string(),
                patient_count: 45,
            },
            now - days(180),
            now - days(5),
        ),
    ];

    let emergency = vec![record(
        "EMG-1",
        person("Anonymous Patient 1", 45, Gender::Male),
        now - days(1),
        now + years(1),
    )];

    let mut inserted = 0;
    inserted += seed_kind(repositories.personal.as_ref(), personal).await?;
    inserted += seed_kind(repositories.family.as_ref(), family).await?;
    inserted += seed_kind(repositories.referral.as_ref(), referral).await?;
    inserted += seed_kind(repositories.emergency.as_ref(), emergency).await?;
    Ok(inserted)
}
