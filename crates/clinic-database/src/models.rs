//! 数据库模型
//!
//! 类别字段与表列之间的映射。列清单是静态的，语句在仓储创建时一次生成，
//! 部分更新由存储层在内存中合并后整行写回。

use clinic_core::{FamilyFields, Gender, PersonFields, RecordFields, ReferralFields};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

/// Postgres 查询类型
pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// 类别字段的列映射
pub trait PgFields: RecordFields {
    /// 类别专属列（不含 id 和日期列），顺序与 `bind` 一致
    const COLUMNS: &'static [&'static str];

    /// 建表时的列定义
    const COLUMN_DEFINITIONS: &'static str;

    /// 按 `COLUMNS` 顺序绑定参数
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

fn decode_gender(value: &str) -> Result<Gender, sqlx::Error> {
    value
        .parse::<Gender>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl PgFields for PersonFields {
    const COLUMNS: &'static [&'static str] = &["name", "age", "gender"];

    const COLUMN_DEFINITIONS: &'static str = r#"
                name VARCHAR(255) NOT NULL,
                age INTEGER NOT NULL,
                gender VARCHAR(10) NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),"#;

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.age)
            .bind(self.gender.as_str())
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let gender: String = row.try_get("gender")?;
        Ok(Self {
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            gender: decode_gender(&gender)?,
        })
    }
}

impl PgFields for FamilyFields {
    const COLUMNS: &'static [&'static str] = &["head_name", "member_count"];

    const COLUMN_DEFINITIONS: &'static str = r#"
                head_name VARCHAR(255) NOT NULL,
                member_count INTEGER NOT NULL,"#;

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(&self.head_name).bind(self.member_count)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            head_name: row.try_get("head_name")?,
            member_count: row.try_get("member_count")?,
        })
    }
}

impl PgFields for ReferralFields {
    const COLUMNS: &'static [&'static str] = &["referral_name", "patient_count"];

    const COLUMN_DEFINITIONS: &'static str = r#"
                referral_name VARCHAR(255) NOT NULL,
                patient_count INTEGER NOT NULL,"#;

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(&self.referral_name).bind(self.patient_count)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            referral_name: row.try_get("referral_name")?,
            patient_count: row.try_get("patient_count")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_definitions_cover_columns() {
        fn check<F: PgFields>() {
            for column in F::COLUMNS {
                assert!(
                    F::COLUMN_DEFINITIONS.contains(column),
                    "missing definition for {}",
                    column
                );
            }
        }
        check::<PersonFields>();
        check::<FamilyFields>();
        check::<ReferralFields>();
    }

    #[test]
    fn test_decode_gender() {
        assert_eq!(decode_gender("Female").unwrap(), Gender::Female);
        assert!(decode_gender("F").is_err());
    }
}
