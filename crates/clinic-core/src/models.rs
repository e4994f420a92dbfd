//! 核心数据模型定义
//!
//! 四类档案（个人、家庭、转诊、急诊）共享同一套生命周期：
//! 创建时分配编号与登记时间，到期时间 = 登记时间 + 类别有效期。

use crate::error::{ClinicError, Result};
use crate::utils::{add_years, lenient_i32, lenient_opt_i32, lenient_opt_timestamp};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 统计“本周新增”的时间窗口（天）
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// 档案类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Personal,
    Family,
    Referral,
    Emergency,
}

impl FileKind {
    pub const ALL: [FileKind; 4] = [
        FileKind::Personal,
        FileKind::Family,
        FileKind::Referral,
        FileKind::Emergency,
    ];

    /// 档案编号前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            FileKind::Personal => "SJMC",
            FileKind::Family => "FAM",
            FileKind::Referral => "REF",
            FileKind::Emergency => "EMG",
        }
    }

    /// 有效期（年）
    pub fn duration_years(&self) -> u32 {
        match self {
            FileKind::Personal | FileKind::Emergency => 1,
            FileKind::Family => 2,
            FileKind::Referral => 5,
        }
    }

    /// 对应的数据库表名
    pub fn table_name(&self) -> &'static str {
        match self {
            FileKind::Personal => "personal_files",
            FileKind::Family => "family_files",
            FileKind::Referral => "referral_files",
            FileKind::Emergency => "emergency_files",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Personal => "personal",
            FileKind::Family => "family",
            FileKind::Referral => "referral",
            FileKind::Emergency => "emergency",
        }
    }

    /// 根据登记时间计算到期时间
    pub fn expiry_from(&self, registered: DateTime<Utc>) -> Result<DateTime<Utc>> {
        add_years(registered, self.duration_years()).ok_or_else(|| {
            ClinicError::Validation(format!(
                "expiry date out of range for registration date {}",
                registered
            ))
        })
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(FileKind::Personal),
            "family" => Ok(FileKind::Family),
            "referral" => Ok(FileKind::Referral),
            "emergency" => Ok(FileKind::Emergency),
            other => Err(ClinicError::Validation(format!("unknown file kind: {}", other))),
        }
    }
}

/// 性别枚举
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(ClinicError::Validation(format!("unknown gender: {}", other))),
        }
    }
}

/// 档案状态，读取时根据到期时间计算，不落库
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecordStatus {
    Active,
    Expired,
}

impl RecordStatus {
    pub fn at(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if expiry_date >= now {
            RecordStatus::Active
        } else {
            RecordStatus::Expired
        }
    }
}

/// 类别专属字段
pub trait RecordFields:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 部分更新结构，每个字段均为可选
    type Patch: Clone
        + fmt::Debug
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// 字段规则校验
    fn validate(&self) -> Result<()>;

    /// 只覆盖补丁中出现的字段
    fn apply_patch(&mut self, patch: &Self::Patch);

    fn patch_is_empty(patch: &Self::Patch) -> bool;
}

/// 档案类别的类型级标记
pub trait RecordKind: Send + Sync + 'static {
    const KIND: FileKind;
    type Fields: RecordFields;
}

/// 个人档案
#[derive(Debug, Clone, Copy)]
pub struct Personal;

/// 家庭档案
#[derive(Debug, Clone, Copy)]
pub struct Family;

/// 转诊档案
#[derive(Debug, Clone, Copy)]
pub struct Referral;

/// 急诊档案（字段与个人档案相同）
#[derive(Debug, Clone, Copy)]
pub struct Emergency;

impl RecordKind for Personal {
    const KIND: FileKind = FileKind::Personal;
    type Fields = PersonFields;
}

impl RecordKind for Family {
    const KIND: FileKind = FileKind::Family;
    type Fields = FamilyFields;
}

impl RecordKind for Referral {
    const KIND: FileKind = FileKind::Referral;
    type Fields = ReferralFields;
}

impl RecordKind for Emergency {
    const KIND: FileKind = FileKind::Emergency;
    type Fields = PersonFields;
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClinicError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// 个人/急诊档案字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFields {
    pub name: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub age: i32,
    pub gender: Gender,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_i32",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl RecordFields for PersonFields {
    type Patch = PersonPatch;

    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        if self.age < 0 {
            return Err(ClinicError::Validation("age must not be negative".to_string()));
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: &PersonPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
    }

    fn patch_is_empty(patch: &PersonPatch) -> bool {
        patch.name.is_none() && patch.age.is_none() && patch.gender.is_none()
    }
}

/// 家庭档案字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyFields {
    pub head_name: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub member_count: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_i32",
        skip_serializing_if = "Option::is_none"
    )]
    pub member_count: Option<i32>,
}

impl RecordFields for FamilyFields {
    type Patch = FamilyPatch;

    fn validate(&self) -> Result<()> {
        require_text("headName", &self.head_name)?;
        if self.member_count < 1 {
            return Err(ClinicError::Validation(
                "memberCount must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: &FamilyPatch) {
        if let Some(head_name) = &patch.head_name {
            self.head_name = head_name.clone();
        }
        if let Some(member_count) = patch.member_count {
            self.member_count = member_count;
        }
    }

    fn patch_is_empty(patch: &FamilyPatch) -> bool {
        patch.head_name.is_none() && patch.member_count.is_none()
    }
}

/// 转诊档案字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralFields {
    pub referral_name: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub patient_count: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_i32",
        skip_serializing_if = "Option::is_none"
    )]
    pub patient_count: Option<i32>,
}

impl RecordFields for ReferralFields {
    type Patch = ReferralPatch;

    fn validate(&self) -> Result<()> {
        require_text("referralName", &self.referral_name)?;
        if self.patient_count < 0 {
            return Err(ClinicError::Validation(
                "patientCount must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: &ReferralPatch) {
        if let Some(referral_name) = &patch.referral_name {
            self.referral_name = referral_name.clone();
        }
        if let Some(patient_count) = patch.patient_count {
            self.patient_count = patient_count;
        }
    }

    fn patch_is_empty(patch: &ReferralPatch) -> bool {
        patch.referral_name.is_none() && patch.patient_count.is_none()
    }
}

/// 档案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<F> {
    pub id: String,
    #[serde(flatten)]
    pub fields: F,
    pub registration_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

impl<F: RecordFields> Record<F> {
    /// 当前时间下的档案状态
    pub fn status_at(&self, now: DateTime<Utc>) -> RecordStatus {
        RecordStatus::at(self.expiry_date, now)
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == RecordStatus::Active
    }

    /// 应用部分更新，不做校验
    pub fn apply(&mut self, patch: &RecordPatch<F::Patch>) {
        self.fields.apply_patch(&patch.fields);
        if let Some(registration_date) = patch.registration_date {
            self.registration_date = registration_date;
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = expiry_date;
        }
    }

    /// 校验字段规则以及 到期时间 > 登记时间
    pub fn validate(&self) -> Result<()> {
        self.fields.validate()?;
        if self.expiry_date <= self.registration_date {
            return Err(ClinicError::Validation(format!(
                "expiryDate ({}) must be after registrationDate ({})",
                self.expiry_date.to_rfc3339(),
                self.registration_date.to_rfc3339()
            )));
        }
        Ok(())
    }

    /// 附带派生状态的视图
    pub fn with_status(self, now: DateTime<Utc>) -> RecordView<F> {
        let status = self.status_at(now);
        RecordView {
            record: self,
            status,
        }
    }
}

/// 对外展示的档案，包含读取时计算的状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView<F> {
    #[serde(flatten)]
    pub record: Record<F>,
    pub status: RecordStatus,
}

/// 档案部分更新：类别字段 + 可选的日期
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch<P> {
    #[serde(flatten)]
    pub fields: P,
    #[serde(
        default,
        deserialize_with = "lenient_opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl<P> RecordPatch<P> {
    pub fn fields(fields: P) -> Self {
        Self {
            fields,
            registration_date: None,
            expiry_date: None,
        }
    }

    pub fn is_empty<F>(&self) -> bool
    where
        F: RecordFields<Patch = P>,
    {
        F::patch_is_empty(&self.fields)
            && self.registration_date.is_none()
            && self.expiry_date.is_none()
    }
}

/// 删除结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
}

/// 单个类别的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    pub total: u64,
    pub weekly: u64,
    pub expired: u64,
    pub active: u64,
}

impl KindStats {
    /// 扫描档案集合计算统计，`now` 对所有判断保持一致
    pub fn tally<'a, F, I>(records: I, now: DateTime<Utc>) -> Self
    where
        F: RecordFields,
        I: IntoIterator<Item = &'a Record<F>>,
    {
        let week_start = week_start(now);
        records.into_iter().fold(KindStats::default(), |mut stats, record| {
            stats.total += 1;
            if record.registration_date >= week_start {
                stats.weekly += 1;
            }
            match record.status_at(now) {
                RecordStatus::Active => stats.active += 1,
                RecordStatus::Expired => stats.expired += 1,
            }
            stats
        })
    }
}

/// 本周窗口起点：now − 7 天
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(WEEKLY_WINDOW_DAYS)
}

/// 仪表盘统计，按类别名组织
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub personal: KindStats,
    pub family: KindStats,
    pub referral: KindStats,
    pub emergency: KindStats,
}

impl DashboardStats {
    pub fn get(&self, kind: FileKind) -> &KindStats {
        match kind {
            FileKind::Personal => &self.personal,
            FileKind::Family => &self.family,
            FileKind::Referral => &self.referral,
            FileKind::Emergency => &self.emergency,
        }
    }
}
