//! 通用工具函数

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// 档案编号随机后缀长度
pub const ID_SUFFIX_LEN: usize = 9;

const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 生成档案编号：`前缀-` + 9位大写36进制随机串
pub fn generate_record_id(prefix: &str) -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut suffix = [b'0'; ID_SUFFIX_LEN];
    for slot in suffix.iter_mut().rev() {
        *slot = BASE36_DIGITS[(value % 36) as usize];
        value /= 36;
    }
    // suffix 只包含 ASCII 字符
    format!("{}-{}", prefix, String::from_utf8_lossy(&suffix))
}

/// 验证档案编号格式
pub fn is_valid_record_id(id: &str, prefix: &str) -> bool {
    match id.split_once('-') {
        Some((p, suffix)) => {
            p == prefix
                && suffix.len() == ID_SUFFIX_LEN
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        }
        None => false,
    }
}

/// 按日历年累加，2月29日加一年落在2月28日
pub fn add_years(from: DateTime<Utc>, years: u32) -> Option<DateTime<Utc>> {
    from.checked_add_months(Months::new(years.checked_mul(12)?))
}

/// 宽松的整数转换：数字或字符串前缀数字，无法解析时为0
pub fn coerce_i32(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0),
        Value::String(s) => parse_leading_int(s).unwrap_or(0),
        _ => 0,
    }
}

fn parse_leading_int(input: &str) -> Option<i32> {
    let trimmed = input.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1i64, &trimmed[1..]),
        Some(b'+') => (1i64, &trimmed[1..]),
        _ => (1i64, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    i32::try_from(sign * magnitude).ok()
}

/// serde 适配：宽松整数字段
pub fn lenient_i32<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_i32(&value))
}

/// serde 适配：可选的宽松整数字段（部分更新）
pub fn lenient_opt_i32<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| coerce_i32(&v)))
}

/// 解析时间：RFC 3339、`YYYY-MM-DD HH:MM:SS`（按UTC）或 `YYYY-MM-DD`（当天零点UTC）
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// serde 适配：可选时间字段，格式见 [`parse_timestamp`]
pub fn lenient_opt_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
    }
}
