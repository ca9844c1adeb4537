//! 大小与日期字符串解析
use chrono::{Local, NaiveDate, TimeZone};
use std::time::SystemTime;

use crate::error::ParseError;

/// 大小单位（1024 的幂）
const SIZE_UNITS: [(char, u64); 4] = [
    ('K', 1024),
    ('M', 1024 * 1024),
    ('G', 1024 * 1024 * 1024),
    ('T', 1024 * 1024 * 1024 * 1024),
];

/// 解析带可选单位后缀的大小字符串，例如 "10K" → 10240；无单位视为字节数
pub fn parse_size_string(value: &str) -> Result<u64, ParseError> {
    let trimmed = value.trim();
    let invalid = |message: String| ParseError::InvalidSize { value: value.to_string(), message };

    let last = match trimmed.chars().last() {
        Some(c) => c.to_ascii_uppercase(),
        None => return Err(invalid("empty size value".to_string())),
    };
    let (num_str, multiplier) = match SIZE_UNITS.iter().find(|(unit, _)| *unit == last) {
        Some((_, mult)) => (&trimmed[..trimmed.len() - 1], *mult),
        None => (trimmed, 1u64),
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| invalid(format!("cannot parse '{}' as number", num_str)))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| invalid("size overflows u64".to_string()))
}

/// 解析 DD-MM-YYYY，返回本地时区当天零点
pub fn parse_date_string(value: &str) -> Result<SystemTime, ParseError> {
    let invalid = || ParseError::InvalidDate { value: value.to_string() };

    let date = NaiveDate::parse_from_str(value.trim(), "%d-%m-%Y").map_err(|_| invalid())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    // 夏令时切换导致零点不存在时取最早的合法时刻
    let local = Local.from_local_datetime(&midnight).earliest().ok_or_else(invalid)?;

    Ok(local.into())
}
