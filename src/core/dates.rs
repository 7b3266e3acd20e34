//! Permissive date/time parsing for the `Date` column.
//!
//! Accepts ISO-8601 (with or without time), RFC 3339 / RFC 2822 timestamps,
//! slash/dash/dot separated calendar dates and spelled-out month names.
//! Ambiguous numeric forms such as `01/05/2024` are read month-first; a day-first
//! reading is only used when the month-first one is not a valid date.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S%.f",
    "%Y.%m.%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m-%d-%Y %H:%M:%S%.f",
    "%m-%d-%Y %H:%M",
    "%m.%d.%Y %H:%M:%S%.f",
    "%m.%d.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%m/%d/%y %H:%M:%S%.f",
    "%m/%d/%y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%m-%d-%y",
    "%d/%m/%y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
];

/// 解析日期或時間字串，失敗時回傳 `None`
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    // 帶時區的時間戳一律換算成 UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_utc());
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .find(|dt| plausible_year(dt.year()))
    {
        return Some(dt);
    }

    if let Some(date) = parse_compact(value) {
        return date.and_hms_opt(0, 0, 0);
    }

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .find(|date| plausible_year(date.year()))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// `%Y` 也接受兩位數年份，這裡擋掉，讓 `%y` 的格式接手
fn plausible_year(year: i32) -> bool {
    (1000..=9999).contains(&year)
}

/// `YYYYMMDD`
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).filter(|date| plausible_year(date.year()))
}
