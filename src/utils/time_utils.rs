use chrono::{DateTime, Datelike, NaiveDate};

pub const STANDARD_DATE_FORMAT: &str = "%Y-%m-%d";

const ACCEPTED_FORMATS: &[&str] = &[STANDARD_DATE_FORMAT, "%d/%m/%Y", "%Y/%m/%d"];

/// Parses a calendar date. Accepts ISO dates, day-first dates and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(STANDARD_DATE_FORMAT).to_string()
}

/// Bucket key for weekly resampling (ISO week, Monday to Sunday).
pub fn week_key(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

/// Bucket key for monthly resampling.
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
