use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Storage format for timestamps. Fixed width so string order is time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Storage format for snapshot dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// First instant of a calendar day.
pub fn start_of_day(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::MIN)
}

/// Last millisecond of a calendar day (23:59:59.999).
pub fn end_of_day(d: NaiveDate) -> NaiveDateTime {
    // 23:59:59.999 always exists, so the fallback is never taken.
    d.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| start_of_day(d))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp as written by the CLI or an import file.
///
/// Accepts the storage format, `YYYY-MM-DD HH:MM[:SS]`, RFC 3339 (offset is
/// dropped, wall-clock time kept) and a bare date (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        TIMESTAMP_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .map(start_of_day)
}

/// Fractional days from `from` to `to`.
pub fn days_between(from: &NaiveDateTime, to: &NaiveDateTime) -> f64 {
    (*to - *from).num_milliseconds() as f64 / 86_400_000.0
}

/// Round to one decimal place, the precision snapshots are stored with.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
