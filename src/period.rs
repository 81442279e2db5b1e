use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::date_util::{end_of_day, start_of_day};
use crate::error::{Error, Result};

/// Aggregation window kind for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

/// An inclusive `[start, end]` time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.start && *ts <= self.end
    }

    /// Calendar dates covered by the window (inclusive).
    pub fn dates(&self) -> (NaiveDate, NaiveDate) {
        (self.start.date(), self.end.date())
    }
}

impl Period {
    /// Parse a period kind.
    ///
    /// Supported: `daily`, `weekly`, `monthly` (case-insensitive). Anything
    /// else is rejected rather than defaulted.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => Err(Error::InvalidPeriod(format!(
                "unsupported period kind: {other:?} (expected daily, weekly or monthly)"
            ))),
        }
    }

    /// Canonical key used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    /// Nominal length of the window in days.
    pub fn window_days(&self) -> u32 {
        match self {
            Period::Daily => 1,
            Period::Weekly => 7,
            Period::Monthly => 30,
        }
    }

    /// Current window for a reference timestamp.
    ///
    /// Daily windows cover the reference's calendar day. Weekly and monthly
    /// windows are rolling lookbacks ending at the reference itself.
    pub fn window(&self, reference: NaiveDateTime) -> Window {
        match self {
            Period::Daily => {
                let day = reference.date();
                Window {
                    start: start_of_day(day),
                    end: end_of_day(day),
                }
            }
            Period::Weekly | Period::Monthly => Window {
                start: reference - Duration::days(self.window_days() as i64),
                end: reference,
            },
        }
    }

    /// The immediately preceding window of equal length.
    pub fn previous_window(&self, reference: NaiveDateTime) -> Window {
        let current = self.window(reference);
        match self {
            Period::Daily => {
                let day = current.start.date() - Duration::days(1);
                Window {
                    start: start_of_day(day),
                    end: end_of_day(day),
                }
            }
            Period::Weekly | Period::Monthly => Window {
                start: current.start - Duration::days(self.window_days() as i64),
                end: current.start,
            },
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Period::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_util::format_timestamp;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(Period::parse("daily").unwrap(), Period::Daily);
        assert_eq!(Period::parse("Weekly").unwrap(), Period::Weekly);
        assert_eq!(Period::parse(" MONTHLY ").unwrap(), Period::Monthly);
        assert_eq!("weekly".parse::<Period>().unwrap(), Period::Weekly);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["yearly", "", "2025-Q1", "week"] {
            match Period::parse(bad) {
                Err(Error::InvalidPeriod(_)) => {}
                other => panic!("expected InvalidPeriod for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_daily_window_is_calendar_day() {
        let w = Period::Daily.window(at(2025, 3, 9, 14, 30));
        assert_eq!(format_timestamp(&w.start), "2025-03-09T00:00:00.000");
        assert_eq!(format_timestamp(&w.end), "2025-03-09T23:59:59.999");

        let prev = Period::Daily.previous_window(at(2025, 3, 9, 14, 30));
        assert_eq!(format_timestamp(&prev.start), "2025-03-08T00:00:00.000");
        assert_eq!(format_timestamp(&prev.end), "2025-03-08T23:59:59.999");
    }

    #[test]
    fn test_weekly_window_is_rolling() {
        let reference = at(2025, 3, 9, 14, 30);
        let w = Period::Weekly.window(reference);
        assert_eq!(w.start, at(2025, 3, 2, 14, 30));
        assert_eq!(w.end, reference);

        let prev = Period::Weekly.previous_window(reference);
        assert_eq!(prev.start, at(2025, 2, 23, 14, 30));
        assert_eq!(prev.end, at(2025, 3, 2, 14, 30));
    }

    #[test]
    fn test_monthly_window_is_thirty_days() {
        let reference = at(2025, 3, 31, 9, 0);
        let w = Period::Monthly.window(reference);
        assert_eq!(w.start, at(2025, 3, 1, 9, 0));

        let prev = Period::Monthly.previous_window(reference);
        assert_eq!(prev.start, at(2025, 1, 30, 9, 0));
        assert_eq!(prev.end, w.start);
    }

    #[test]
    fn test_window_contains() {
        let w = Period::Daily.window(at(2025, 3, 9, 0, 0));
        assert!(w.contains(&at(2025, 3, 9, 23, 59)));
        assert!(!w.contains(&at(2025, 3, 10, 0, 0)));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Period::Monthly).unwrap(), "\"monthly\"");
        let p: Period = serde_json::from_str("\"daily\"").unwrap();
        assert_eq!(p, Period::Daily);
    }
}
