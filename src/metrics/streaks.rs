//! Writing and positivity streaks.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use super::types::{StreakRecords, Streaks};
use crate::journal::{Entry, SentimentRecord};

/// Consecutive calendar days with at least one entry at or before `until`,
/// ending on `until`'s day.
///
/// Several entries on one day count once. No entry on that day means no
/// current streak.
pub fn current_writing_streak(entries: &[Entry], until: NaiveDateTime) -> u32 {
    let today = until.date();
    let days: BTreeSet<NaiveDate> = entries
        .iter()
        .filter(|e| e.created_at <= until)
        .map(|e| e.created_at.date())
        .collect();

    let mut streak = 0;
    for (i, day) in days.iter().rev().enumerate() {
        if (today - *day).num_days() == i as i64 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Consecutive positive records counting back from the most recent one at or
/// before `until`.
pub fn current_positive_streak(records: &[SentimentRecord], until: NaiveDateTime) -> u32 {
    let mut recent: Vec<&SentimentRecord> =
        records.iter().filter(|r| r.created_at <= until).collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    recent.iter().take_while(|r| r.score > 0.0).count() as u32
}

/// Current streaks, both cut off at `until`, folded into the stored
/// best-ever values.
pub fn calculate_streaks(
    entries: &[Entry],
    records: &[SentimentRecord],
    until: NaiveDateTime,
    previous: StreakRecords,
) -> Streaks {
    let current_writing = current_writing_streak(entries, until);
    let current_positive = current_positive_streak(records, until);

    Streaks {
        current_writing,
        current_positive,
        record_writing: previous.record_writing.max(current_writing),
        record_positive: previous.record_positive.max(current_positive),
    }
}

impl Streaks {
    pub fn records(&self) -> StreakRecords {
        StreakRecords {
            record_writing: self.record_writing,
            record_positive: self.record_positive,
        }
    }
}
