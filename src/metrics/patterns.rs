//! Weekday, time-of-day and word patterns in sentiment scores.
//!
//! Every dimension goes through [`rank_by_mean`]: bucket `(key, value)`
//! pairs, average each bucket, rank the buckets. Adding a dimension means
//! writing a key function, not another ranking loop.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use super::base::words;
use super::constants::*;
use super::types::{Patterns, Triggers};
use crate::journal::{join_scores, Entry, SentimentRecord};

/// Sunday first, matching `num_days_from_sunday`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const STOP_WORDS: &[&str] = &[
    "that", "this", "with", "have", "from", "they", "them", "then", "than", "there", "their",
    "what", "when", "were", "been", "will", "would", "could", "should", "about", "into", "just",
    "like", "very", "really", "some", "also", "because", "after", "before", "which", "while",
    "your", "mine", "today", "said",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn of(ts: &NaiveDateTime) -> Self {
        let hour = ts.hour();
        if hour < MORNING_END_HOUR {
            TimeOfDay::Morning
        } else if hour < EVENING_START_HOUR {
            TimeOfDay::Afternoon
        } else {
            TimeOfDay::Evening
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }
}

/// One non-empty bucket after aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedBucket<K> {
    pub key: K,
    pub mean: f64,
    pub count: usize,
}

/// Group values by key and rank the groups by mean, highest first.
///
/// Ties keep the natural key order, so results are deterministic.
pub fn rank_by_mean<K, I>(pairs: I) -> Vec<RankedBucket<K>>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut buckets: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for (key, value) in pairs {
        let slot = buckets.entry(key).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    let mut ranked: Vec<RankedBucket<K>> = buckets
        .into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(key, (sum, count))| RankedBucket {
            key,
            mean: sum / count as f64,
            count,
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    ranked
}

fn top_labels<K>(ranked: &[RankedBucket<K>], n: usize, label: impl Fn(&K) -> String) -> Vec<String> {
    ranked.iter().take(n).map(|b| label(&b.key)).collect()
}

/// Weekday names with the highest mean score.
pub fn best_days(records: &[SentimentRecord]) -> Vec<String> {
    let ranked = rank_by_mean(
        records
            .iter()
            .map(|r| (r.created_at.weekday().num_days_from_sunday(), r.score)),
    );
    top_labels(&ranked, TOP_PATTERN_GROUPS, |d| {
        WEEKDAY_NAMES[*d as usize].to_string()
    })
}

/// Times of day with the highest mean score.
pub fn best_times(records: &[SentimentRecord]) -> Vec<String> {
    let ranked = rank_by_mean(records.iter().map(|r| (TimeOfDay::of(&r.created_at), r.score)));
    top_labels(&ranked, TOP_PATTERN_GROUPS, |t| t.as_str().to_string())
}

fn is_content_word(w: &str) -> bool {
    w.chars().count() >= TRIGGER_MIN_WORD_LEN
        && w.chars().all(|c| c.is_alphabetic())
        && !STOP_WORDS.contains(&w)
}

/// Words whose entries score well above or below the rest.
///
/// A word is bucketed once per entry containing it, so its mean is the mean
/// score of those entries.
pub fn identify_triggers(entries: &[Entry], records: &[SentimentRecord]) -> Triggers {
    let scored = join_scores(entries, records);
    let pairs = scored.iter().flat_map(|(entry, score)| {
        let distinct: BTreeSet<String> = words(&entry.text)
            .into_iter()
            .filter(|w| is_content_word(w))
            .collect();
        distinct.into_iter().map(move |w| (w, *score))
    });

    let ranked: Vec<RankedBucket<String>> = rank_by_mean(pairs)
        .into_iter()
        .filter(|b| b.count >= TRIGGER_MIN_ENTRIES)
        .collect();

    let positive = ranked
        .iter()
        .filter(|b| b.mean > 0.0)
        .take(TOP_TRIGGERS)
        .map(|b| b.key.clone())
        .collect();
    let mut lowest: Vec<&RankedBucket<String>> = ranked.iter().filter(|b| b.mean < 0.0).collect();
    lowest.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    let negative = lowest
        .into_iter()
        .take(TOP_TRIGGERS)
        .map(|b| b.key.clone())
        .collect();

    Triggers { positive, negative }
}

/// Best days, best times and triggers for a set of entries and their scores.
pub fn identify_patterns(entries: &[Entry], records: &[SentimentRecord]) -> Patterns {
    Patterns {
        best_days: best_days(records),
        best_times: best_times(records),
        triggers: identify_triggers(entries, records),
    }
}
