use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One journal entry, as held by the entry store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub author_id: String,
    /// Author's local wall-clock time.
    pub created_at: NaiveDateTime,
    pub text: String,
}

/// Externally computed sentiment for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub entry_id: i64,
    pub score: f64,
    pub created_at: NaiveDateTime,
}

/// Sign bucket of a sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn of(score: f64) -> Self {
        if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

/// An entry to be written, before it has an id.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub created_at: NaiveDateTime,
    pub text: String,
    /// Score from the sentiment source, if one was produced.
    #[serde(default)]
    pub score: Option<f64>,
}

/// Pair each entry with its sentiment score, dropping entries without one.
pub fn join_scores<'a>(
    entries: &'a [Entry],
    records: &[SentimentRecord],
) -> Vec<(&'a Entry, f64)> {
    let scores: std::collections::HashMap<i64, f64> =
        records.iter().map(|r| (r.entry_id, r.score)).collect();
    entries
        .iter()
        .filter_map(|e| scores.get(&e.id).map(|s| (e, *s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_label_of() {
        assert_eq!(SentimentLabel::of(0.5), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::of(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::of(-3.0), SentimentLabel::Negative);
    }

    #[test]
    fn test_join_scores_skips_unscored() {
        let entries = vec![
            Entry { id: 1, author_id: "u".into(), created_at: ts(), text: "a".into() },
            Entry { id: 2, author_id: "u".into(), created_at: ts(), text: "b".into() },
        ];
        let records = vec![SentimentRecord { entry_id: 2, score: -1.0, created_at: ts() }];
        let joined = join_scores(&entries, &records);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].0.id, 2);
        assert_eq!(joined[0].1, -1.0);
    }

    #[test]
    fn test_new_entry_deserialize_without_score() {
        let e: NewEntry =
            serde_json::from_str(r#"{"created_at":"2025-01-01T09:00:00","text":"hi"}"#).unwrap();
        assert_eq!(e.created_at, ts());
        assert!(e.score.is_none());
    }
}
