//! Per-day sentiment aggregates and label breakdowns.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_util::{end_of_day, start_of_day};
use crate::error::{Error, Result};
use crate::journal::{SentimentLabel, SentimentRecord};
use crate::metrics::base::mean;
use crate::storage::{repository, Database};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub average_score: f64,
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: SentimentLabel,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelBreakdown {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Non-zero labels, most frequent first.
    pub labels: Vec<LabelCount>,
    pub most_frequent: Option<LabelCount>,
}

/// Group records by calendar day, in date order.
pub fn daily_sentiment(records: &[SentimentRecord]) -> Vec<DailySentiment> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for r in records {
        by_day.entry(r.created_at.date()).or_default().push(r.score);
    }

    by_day
        .into_iter()
        .map(|(date, scores)| {
            let mut day = DailySentiment {
                date,
                average_score: mean(&scores),
                positive: 0,
                neutral: 0,
                negative: 0,
            };
            for s in &scores {
                match SentimentLabel::of(*s) {
                    SentimentLabel::Positive => day.positive += 1,
                    SentimentLabel::Neutral => day.neutral += 1,
                    SentimentLabel::Negative => day.negative += 1,
                }
            }
            day
        })
        .collect()
}

/// Count labels of records dated within `[start, end]`.
///
/// Ties keep positive, neutral, negative order.
pub fn label_breakdown(records: &[SentimentRecord], start: NaiveDate, end: NaiveDate) -> LabelBreakdown {
    let mut counts: BTreeMap<SentimentLabel, u32> = BTreeMap::new();
    for r in records {
        let day = r.created_at.date();
        if day >= start && day <= end {
            *counts.entry(SentimentLabel::of(r.score)).or_default() += 1;
        }
    }

    let mut labels: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    labels.sort_by(|a, b| b.count.cmp(&a.count));

    LabelBreakdown {
        start,
        end,
        most_frequent: labels.first().copied(),
        labels,
    }
}

/// Daily aggregates over a user's whole history.
pub async fn sentiment_stats(db: &Database, user_id: &str) -> Result<Vec<DailySentiment>> {
    let user = user_id.to_string();
    let records = db
        .reader()
        .call(move |conn| repository::sentiments_for_author(conn, &user))
        .await?;
    Ok(daily_sentiment(&records))
}

/// Label breakdown between two dates (inclusive).
pub async fn label_stats(
    db: &Database,
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<LabelBreakdown> {
    if start > end {
        return Err(Error::InvalidInput(format!(
            "start date {start} is after end date {end}"
        )));
    }
    let user = user_id.to_string();
    let (from, to) = (start_of_day(start), end_of_day(end));
    let records = db
        .reader()
        .call(move |conn| repository::sentiments_between(conn, &user, &from, &to))
        .await?;
    log::debug!("{} scored entries between {start} and {end}", records.len());
    Ok(label_breakdown(&records, start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::NewEntry;
    use chrono::NaiveDateTime;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn rec(id: i64, day: u32, hour: u32, score: f64) -> SentimentRecord {
        SentimentRecord { entry_id: id, score, created_at: at(day, hour) }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    #[test]
    fn test_daily_sentiment() {
        let records = vec![
            rec(3, 2, 9, 0.0),
            rec(1, 1, 9, 1.0),
            rec(2, 1, 20, -0.5),
        ];
        let days = daily_sentiment(&records);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date(1));
        assert_eq!(days[0].average_score, 0.25);
        assert_eq!((days[0].positive, days[0].neutral, days[0].negative), (1, 0, 1));
        assert_eq!(days[1].neutral, 1);
        assert!(daily_sentiment(&[]).is_empty());
    }

    #[test]
    fn test_label_breakdown() {
        let records = vec![
            rec(1, 1, 9, -1.0),
            rec(2, 2, 9, -2.0),
            rec(3, 2, 10, 1.0),
            rec(4, 9, 9, 1.0),
        ];
        let b = label_breakdown(&records, date(1), date(3));
        assert_eq!(
            b.most_frequent,
            Some(LabelCount { label: SentimentLabel::Negative, count: 2 })
        );
        assert_eq!(b.labels.len(), 2);
    }

    #[test]
    fn test_label_breakdown_tie_and_empty() {
        let records = vec![rec(1, 1, 9, -1.0), rec(2, 1, 10, 1.0)];
        let b = label_breakdown(&records, date(1), date(1));
        assert_eq!(b.most_frequent.map(|l| l.label), Some(SentimentLabel::Positive));

        let empty = label_breakdown(&[], date(1), date(2));
        assert!(empty.labels.is_empty());
        assert_eq!(empty.most_frequent, None);
    }

    #[tokio::test]
    async fn test_label_stats_from_store() {
        let db = Database::open_memory().await.unwrap();
        db.writer()
            .call(|conn| {
                for (ts, score) in [(at(1, 9), 1.0), (at(2, 23), 0.0), (at(3, 0), -1.0)] {
                    let entry = NewEntry { created_at: ts, text: "x".into(), score: Some(score) };
                    repository::insert_entry(conn, "u1", &entry)?;
                }
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        let b = label_stats(&db, "u1", date(1), date(2)).await.unwrap();
        let total: u32 = b.labels.iter().map(|l| l.count).sum();
        assert_eq!(total, 2);

        let days = sentiment_stats(&db, "u1").await.unwrap();
        assert_eq!(days.len(), 3);

        let err = label_stats(&db, "u1", date(3), date(1)).await;
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }
}
