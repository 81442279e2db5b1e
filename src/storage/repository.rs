use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::date_util::{format_timestamp, DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::journal::{Entry, NewEntry, SentimentRecord};
use crate::metrics::{CoreMetrics, MetricsSnapshot, StreakRecords};
use crate::period::Period;

// ── Column helpers ─────────────────────────────────────────────────

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn timestamp_column(row: &Row, idx: usize) -> Result<NaiveDateTime, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn date_column(row: &Row, idx: usize) -> Result<NaiveDate, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn period_column(row: &Row, idx: usize) -> Result<Period, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    Period::parse(&raw).map_err(|e| conversion_error(idx, e))
}

fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> Result<T, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, rusqlite::Error> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn date_key(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

fn now_key() -> String {
    format_timestamp(&chrono::Local::now().naive_local())
}

// ── Entries ────────────────────────────────────────────────────────

/// Insert an entry and, when present, its sentiment score. Returns the new id.
pub fn insert_entry(
    conn: &Connection,
    author_id: &str,
    entry: &NewEntry,
) -> Result<i64, rusqlite::Error> {
    let created_at = format_timestamp(&entry.created_at);
    conn.execute(
        "INSERT INTO entries (author_id, created_at, text, inserted_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![author_id, created_at, entry.text, now_key()],
    )?;
    let id = conn.last_insert_rowid();
    if let Some(score) = entry.score {
        set_sentiment(conn, id, score)?;
    }
    Ok(id)
}

/// Attach or replace the sentiment score of an entry. The record inherits the
/// entry's timestamp. Returns false if the entry does not exist.
pub fn set_sentiment(conn: &Connection, entry_id: i64, score: f64) -> Result<bool, rusqlite::Error> {
    let count = conn.execute(
        "INSERT INTO sentiments (entry_id, score, created_at, scored_at)
         SELECT id, ?2, created_at, ?3 FROM entries WHERE id = ?1
         ON CONFLICT(entry_id) DO UPDATE SET
            score = excluded.score, scored_at = excluded.scored_at",
        params![entry_id, score, now_key()],
    )?;
    Ok(count > 0)
}

fn map_entry(row: &Row) -> Result<Entry, rusqlite::Error> {
    Ok(Entry {
        id: row.get(0)?,
        author_id: row.get(1)?,
        created_at: timestamp_column(row, 2)?,
        text: row.get(3)?,
    })
}

/// Entries for a user with `start <= created_at <= end`, oldest first.
pub fn find_entries(
    conn: &Connection,
    author_id: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<Vec<Entry>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, author_id, created_at, text FROM entries
         WHERE author_id = ?1 AND created_at >= ?2 AND created_at <= ?3
         ORDER BY created_at, id",
    )?;
    let rows = stmt.query_map(
        params![author_id, format_timestamp(start), format_timestamp(end)],
        map_entry,
    )?;
    rows.collect()
}

/// Every entry for a user up to and including `end`, oldest first.
pub fn find_entries_until(
    conn: &Connection,
    author_id: &str,
    end: &NaiveDateTime,
) -> Result<Vec<Entry>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, author_id, created_at, text FROM entries
         WHERE author_id = ?1 AND created_at <= ?2
         ORDER BY created_at, id",
    )?;
    let rows = stmt.query_map(params![author_id, format_timestamp(end)], map_entry)?;
    rows.collect()
}

/// Sentiment records for the given entries, oldest first. Unscored entries
/// have no record.
pub fn sentiment_for(
    conn: &Connection,
    entry_ids: &[i64],
) -> Result<Vec<SentimentRecord>, rusqlite::Error> {
    if entry_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = entry_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT entry_id, score, created_at FROM sentiments
         WHERE entry_id IN ({placeholders})
         ORDER BY created_at, entry_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(entry_ids.iter()), map_sentiment)?;
    rows.collect()
}

fn map_sentiment(row: &Row) -> Result<SentimentRecord, rusqlite::Error> {
    Ok(SentimentRecord {
        entry_id: row.get(0)?,
        score: row.get(1)?,
        created_at: timestamp_column(row, 2)?,
    })
}

/// Every sentiment record of an author, oldest first.
pub fn sentiments_for_author(
    conn: &Connection,
    author_id: &str,
) -> Result<Vec<SentimentRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT s.entry_id, s.score, s.created_at
         FROM sentiments s
         JOIN entries e ON e.id = s.entry_id
         WHERE e.author_id = ?1
         ORDER BY s.created_at, s.entry_id",
    )?;
    let rows = stmt.query_map(params![author_id], map_sentiment)?;
    rows.collect()
}

/// Sentiment records of an author with `start <= created_at <= end`.
pub fn sentiments_between(
    conn: &Connection,
    author_id: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<Vec<SentimentRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT s.entry_id, s.score, s.created_at
         FROM sentiments s
         JOIN entries e ON e.id = s.entry_id
         WHERE e.author_id = ?1 AND s.created_at >= ?2 AND s.created_at <= ?3
         ORDER BY s.created_at, s.entry_id",
    )?;
    let rows = stmt.query_map(
        params![author_id, format_timestamp(start), format_timestamp(end)],
        map_sentiment,
    )?;
    rows.collect()
}

pub fn count_entries(
    conn: &Connection,
    author_id: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<u32, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) FROM entries
         WHERE author_id = ?1 AND created_at >= ?2 AND created_at <= ?3",
        params![author_id, format_timestamp(start), format_timestamp(end)],
        |row| row.get(0),
    )
}

/// Entries in a window together with their sentiment records.
pub fn load_window(
    conn: &Connection,
    author_id: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<(Vec<Entry>, Vec<SentimentRecord>), rusqlite::Error> {
    let entries = find_entries(conn, author_id, start, end)?;
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    let records = sentiment_for(conn, &ids)?;
    Ok((entries, records))
}

/// Every entry up to `end` together with its sentiment records.
pub fn load_window_until(
    conn: &Connection,
    author_id: &str,
    end: &NaiveDateTime,
) -> Result<(Vec<Entry>, Vec<SentimentRecord>), rusqlite::Error> {
    let entries = find_entries_until(conn, author_id, end)?;
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    let records = sentiment_for(conn, &ids)?;
    Ok((entries, records))
}

// ── Snapshots ──────────────────────────────────────────────────────

const SNAPSHOT_COLUMNS: &str = "user_id, period, date_key,
    wellness_score, emotional_balance, writing_consistency, positivity_ratio, self_reflection_depth,
    emotional_health_json, trends_json, patterns_json, streaks_json, goals_json";

fn map_snapshot(row: &Row) -> Result<MetricsSnapshot, rusqlite::Error> {
    Ok(MetricsSnapshot {
        user_id: row.get(0)?,
        period: period_column(row, 1)?,
        date: date_column(row, 2)?,
        metrics: CoreMetrics {
            wellness_score: row.get(3)?,
            emotional_balance: row.get(4)?,
            writing_consistency: row.get(5)?,
            positivity_ratio: row.get(6)?,
            self_reflection_depth: row.get(7)?,
        },
        emotional_health: json_column(row, 8)?,
        trends: json_column(row, 9)?,
        patterns: json_column(row, 10)?,
        streaks: json_column(row, 11)?,
        goals: json_column(row, 12)?,
    })
}

pub fn upsert_snapshot(conn: &Connection, snapshot: &MetricsSnapshot) -> Result<(), rusqlite::Error> {
    let m = &snapshot.metrics;
    conn.execute(
        &format!(
            "INSERT INTO wellness_snapshots ({SNAPSHOT_COLUMNS}, computed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(user_id, period, date_key) DO UPDATE SET
                wellness_score=excluded.wellness_score,
                emotional_balance=excluded.emotional_balance,
                writing_consistency=excluded.writing_consistency,
                positivity_ratio=excluded.positivity_ratio,
                self_reflection_depth=excluded.self_reflection_depth,
                emotional_health_json=excluded.emotional_health_json,
                trends_json=excluded.trends_json,
                patterns_json=excluded.patterns_json,
                streaks_json=excluded.streaks_json,
                goals_json=excluded.goals_json,
                computed_at=excluded.computed_at"
        ),
        params![
            snapshot.user_id,
            snapshot.period.as_str(),
            date_key(&snapshot.date),
            m.wellness_score,
            m.emotional_balance,
            m.writing_consistency,
            m.positivity_ratio,
            m.self_reflection_depth,
            to_json(&snapshot.emotional_health)?,
            to_json(&snapshot.trends)?,
            to_json(&snapshot.patterns)?,
            to_json(&snapshot.streaks)?,
            to_json(&snapshot.goals)?,
            now_key(),
        ],
    )?;
    Ok(())
}

pub fn get_snapshot(
    conn: &Connection,
    user_id: &str,
    period: Period,
    date: &NaiveDate,
) -> Result<Option<MetricsSnapshot>, rusqlite::Error> {
    conn.query_row(
        &format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM wellness_snapshots
             WHERE user_id = ?1 AND period = ?2 AND date_key = ?3"
        ),
        params![user_id, period.as_str(), date_key(date)],
        map_snapshot,
    )
    .optional()
}

/// Most recent snapshot dated within `[from, to]`.
pub fn find_snapshot_between(
    conn: &Connection,
    user_id: &str,
    period: Period,
    from: &NaiveDate,
    to: &NaiveDate,
) -> Result<Option<MetricsSnapshot>, rusqlite::Error> {
    conn.query_row(
        &format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM wellness_snapshots
             WHERE user_id = ?1 AND period = ?2 AND date_key >= ?3 AND date_key <= ?4
             ORDER BY date_key DESC LIMIT 1"
        ),
        params![user_id, period.as_str(), date_key(from), date_key(to)],
        map_snapshot,
    )
    .optional()
}

/// Latest `limit` snapshots, most recent first.
pub fn list_recent(
    conn: &Connection,
    user_id: &str,
    period: Period,
    limit: u32,
) -> Result<Vec<MetricsSnapshot>, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM wellness_snapshots
         WHERE user_id = ?1 AND period = ?2
         ORDER BY date_key DESC LIMIT ?3"
    ))?;
    let rows = stmt.query_map(params![user_id, period.as_str(), limit], map_snapshot)?;
    rows.collect()
}

/// Latest `limit` snapshots dated on or before `as_of`, most recent first.
pub fn list_recent_before(
    conn: &Connection,
    user_id: &str,
    period: Period,
    as_of: &NaiveDate,
    limit: u32,
) -> Result<Vec<MetricsSnapshot>, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM wellness_snapshots
         WHERE user_id = ?1 AND period = ?2 AND date_key <= ?3
         ORDER BY date_key DESC LIMIT ?4"
    ))?;
    let rows = stmt.query_map(
        params![user_id, period.as_str(), date_key(as_of), limit],
        map_snapshot,
    )?;
    rows.collect()
}

// ── Streak records ─────────────────────────────────────────────────

/// Stored best-ever streaks; zero when the user has none yet.
pub fn get_streak_records(conn: &Connection, user_id: &str) -> Result<StreakRecords, rusqlite::Error> {
    let records = conn
        .query_row(
            "SELECT record_writing, record_positive FROM streak_records WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(StreakRecords {
                    record_writing: row.get(0)?,
                    record_positive: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(records.unwrap_or_default())
}

/// Store best-ever streaks. Values never go down.
pub fn upsert_streak_records(
    conn: &Connection,
    user_id: &str,
    records: &StreakRecords,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO streak_records (user_id, record_writing, record_positive, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
            record_writing = MAX(streak_records.record_writing, excluded.record_writing),
            record_positive = MAX(streak_records.record_positive, excluded.record_positive),
            updated_at = excluded.updated_at",
        params![
            user_id,
            records.record_writing,
            records.record_positive,
            now_key()
        ],
    )?;
    Ok(())
}

/// Write a snapshot and its streak records in one transaction.
pub fn persist_snapshot(
    conn: &mut Connection,
    snapshot: &MetricsSnapshot,
) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction()?;
    upsert_snapshot(&tx, snapshot)?;
    upsert_streak_records(&tx, &snapshot.user_id, &snapshot.streaks.records())?;
    tx.commit()
}

// ── Config ─────────────────────────────────────────────────────────

pub fn get_config(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM app_config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO app_config (key, value, updated_at)
         VALUES (?1, ?2, ?3)",
        params![key, value, now_key()],
    )?;
    Ok(())
}

pub fn list_config(conn: &Connection) -> Result<Vec<(String, String)>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT key, value FROM app_config ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

// ── Status ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarehouseCounts {
    pub entries: u64,
    pub scored_entries: u64,
    pub authors: u64,
    pub snapshots: u64,
    pub last_entry_at: Option<String>,
}

pub fn warehouse_counts(conn: &Connection) -> Result<WarehouseCounts, rusqlite::Error> {
    let (entries, authors, last_entry_at): (i64, i64, Option<String>) = conn.query_row(
        "SELECT COUNT(*), COUNT(DISTINCT author_id), MAX(created_at) FROM entries",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    let scored: i64 = conn.query_row("SELECT COUNT(*) FROM sentiments", [], |row| row.get(0))?;
    let snapshots: i64 =
        conn.query_row("SELECT COUNT(*) FROM wellness_snapshots", [], |row| row.get(0))?;
    Ok(WarehouseCounts {
        entries: entries as u64,
        scored_entries: scored as u64,
        authors: authors as u64,
        snapshots: snapshots as u64,
        last_entry_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::sample_snapshot;
    use crate::storage::Database;
    use chrono::Duration;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn new_entry(ts: NaiveDateTime, text: &str, score: Option<f64>) -> NewEntry {
        NewEntry { created_at: ts, text: text.to_string(), score }
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                set_config(conn, "weekly_goal_target", "4")?;
                let val = get_config(conn, "weekly_goal_target")?;
                assert_eq!(val, Some("4".to_string()));

                let missing = get_config(conn, "nonexistent")?;
                assert_eq!(missing, None);

                set_config(conn, "user_id", "alice")?;
                let all = list_config(conn)?;
                assert_eq!(all[0].0, "user_id");
                assert_eq!(all.len(), 2);
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_entries_and_sentiments() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                let a = insert_entry(conn, "u1", &new_entry(at(2, 9), "first", Some(1.5)))?;
                let b = insert_entry(conn, "u1", &new_entry(at(1, 9), "older", None))?;
                insert_entry(conn, "u2", &new_entry(at(2, 10), "someone else", Some(-1.0)))?;
                insert_entry(conn, "u1", &new_entry(at(9, 9), "later", Some(0.0)))?;

                let window = find_entries(conn, "u1", &at(1, 0), &at(3, 0))?;
                let texts: Vec<&str> = window.iter().map(|e| e.text.as_str()).collect();
                assert_eq!(texts, vec!["older", "first"]);

                let records = sentiment_for(conn, &[a, b])?;
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].entry_id, a);
                assert_eq!(records[0].score, 1.5);
                assert_eq!(records[0].created_at, at(2, 9));

                assert!(set_sentiment(conn, b, -0.5)?);
                assert!(!set_sentiment(conn, 9999, 1.0)?);
                let records = sentiment_for(conn, &[a, b])?;
                assert_eq!(records[0].entry_id, b);
                assert_eq!(records[0].created_at, at(1, 9));

                let all = find_entries_until(conn, "u1", &at(5, 0))?;
                assert_eq!(all.len(), 2);

                let (entries, records) = load_window(conn, "u1", &at(1, 0), &at(30, 0))?;
                assert_eq!(entries.len(), 3);
                assert_eq!(records.len(), 3);

                assert!(sentiment_for(conn, &[])?.is_empty());

                let mine = sentiments_for_author(conn, "u1")?;
                assert_eq!(mine.len(), 3);
                assert!(mine.iter().all(|r| r.score != -1.0));
                let early = sentiments_between(conn, "u1", &at(1, 0), &at(2, 23))?;
                assert_eq!(early.len(), 2);
                assert_eq!(count_entries(conn, "u1", &at(1, 0), &at(2, 23))?, 2);
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_window_bounds_are_inclusive_to_the_millisecond() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                let edge = at(3, 0) - Duration::milliseconds(1);
                insert_entry(conn, "u1", &new_entry(edge, "last ms", None))?;
                insert_entry(conn, "u1", &new_entry(at(3, 0), "next day", None))?;

                let day = find_entries(conn, "u1", &at(2, 0), &edge)?;
                assert_eq!(day.len(), 1);
                assert_eq!(day[0].text, "last ms");
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let db = Database::open_memory().await.unwrap();
        let snapshot = sample_snapshot("u1", Period::Weekly, NaiveDate::from_ymd_opt(2025, 4, 7).unwrap());

        let stored = snapshot.clone();
        let loaded = db
            .writer()
            .call(move |conn| {
                upsert_snapshot(conn, &stored)?;
                get_snapshot(conn, "u1", Period::Weekly, &stored.date)
            })
            .await
            .unwrap();

        assert_eq!(loaded, Some(snapshot));
    }

    #[tokio::test]
    async fn test_snapshot_upsert_replaces() {
        let db = Database::open_memory().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();

        db.writer()
            .call(move |conn| {
                let mut snap = sample_snapshot("u1", Period::Daily, date);
                upsert_snapshot(conn, &snap)?;
                snap.metrics.wellness_score = 9.9;
                upsert_snapshot(conn, &snap)?;

                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM wellness_snapshots", [], |r| r.get(0))?;
                assert_eq!(count, 1);
                let loaded = get_snapshot(conn, "u1", Period::Daily, &date)?.unwrap();
                assert_eq!(loaded.metrics.wellness_score, 9.9);

                assert!(get_snapshot(conn, "u1", Period::Weekly, &date)?.is_none());
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_recent_and_between() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                for day in [1, 3, 5, 7] {
                    let date = NaiveDate::from_ymd_opt(2025, 4, day).unwrap();
                    let mut snap = sample_snapshot("u1", Period::Daily, date);
                    snap.metrics.wellness_score = day as f64;
                    upsert_snapshot(conn, &snap)?;
                }
                let other = sample_snapshot("u2", Period::Daily, NaiveDate::from_ymd_opt(2025, 4, 8).unwrap());
                upsert_snapshot(conn, &other)?;

                let recent = list_recent(conn, "u1", Period::Daily, 3)?;
                let scores: Vec<f64> = recent.iter().map(|s| s.metrics.wellness_score).collect();
                assert_eq!(scores, vec![7.0, 5.0, 3.0]);

                let as_of = NaiveDate::from_ymd_opt(2025, 4, 4).unwrap();
                let before = list_recent_before(conn, "u1", Period::Daily, &as_of, 7)?;
                assert_eq!(before.len(), 2);
                assert_eq!(before[0].metrics.wellness_score, 3.0);

                let from = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
                let to = NaiveDate::from_ymd_opt(2025, 4, 6).unwrap();
                let found = find_snapshot_between(conn, "u1", Period::Daily, &from, &to)?.unwrap();
                assert_eq!(found.metrics.wellness_score, 5.0);

                let none = find_snapshot_between(conn, "u1", Period::Weekly, &from, &to)?;
                assert!(none.is_none());
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_streak_records_never_decrease() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                assert_eq!(get_streak_records(conn, "u1")?, StreakRecords::default());

                upsert_streak_records(conn, "u1", &StreakRecords { record_writing: 5, record_positive: 2 })?;
                upsert_streak_records(conn, "u1", &StreakRecords { record_writing: 3, record_positive: 4 })?;

                let r = get_streak_records(conn, "u1")?;
                assert_eq!(r, StreakRecords { record_writing: 5, record_positive: 4 });
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_persist_snapshot_writes_records() {
        let db = Database::open_memory().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();

        let records = db
            .writer()
            .call(move |conn| {
                let mut snap = sample_snapshot("u1", Period::Daily, date);
                snap.streaks.record_writing = 6;
                persist_snapshot(conn, &snap)?;
                get_streak_records(conn, "u1")
            })
            .await
            .unwrap();
        assert_eq!(records.record_writing, 6);
    }

    #[tokio::test]
    async fn test_warehouse_counts() {
        let db = Database::open_memory().await.unwrap();

        let counts = db
            .writer()
            .call(|conn| {
                insert_entry(conn, "u1", &new_entry(at(1, 9), "a", Some(1.0)))?;
                insert_entry(conn, "u2", &new_entry(at(2, 9), "b", None))?;
                warehouse_counts(conn)
            })
            .await
            .unwrap();

        assert_eq!(counts.entries, 2);
        assert_eq!(counts.scored_entries, 1);
        assert_eq!(counts.authors, 2);
        assert_eq!(counts.snapshots, 0);
        assert_eq!(counts.last_entry_at.as_deref(), Some("2025-04-02T09:00:00.000"));
    }
}
