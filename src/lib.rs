pub mod date_util;
pub mod error;
pub mod journal;
pub mod metrics;
pub mod period;
pub mod report;
pub mod stats;
pub mod storage;

pub use error::{Error, Result};
pub use journal::{Entry, NewEntry, SentimentLabel, SentimentRecord};
pub use metrics::{
    calculate_emotional_recovery, calculate_emotional_volatility, forecast_wellness,
    generate_user_metrics, identify_patterns, Forecast, MetricsSnapshot,
};
pub use period::{Period, Window};
pub use report::{Dashboard, PatternAnalysis, PeriodComparison, TrendPoint};
pub use stats::{DailySentiment, LabelBreakdown};
pub use storage::repository::WarehouseCounts;
pub use storage::Database;

use chrono::{NaiveDate, NaiveDateTime};

use storage::repository;

/// Config key holding the default user id.
pub const USER_ID_CONFIG_KEY: &str = "user_id";
/// User id used when none is configured.
pub const DEFAULT_USER_ID: &str = "me";

/// Main entry point for the journal warehouse and its analytics.
#[derive(Clone)]
pub struct JournalWise {
    db: Database,
}

impl JournalWise {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The configured default user, or [`DEFAULT_USER_ID`].
    pub async fn default_user(&self) -> Result<String> {
        let configured = self
            .db
            .reader()
            .call(|conn| repository::get_config(conn, USER_ID_CONFIG_KEY))
            .await?;
        Ok(configured.unwrap_or_else(|| DEFAULT_USER_ID.to_string()))
    }

    // ── Entries ────────────────────────────────────────────────────

    pub async fn add_entry(&self, user_id: &str, entry: NewEntry) -> Result<i64> {
        if entry.score.is_some_and(|s| !s.is_finite()) {
            return Err(Error::InvalidInput("sentiment score must be a finite number".into()));
        }
        let user_id = user_id.to_string();
        let id = self
            .db
            .writer()
            .call(move |conn| repository::insert_entry(conn, &user_id, &entry))
            .await?;
        log::debug!("inserted entry {id}");
        Ok(id)
    }

    /// Insert a batch of entries in one transaction. Returns how many were
    /// written.
    pub async fn import_entries(&self, user_id: &str, entries: Vec<NewEntry>) -> Result<usize> {
        if let Some(bad) = entries
            .iter()
            .position(|e| e.score.is_some_and(|s| !s.is_finite()))
        {
            return Err(Error::InvalidInput(format!(
                "entry {bad} has a non-finite sentiment score"
            )));
        }
        let user_id = user_id.to_string();
        let count = self
            .db
            .writer()
            .call(move |conn| {
                let tx = conn.transaction()?;
                for entry in &entries {
                    repository::insert_entry(&tx, &user_id, entry)?;
                }
                tx.commit()?;
                Ok::<usize, rusqlite::Error>(entries.len())
            })
            .await?;
        log::info!("imported {count} entries");
        Ok(count)
    }

    /// Attach a sentiment score to an existing entry.
    pub async fn score_entry(&self, entry_id: i64, score: f64) -> Result<()> {
        if !score.is_finite() {
            return Err(Error::InvalidInput("sentiment score must be a finite number".into()));
        }
        let found = self
            .db
            .writer()
            .call(move |conn| repository::set_sentiment(conn, entry_id, score))
            .await?;
        if found {
            Ok(())
        } else {
            Err(Error::NotFound(format!("entry {entry_id}")))
        }
    }

    // ── Metrics ────────────────────────────────────────────────────

    pub async fn generate_metrics(
        &self,
        user_id: &str,
        period: Period,
        reference: NaiveDateTime,
    ) -> Result<MetricsSnapshot> {
        metrics::generate_user_metrics(&self.db, user_id, period, reference).await
    }

    pub async fn forecast(&self, user_id: &str, days_ahead: u32, as_of: NaiveDate) -> Result<Forecast> {
        metrics::forecast_wellness(&self.db, user_id, days_ahead, as_of).await
    }

    // ── Reports ────────────────────────────────────────────────────

    pub async fn dashboard(&self, user_id: &str, reference: NaiveDateTime) -> Result<Dashboard> {
        report::dashboard(&self.db, user_id, reference).await
    }

    pub async fn compare(
        &self,
        user_id: &str,
        current: (Period, NaiveDateTime),
        previous: (Period, NaiveDateTime),
    ) -> Result<PeriodComparison> {
        report::compare_periods(&self.db, user_id, current, previous).await
    }

    pub async fn historical_trends(
        &self,
        user_id: &str,
        period: Period,
        limit: u32,
        reference: NaiveDateTime,
    ) -> Result<Vec<TrendPoint>> {
        report::historical_trends(&self.db, user_id, period, limit, reference).await
    }

    pub async fn pattern_analysis(
        &self,
        user_id: &str,
        days: u32,
        as_of: NaiveDateTime,
    ) -> Result<PatternAnalysis> {
        report::pattern_analysis(&self.db, user_id, days, as_of).await
    }

    // ── Stats ──────────────────────────────────────────────────────

    pub async fn daily_stats(&self, user_id: &str) -> Result<Vec<DailySentiment>> {
        stats::sentiment_stats(&self.db, user_id).await
    }

    pub async fn label_stats(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<LabelBreakdown> {
        stats::label_stats(&self.db, user_id, start, end).await
    }

    // ── Config commands ────────────────────────────────────────────

    pub async fn config_get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .reader()
            .call({
                let key = key.to_string();
                move |conn| repository::get_config(conn, &key)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .writer()
            .call({
                let key = key.to_string();
                let value = value.to_string();
                move |conn| repository::set_config(conn, &key, &value)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn config_list(&self) -> Result<Vec<(String, String)>> {
        self.db
            .reader()
            .call(|conn| repository::list_config(conn))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn status(&self) -> Result<WarehouseCounts> {
        self.db
            .reader()
            .call(|conn| repository::warehouse_counts(conn))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
