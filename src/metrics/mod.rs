pub mod base;
pub mod constants;
pub mod emotional;
pub mod goals;
pub mod patterns;
pub mod streaks;
pub mod trends;
pub mod types;

pub use base::{
    calculate_emotional_balance, calculate_positivity_ratio, calculate_self_reflection_depth,
    calculate_wellness_score, calculate_writing_consistency,
};
pub use emotional::{calculate_emotional_recovery, calculate_emotional_volatility};
pub use goals::GoalTargets;
pub use patterns::{identify_patterns, rank_by_mean};
pub use types::*;

use chrono::{NaiveDate, NaiveDateTime};

use crate::date_util::round1;
use crate::error::Result;
use crate::journal::{Entry, SentimentRecord};
use crate::period::Period;
use crate::storage::{repository, Database};

/// Compute, persist and return the metrics snapshot for a user over a period.
///
/// All store reads run concurrently on the reader connection. Nothing is
/// written until every computation has succeeded; the snapshot and the
/// updated record streaks are then stored in one transaction.
pub async fn generate_user_metrics(
    db: &Database,
    user_id: &str,
    period: Period,
    reference: NaiveDateTime,
) -> Result<MetricsSnapshot> {
    let window = period.window(reference);
    let (prev_from, prev_to) = period.previous_window(reference).dates();
    log::debug!(
        "generating {period} metrics for {user_id}: window {} .. {}",
        window.start,
        window.end
    );

    let history_user = user_id.to_string();
    let previous_user = user_id.to_string();
    let records_user = user_id.to_string();

    let (history, previous, stored_records, targets) = tokio::try_join!(
        db.reader().call(move |conn| {
            // History runs to the window end so a late dip can find its recovery.
            repository::load_window_until(conn, &history_user, &window.end)
        }),
        db.reader().call(move |conn| {
            repository::find_snapshot_between(conn, &previous_user, period, &prev_from, &prev_to)
        }),
        db.reader()
            .call(move |conn| repository::get_streak_records(conn, &records_user)),
        db.reader().call(|conn| {
            Ok::<_, rusqlite::Error>((
                repository::get_config(conn, constants::WEEKLY_GOAL_CONFIG_KEY)?,
                repository::get_config(conn, constants::MONTHLY_GOAL_CONFIG_KEY)?,
            ))
        }),
    )?;

    let (all_entries, all_records) = history;
    let entries: Vec<Entry> = all_entries
        .iter()
        .filter(|e| window.contains(&e.created_at))
        .cloned()
        .collect();
    let records: Vec<SentimentRecord> = all_records
        .iter()
        .filter(|r| window.contains(&r.created_at))
        .cloned()
        .collect();
    log::debug!(
        "{} entries ({} scored) in window, {} in history",
        entries.len(),
        records.len(),
        all_entries.len()
    );

    let targets = goal_targets(targets.0, targets.1);
    let metrics = core_metrics(&entries, &records, period);

    let snapshot = MetricsSnapshot {
        user_id: user_id.to_string(),
        period,
        date: reference.date(),
        trends: trends::compare_trend(metrics.wellness_score, previous.as_ref()),
        emotional_health: EmotionalHealth {
            balance: emotional::sentiment_balance(&records),
            volatility: calculate_emotional_volatility(&records),
            recovery: emotional::recovery_from(&records, &all_records),
        },
        patterns: identify_patterns(&entries, &records),
        streaks: streaks::calculate_streaks(&all_entries, &all_records, window.end, stored_records),
        goals: goals::evaluate_goals(&all_entries, reference, targets),
        metrics,
    };

    let stored = snapshot.clone();
    db.writer()
        .call(move |conn| repository::persist_snapshot(conn, &stored))
        .await?;
    log::info!(
        "stored {} snapshot for {} on {}: wellness {}",
        snapshot.period,
        snapshot.user_id,
        snapshot.date,
        snapshot.metrics.wellness_score
    );

    Ok(snapshot)
}

/// The four base metrics and the composite, rounded for storage.
fn core_metrics(entries: &[Entry], records: &[SentimentRecord], period: Period) -> CoreMetrics {
    let scores: Vec<f64> = records.iter().map(|r| r.score).collect();

    let emotional_balance = calculate_emotional_balance(&scores);
    let writing_consistency = calculate_writing_consistency(entries.len(), period.window_days());
    let positivity_ratio = calculate_positivity_ratio(&scores);
    let self_reflection_depth = calculate_self_reflection_depth(entries);
    let wellness_score = calculate_wellness_score(
        emotional_balance,
        writing_consistency,
        positivity_ratio,
        self_reflection_depth,
    );

    CoreMetrics {
        wellness_score: round1(wellness_score),
        emotional_balance: round1(emotional_balance),
        writing_consistency: round1(writing_consistency),
        positivity_ratio: round1(positivity_ratio),
        self_reflection_depth: round1(self_reflection_depth),
    }
}

fn parse_target(key: &str, raw: Option<String>, default: u32) -> u32 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(n) => n,
        Err(_) => {
            log::warn!("ignoring config {key}={raw:?}: expected a whole number, using {default}");
            default
        }
    }
}

fn goal_targets(weekly: Option<String>, monthly: Option<String>) -> GoalTargets {
    let defaults = GoalTargets::default();
    GoalTargets {
        weekly: parse_target(constants::WEEKLY_GOAL_CONFIG_KEY, weekly, defaults.weekly),
        monthly: parse_target(constants::MONTHLY_GOAL_CONFIG_KEY, monthly, defaults.monthly),
    }
}

/// Project the wellness score `days_ahead` days past `as_of` from the most
/// recent stored daily snapshots.
pub async fn forecast_wellness(
    db: &Database,
    user_id: &str,
    days_ahead: u32,
    as_of: NaiveDate,
) -> Result<Forecast> {
    let user_id = user_id.to_string();
    let recent = db
        .reader()
        .call(move |conn| {
            repository::list_recent_before(
                conn,
                &user_id,
                Period::Daily,
                &as_of,
                constants::FORECAST_HISTORY_LIMIT,
            )
        })
        .await?;

    let scores: Vec<f64> = recent.iter().map(|s| s.metrics.wellness_score).collect();
    log::debug!("forecasting from {} daily snapshots", scores.len());
    Ok(trends::forecast(&scores, days_ahead))
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_snapshot;
    use super::*;
    use crate::journal::NewEntry;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    async fn seed(db: &Database, rows: Vec<(NaiveDateTime, &'static str, Option<f64>)>) {
        db.writer()
            .call(move |conn| {
                for (created_at, text, score) in rows {
                    let entry = NewEntry { created_at, text: text.to_string(), score };
                    repository::insert_entry(conn, "u1", &entry)?;
                }
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    async fn seed_week(db: &Database) {
        seed(
            db,
            vec![
                (at(8, 9), "Quiet morning", Some(1.0)),
                (at(9, 9), "Good run before work", Some(1.0)),
                (at(10, 9), "I feel grateful today", Some(1.0)),
                (at(10, 20), "Work was hard", Some(-1.0)),
            ],
        )
        .await;
    }

    #[tokio::test]
    async fn test_daily_snapshot() {
        let db = Database::open_memory().await.unwrap();
        seed_week(&db).await;

        let snap = generate_user_metrics(&db, "u1", Period::Daily, at(10, 21))
            .await
            .unwrap();

        assert_eq!(snap.date, NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());
        assert_eq!(snap.metrics.emotional_balance, 7.4);
        assert_eq!(snap.metrics.writing_consistency, 10.0);
        assert_eq!(snap.metrics.positivity_ratio, 1.0);
        assert_eq!(
            snap.emotional_health.balance,
            SentimentBalance { positive: 1, neutral: 0, negative: 1 }
        );
        assert_eq!(
            snap.emotional_health.recovery.description,
            RecoveryDescription::NoRecoveryPattern
        );
        assert_eq!(snap.streaks.current_writing, 3);
        assert_eq!(snap.streaks.current_positive, 0);
        assert_eq!(snap.trends, Trends::default());
        assert_eq!(snap.goals.weekly.achieved, 4);
        assert_eq!(snap.goals.weekly.status, GoalStatus::InProgress);
    }

    #[tokio::test]
    async fn test_daily_streaks_run_to_end_of_day() {
        let db = Database::open_memory().await.unwrap();
        seed_week(&db).await;

        // The 20:00 negative on the 10th falls inside the daily window.
        let snap = generate_user_metrics(&db, "u1", Period::Daily, at(10, 12))
            .await
            .unwrap();
        assert_eq!(snap.emotional_health.balance.negative, 1);
        assert_eq!(snap.streaks.current_writing, 3);
        assert_eq!(snap.streaks.current_positive, 0);
    }

    #[tokio::test]
    async fn test_snapshot_is_persisted() {
        let db = Database::open_memory().await.unwrap();
        seed_week(&db).await;

        let snap = generate_user_metrics(&db, "u1", Period::Weekly, at(10, 21))
            .await
            .unwrap();

        let date = snap.date;
        let stored = db
            .reader()
            .call(move |conn| repository::get_snapshot(conn, "u1", Period::Weekly, &date))
            .await
            .unwrap();
        assert_eq!(stored, Some(snap));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let db = Database::open_memory().await.unwrap();

        let snap = generate_user_metrics(&db, "nobody", Period::Monthly, at(10, 21))
            .await
            .unwrap();

        assert_eq!(snap.metrics.emotional_balance, 5.0);
        assert_eq!(snap.metrics.writing_consistency, 0.0);
        assert_eq!(snap.metrics.positivity_ratio, 0.0);
        assert_eq!(snap.metrics.self_reflection_depth, 0.0);
        assert_eq!(snap.metrics.wellness_score, 1.5);
        assert_eq!(
            snap.emotional_health.recovery.description,
            RecoveryDescription::InsufficientData
        );
        assert_eq!(snap.patterns, Patterns::default());
        assert_eq!(snap.streaks, Streaks::default());
    }

    #[tokio::test]
    async fn test_record_streaks_survive_a_gap() {
        let db = Database::open_memory().await.unwrap();
        seed_week(&db).await;

        generate_user_metrics(&db, "u1", Period::Daily, at(10, 21))
            .await
            .unwrap();
        let later = generate_user_metrics(&db, "u1", Period::Daily, at(20, 21))
            .await
            .unwrap();

        assert_eq!(later.streaks.current_writing, 0);
        assert_eq!(later.streaks.record_writing, 3);
    }

    #[tokio::test]
    async fn test_trend_against_previous_day() {
        let db = Database::open_memory().await.unwrap();
        seed_week(&db).await;

        let first = generate_user_metrics(&db, "u1", Period::Daily, at(9, 21))
            .await
            .unwrap();
        let second = generate_user_metrics(&db, "u1", Period::Daily, at(10, 21))
            .await
            .unwrap();

        assert_eq!(
            second.trends,
            trends::compare_trend(second.metrics.wellness_score, Some(&first))
        );
    }

    #[tokio::test]
    async fn test_goal_target_from_config() {
        let db = Database::open_memory().await.unwrap();
        seed_week(&db).await;
        db.writer()
            .call(|conn| {
                repository::set_config(conn, constants::WEEKLY_GOAL_CONFIG_KEY, "3")?;
                repository::set_config(conn, constants::MONTHLY_GOAL_CONFIG_KEY, "lots")
            })
            .await
            .unwrap();

        let snap = generate_user_metrics(&db, "u1", Period::Weekly, at(10, 21))
            .await
            .unwrap();
        assert_eq!(snap.goals.weekly.target, 3);
        assert_eq!(snap.goals.weekly.status, GoalStatus::Achieved);
        assert_eq!(snap.goals.monthly.target, constants::MONTHLY_GOAL_TARGET);
    }

    #[tokio::test]
    async fn test_forecast_wellness() {
        let db = Database::open_memory().await.unwrap();
        db.writer()
            .call(|conn| {
                for (day, score) in [(1, 5.0), (2, 6.0), (3, 7.0), (4, 8.0), (5, 9.0)] {
                    let date = NaiveDate::from_ymd_opt(2025, 5, day).unwrap();
                    let mut snap = sample_snapshot("u1", Period::Daily, date);
                    snap.metrics.wellness_score = score;
                    repository::upsert_snapshot(conn, &snap)?;
                }
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        let as_of = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let forecast = forecast_wellness(&db, "u1", 7, as_of).await.unwrap();
        match forecast {
            Forecast::Projected {
                current_score,
                predicted_score,
                trend,
                confidence,
                ..
            } => {
                assert_eq!(current_score, 9.0);
                assert_eq!(predicted_score, 10.0);
                assert_eq!(trend, TrendDirection::Improving);
                assert_eq!(confidence, 60);
            }
            other => panic!("unexpected forecast: {other:?}"),
        }

        let early = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let forecast = forecast_wellness(&db, "u1", 7, early).await.unwrap();
        assert_eq!(forecast.confidence(), 0);
    }

    #[test]
    fn test_unparsable_target_falls_back() {
        let t = goal_targets(Some(" 7 ".into()), Some("-1".into()));
        assert_eq!(t.weekly, 7);
        assert_eq!(t.monthly, constants::MONTHLY_GOAL_TARGET);
    }
}
