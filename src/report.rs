//! Reports assembled from metrics snapshots: the dashboard, period
//! comparisons, historical series and ad-hoc pattern analysis.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::date_util::round1;
use crate::error::{Error, Result};
use crate::metrics::constants::{
    RECOVERY_MODERATE_MAX_DAYS, STATUS_EXCELLENT_MIN, STATUS_FAIR_MIN, STATUS_GOOD_MIN,
};
use crate::metrics::trends::change_percentage;
use crate::metrics::{
    self, calculate_emotional_recovery, calculate_emotional_volatility, identify_patterns,
    EmotionalHealth, Goals, MetricsSnapshot, Patterns, Recovery, Trends, Volatility,
    VolatilityLevel,
};
use crate::period::Period;
use crate::storage::{repository, Database};

// ── Dashboard ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl DayStatus {
    pub fn of(wellness_score: f64) -> Self {
        if wellness_score >= STATUS_EXCELLENT_MIN {
            DayStatus::Excellent
        } else if wellness_score >= STATUS_GOOD_MIN {
            DayStatus::Good
        } else if wellness_score >= STATUS_FAIR_MIN {
            DayStatus::Fair
        } else {
            DayStatus::NeedsAttention
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Excellent => "excellent",
            DayStatus::Good => "good",
            DayStatus::Fair => "fair",
            DayStatus::NeedsAttention => "needs attention",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickStats {
    pub streak_days: u32,
    pub entries_today: u32,
    /// Formatted as `"x.y:1"`.
    pub positivity_ratio: String,
    pub emotional_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub user_id: String,
    pub date: NaiveDate,
    pub wellness_score: f64,
    pub status: DayStatus,
    pub quick_stats: QuickStats,
    pub trends: Trends,
    pub goals: Goals,
    pub emotional_health: EmotionalHealth,
}

pub fn format_ratio(ratio: f64) -> String {
    format!("{ratio:.1}:1")
}

/// Build the dashboard view of a daily snapshot.
pub fn dashboard_from(snapshot: &MetricsSnapshot, entries_today: u32) -> Dashboard {
    let m = &snapshot.metrics;
    Dashboard {
        user_id: snapshot.user_id.clone(),
        date: snapshot.date,
        wellness_score: m.wellness_score,
        status: DayStatus::of(m.wellness_score),
        quick_stats: QuickStats {
            streak_days: snapshot.streaks.current_writing,
            entries_today,
            positivity_ratio: format_ratio(m.positivity_ratio),
            emotional_balance: m.emotional_balance,
        },
        trends: snapshot.trends.clone(),
        goals: snapshot.goals.clone(),
        emotional_health: snapshot.emotional_health.clone(),
    }
}

/// Generate today's daily snapshot and summarise it.
pub async fn dashboard(db: &Database, user_id: &str, reference: NaiveDateTime) -> Result<Dashboard> {
    let snapshot = metrics::generate_user_metrics(db, user_id, Period::Daily, reference).await?;

    let window = Period::Daily.window(reference);
    let user = user_id.to_string();
    let entries_today = db
        .reader()
        .call(move |conn| repository::count_entries(conn, &user, &window.start, &window.end))
        .await?;

    Ok(dashboard_from(&snapshot, entries_today))
}

// ── Comparison ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub current: f64,
    pub previous: f64,
    pub change: f64,
}

impl MetricChange {
    fn between(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            change: round1(current - previous),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessChange {
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    pub change_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current_period: Period,
    pub current_date: NaiveDate,
    pub previous_period: Period,
    pub previous_date: NaiveDate,
    pub wellness_score: WellnessChange,
    pub emotional_balance: MetricChange,
    pub writing_consistency: MetricChange,
    pub positivity_ratio: MetricChange,
}

pub fn compare_snapshots(current: &MetricsSnapshot, previous: &MetricsSnapshot) -> PeriodComparison {
    let (c, p) = (&current.metrics, &previous.metrics);
    PeriodComparison {
        current_period: current.period,
        current_date: current.date,
        previous_period: previous.period,
        previous_date: previous.date,
        wellness_score: WellnessChange {
            current: c.wellness_score,
            previous: p.wellness_score,
            change: round1(c.wellness_score - p.wellness_score),
            change_percentage: change_percentage(c.wellness_score, p.wellness_score),
        },
        emotional_balance: MetricChange::between(c.emotional_balance, p.emotional_balance),
        writing_consistency: MetricChange::between(c.writing_consistency, p.writing_consistency),
        positivity_ratio: MetricChange::between(c.positivity_ratio, p.positivity_ratio),
    }
}

/// Generate snapshots for two (period, reference) pairs and compare them.
pub async fn compare_periods(
    db: &Database,
    user_id: &str,
    current: (Period, NaiveDateTime),
    previous: (Period, NaiveDateTime),
) -> Result<PeriodComparison> {
    let current = metrics::generate_user_metrics(db, user_id, current.0, current.1).await?;
    let previous = metrics::generate_user_metrics(db, user_id, previous.0, previous.1).await?;
    Ok(compare_snapshots(&current, &previous))
}

// ── Historical trends ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub wellness_score: f64,
    pub emotional_balance: f64,
    pub writing_consistency: f64,
    pub positivity_ratio: f64,
}

impl From<&MetricsSnapshot> for TrendPoint {
    fn from(s: &MetricsSnapshot) -> Self {
        Self {
            date: s.date,
            wellness_score: s.metrics.wellness_score,
            emotional_balance: s.metrics.emotional_balance,
            writing_consistency: s.metrics.writing_consistency,
            positivity_ratio: s.metrics.positivity_ratio,
        }
    }
}

/// The last `limit` snapshots of a period kind, oldest first.
///
/// With nothing stored yet, snapshots are generated for `limit` reference
/// points one window length apart, ending at `reference`.
pub async fn historical_trends(
    db: &Database,
    user_id: &str,
    period: Period,
    limit: u32,
    reference: NaiveDateTime,
) -> Result<Vec<TrendPoint>> {
    if limit == 0 {
        return Err(Error::InvalidInput("limit must be at least 1".into()));
    }

    let user = user_id.to_string();
    let stored = db
        .reader()
        .call(move |conn| repository::list_recent(conn, &user, period, limit))
        .await?;

    if !stored.is_empty() {
        return Ok(stored.iter().rev().map(TrendPoint::from).collect());
    }

    // Fail before generating anything if the oldest point is out of range.
    days_before(reference, i64::from(limit - 1) * i64::from(period.window_days()))?;

    log::info!("no stored {period} snapshots for {user_id}, generating {limit}");
    let mut points = Vec::new();
    for i in (0..i64::from(limit)).rev() {
        let at = days_before(reference, i * i64::from(period.window_days()))?;
        let snapshot = metrics::generate_user_metrics(db, user_id, period, at).await?;
        points.push(TrendPoint::from(&snapshot));
    }
    Ok(points)
}

/// `at` moved back by `days`, or `InvalidInput` outside the calendar range.
fn days_before(at: NaiveDateTime, days: i64) -> Result<NaiveDateTime> {
    Duration::try_days(days)
        .and_then(|d| at.checked_sub_signed(d))
        .ok_or_else(|| Error::InvalidInput(format!("{days} days before {at} is out of range")))
}

// ── Pattern analysis ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Warning,
    Suggestion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub days: u32,
    pub patterns: Patterns,
    pub volatility: Volatility,
    pub recovery: Recovery,
    pub insights: Vec<Insight>,
}

pub fn insights_for(patterns: &Patterns, volatility: &Volatility, recovery: &Recovery) -> Vec<Insight> {
    let mut insights = Vec::new();

    if !patterns.best_days.is_empty() {
        insights.push(Insight {
            kind: InsightKind::Positive,
            message: format!(
                "Your best days for writing are {}",
                patterns.best_days.join(" and ")
            ),
        });
    }
    if !patterns.best_times.is_empty() {
        insights.push(Insight {
            kind: InsightKind::Positive,
            message: format!("You write best in the {}", patterns.best_times.join(" and ")),
        });
    }
    if volatility.level == VolatilityLevel::High {
        insights.push(Insight {
            kind: InsightKind::Warning,
            message: "Your mood has swung a lot lately. Grounding routines may help steady it."
                .into(),
        });
    }
    if recovery.average_time_days > RECOVERY_MODERATE_MAX_DAYS {
        insights.push(Insight {
            kind: InsightKind::Suggestion,
            message: "You take a while to bounce back from low moments. That is normal and healthy."
                .into(),
        });
    }
    insights
}

/// Patterns, volatility and recovery over the `days` days ending at `as_of`.
pub async fn pattern_analysis(
    db: &Database,
    user_id: &str,
    days: u32,
    as_of: NaiveDateTime,
) -> Result<PatternAnalysis> {
    if days == 0 {
        return Err(Error::InvalidInput("days must be at least 1".into()));
    }
    let start = days_before(as_of, i64::from(days))?;
    let user = user_id.to_string();
    let (entries, records) = db
        .reader()
        .call(move |conn| repository::load_window(conn, &user, &start, &as_of))
        .await?;
    log::debug!("pattern analysis over {days} days: {} entries", entries.len());

    let patterns = identify_patterns(&entries, &records);
    let volatility = calculate_emotional_volatility(&records);
    let recovery = calculate_emotional_recovery(&records);
    let insights = insights_for(&patterns, &volatility, &recovery);

    Ok(PatternAnalysis {
        days,
        patterns,
        volatility,
        recovery,
        insights,
    })
}
