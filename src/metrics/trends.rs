//! Period-over-period trend and short-horizon forecast.

use super::base::clamp_score;
use super::constants::*;
use super::types::{Comparison, Forecast, MetricsSnapshot, TrendDirection, Trends};
use crate::date_util::round1;

/// Percentage change from `previous` to `current`, 0 when `previous` is 0.
pub fn change_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() {
        return 0.0;
    }
    let pct = (current - previous) / previous * 100.0;
    if pct.is_finite() {
        round1(pct)
    } else {
        0.0
    }
}

/// Compare the current wellness score with the previous period's snapshot.
pub fn compare_trend(current_score: f64, previous: Option<&MetricsSnapshot>) -> Trends {
    let Some(previous) = previous else {
        return Trends::default();
    };
    let previous_score = previous.metrics.wellness_score;
    let change = current_score - previous_score;

    let (direction, compared_to_previous) = if change > TREND_CHANGE_THRESHOLD {
        (TrendDirection::Improving, Comparison::Better)
    } else if change < -TREND_CHANGE_THRESHOLD {
        (TrendDirection::Declining, Comparison::Worse)
    } else {
        (TrendDirection::Stable, Comparison::Same)
    };

    Trends {
        direction,
        change_percentage: change_percentage(current_score, previous_score),
        compared_to_previous,
    }
}

/// Linear extrapolation over recent daily wellness scores.
///
/// `scores` are most recent first. Fewer than
/// [`FORECAST_MIN_SNAPSHOTS`] yields a zero-confidence answer.
pub fn forecast(scores: &[f64], days_ahead: u32) -> Forecast {
    if scores.len() < FORECAST_MIN_SNAPSHOTS {
        return Forecast::InsufficientData {
            message: format!(
                "need at least {FORECAST_MIN_SNAPSHOTS} daily snapshots to forecast (have {})",
                scores.len()
            ),
            confidence: 0,
        };
    }

    let n = scores.len();
    let current = scores[0];
    let trend = (scores[0] - scores[n - 1]) / n as f64;
    let predicted = clamp_score(current + trend * days_ahead as f64);

    let recommendation = if trend < -FORECAST_TREND_THRESHOLD {
        "Consider activities that lift your wellbeing"
    } else if trend > FORECAST_TREND_THRESHOLD {
        "Great progress, keep it up"
    } else {
        "Keep your current routine"
    };

    let direction = if trend > 0.0 {
        TrendDirection::Improving
    } else if trend < 0.0 {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    Forecast::Projected {
        next_days: days_ahead,
        current_score: round1(current),
        predicted_score: round1(predicted),
        trend: direction,
        confidence: (n as u32 * FORECAST_CONFIDENCE_PER_SNAPSHOT).min(FORECAST_MAX_CONFIDENCE),
        recommendation: recommendation.to_string(),
    }
}
