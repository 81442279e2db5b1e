//! Volatility and recovery analysis over a sentiment series.

use super::base::clamp_score;
use super::constants::*;
use super::types::{Recovery, RecoveryDescription, SentimentBalance, Volatility, VolatilityLevel};
use crate::date_util::days_between;
use crate::journal::{SentimentLabel, SentimentRecord};

fn chronological(records: &[SentimentRecord]) -> Vec<&SentimentRecord> {
    let mut sorted: Vec<&SentimentRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.created_at);
    sorted
}

/// Count records by sentiment sign.
pub fn sentiment_balance(records: &[SentimentRecord]) -> SentimentBalance {
    let mut balance = SentimentBalance::default();
    for r in records {
        match SentimentLabel::of(r.score) {
            SentimentLabel::Positive => balance.positive += 1,
            SentimentLabel::Neutral => balance.neutral += 1,
            SentimentLabel::Negative => balance.negative += 1,
        }
    }
    balance
}

pub fn volatility_level(score: f64) -> VolatilityLevel {
    if score > VOLATILITY_HIGH_THRESHOLD {
        VolatilityLevel::High
    } else if score > VOLATILITY_MEDIUM_THRESHOLD {
        VolatilityLevel::Medium
    } else {
        VolatilityLevel::Low
    }
}

/// Mean absolute step-to-step change, scaled to `[0, 10]`.
pub fn calculate_emotional_volatility(records: &[SentimentRecord]) -> Volatility {
    if records.len() < 2 {
        return Volatility::default();
    }

    let sorted = chronological(records);
    let total: f64 = sorted
        .windows(2)
        .map(|pair| (pair[1].score - pair[0].score).abs())
        .sum();
    let avg_variation = total / (sorted.len() - 1) as f64;
    let score = clamp_score(avg_variation * VOLATILITY_SCALE);

    Volatility {
        score,
        level: volatility_level(score),
    }
}

pub fn recovery_description(average_days: f64) -> RecoveryDescription {
    if average_days > RECOVERY_MODERATE_MAX_DAYS {
        RecoveryDescription::Slow
    } else if average_days > RECOVERY_FAST_MAX_DAYS {
        RecoveryDescription::Moderate
    } else {
        RecoveryDescription::Fast
    }
}

/// Average days from each negative record to the next positive one, all
/// taken from the same series.
pub fn calculate_emotional_recovery(records: &[SentimentRecord]) -> Recovery {
    recovery_from(records, records)
}

/// Recovery for the negative records in `window`, searching `series` for
/// the next positive record after each one.
///
/// `series` is normally the user's whole history so that a dip at the end of
/// a window can still find its recovery.
pub fn recovery_from(window: &[SentimentRecord], series: &[SentimentRecord]) -> Recovery {
    if series.len() < 2 {
        return Recovery {
            average_time_days: 0.0,
            description: RecoveryDescription::InsufficientData,
        };
    }

    let sorted = chronological(series);
    let recovery_times: Vec<f64> = window
        .iter()
        .filter(|r| r.score < 0.0)
        .filter_map(|neg| {
            sorted
                .iter()
                .find(|r| r.score > 0.0 && r.created_at > neg.created_at)
                .map(|pos| days_between(&neg.created_at, &pos.created_at))
        })
        .collect();

    if recovery_times.is_empty() {
        return Recovery {
            average_time_days: 0.0,
            description: RecoveryDescription::NoRecoveryPattern,
        };
    }

    let avg = recovery_times.iter().sum::<f64>() / recovery_times.len() as f64;
    let avg = if avg.is_finite() { avg.max(0.0) } else { 0.0 };
    Recovery {
        average_time_days: avg,
        description: recovery_description(avg),
    }
}
