use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::Period;

/// The four base metrics plus the composite wellness score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreMetrics {
    pub wellness_score: f64,
    pub emotional_balance: f64,
    pub writing_consistency: f64,
    /// Positive:negative ratio. Unbounded above.
    pub positivity_ratio: f64,
    pub self_reflection_depth: f64,
}

/// Entry counts by sentiment sign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBalance {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volatility {
    /// Scaled mean step change, `[0, 10]`.
    pub score: f64,
    pub level: VolatilityLevel,
}

impl Default for Volatility {
    fn default() -> Self {
        Self {
            score: 0.0,
            level: VolatilityLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryDescription {
    Fast,
    Moderate,
    Slow,
    InsufficientData,
    NoRecoveryPattern,
}

impl RecoveryDescription {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryDescription::Fast => "fast",
            RecoveryDescription::Moderate => "moderate",
            RecoveryDescription::Slow => "slow",
            RecoveryDescription::InsufficientData => "insufficient data",
            RecoveryDescription::NoRecoveryPattern => "no recovery pattern found",
        }
    }
}

/// Average time from a negative entry to the next positive one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    pub average_time_days: f64,
    pub description: RecoveryDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalHealth {
    pub balance: SentimentBalance,
    pub volatility: Volatility,
    pub recovery: Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Better,
    Same,
    Worse,
}

/// Change against the previous equal-length period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub direction: TrendDirection,
    pub change_percentage: f64,
    pub compared_to_previous: Comparison,
}

impl Default for Trends {
    fn default() -> Self {
        Self {
            direction: TrendDirection::Stable,
            change_percentage: 0.0,
            compared_to_previous: Comparison::Same,
        }
    }
}

/// Words associated with unusually positive or negative entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triggers {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patterns {
    pub best_days: Vec<String>,
    pub best_times: Vec<String>,
    pub triggers: Triggers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current_writing: u32,
    pub current_positive: u32,
    pub record_writing: u32,
    pub record_positive: u32,
}

/// Best-ever streak values, persisted per user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecords {
    pub record_writing: u32,
    pub record_positive: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Achieved,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub target: u32,
    pub achieved: u32,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    pub weekly: Goal,
    pub monthly: Goal,
}

/// One computed, persisted set of metrics for a user/period/date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub user_id: String,
    pub period: Period,
    pub date: NaiveDate,
    pub metrics: CoreMetrics,
    pub emotional_health: EmotionalHealth,
    pub trends: Trends,
    pub patterns: Patterns,
    pub streaks: Streaks,
    pub goals: Goals,
}

/// Short-horizon projection of the wellness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Forecast {
    InsufficientData {
        message: String,
        confidence: u32,
    },
    Projected {
        next_days: u32,
        current_score: f64,
        predicted_score: f64,
        trend: TrendDirection,
        confidence: u32,
        recommendation: String,
    },
}

impl Forecast {
    pub fn confidence(&self) -> u32 {
        match self {
            Forecast::InsufficientData { confidence, .. } => *confidence,
            Forecast::Projected { confidence, .. } => *confidence,
        }
    }
}
