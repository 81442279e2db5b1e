//! Tunable weights and thresholds for the wellness engine.

// ── Composite weights (sum to 1.0) ─────────────────────────────────

pub const WEIGHT_EMOTIONAL_BALANCE: f64 = 0.30;
pub const WEIGHT_WRITING_CONSISTENCY: f64 = 0.25;
pub const WEIGHT_POSITIVITY_RATIO: f64 = 0.25;
pub const WEIGHT_SELF_REFLECTION: f64 = 0.20;

/// Positivity ratio is unbounded; it is multiplied by this and clamped to
/// `[0, 10]` before weighting.
pub const POSITIVITY_RATIO_SCALE: f64 = 2.0;

// ── Score ranges ───────────────────────────────────────────────────

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// Assumed sentiment domain mapped onto `[0, 10]` by emotional balance.
pub const SENTIMENT_DOMAIN_MIN: f64 = -2.0;
pub const SENTIMENT_DOMAIN_MAX: f64 = 2.0;

// ── Emotional balance ──────────────────────────────────────────────

pub const BALANCE_STABILITY_WEIGHT: f64 = 0.6;
pub const BALANCE_AVERAGE_WEIGHT: f64 = 0.4;
/// Returned when there are no scores.
pub const NEUTRAL_BALANCE: f64 = 5.0;

// ── Writing consistency ────────────────────────────────────────────

pub const IDEAL_ENTRIES_PER_DAY: f64 = 1.0;

// ── Positivity ratio ───────────────────────────────────────────────

/// Ratio reported when there are positive entries and no negative ones.
pub const POSITIVITY_NO_NEGATIVES: f64 = 10.0;

// ── Self-reflection depth ──────────────────────────────────────────

pub const REFLECTION_KEYWORD_WEIGHT: f64 = 100.0;
/// Words of text per point of depth.
pub const REFLECTION_WORDS_PER_POINT: f64 = 50.0;

pub const REFLECTION_KEYWORDS: &[&str] = &[
    "i feel",
    "i think",
    "i reflect",
    "i realize",
    "i realized",
    "i learned",
    "i discovered",
    "i understand",
    "i noticed",
    "i wonder",
    "means",
    "important",
    "experience",
    "lesson",
    "grow",
    "change",
    "improve",
    "grateful",
];

// ── Volatility ─────────────────────────────────────────────────────

pub const VOLATILITY_SCALE: f64 = 2.0;
pub const VOLATILITY_HIGH_THRESHOLD: f64 = 6.0;
pub const VOLATILITY_MEDIUM_THRESHOLD: f64 = 3.0;

// ── Recovery (days) ────────────────────────────────────────────────

pub const RECOVERY_FAST_MAX_DAYS: f64 = 1.0;
pub const RECOVERY_MODERATE_MAX_DAYS: f64 = 3.0;

// ── Patterns ───────────────────────────────────────────────────────

pub const TOP_PATTERN_GROUPS: usize = 2;
pub const MORNING_END_HOUR: u32 = 12;
pub const EVENING_START_HOUR: u32 = 18;
pub const TOP_TRIGGERS: usize = 3;
/// A word must appear in this many scored entries to count as a trigger.
pub const TRIGGER_MIN_ENTRIES: usize = 2;
pub const TRIGGER_MIN_WORD_LEN: usize = 4;

// ── Trends ─────────────────────────────────────────────────────────

pub const TREND_CHANGE_THRESHOLD: f64 = 0.5;

// ── Forecast ───────────────────────────────────────────────────────

pub const FORECAST_HISTORY_LIMIT: u32 = 7;
pub const FORECAST_MIN_SNAPSHOTS: usize = 3;
pub const FORECAST_CONFIDENCE_PER_SNAPSHOT: u32 = 12;
pub const FORECAST_MAX_CONFIDENCE: u32 = 85;
pub const FORECAST_TREND_THRESHOLD: f64 = 0.2;
pub const DEFAULT_FORECAST_DAYS: u32 = 7;

// ── Goals ──────────────────────────────────────────────────────────

pub const WEEKLY_GOAL_TARGET: u32 = 5;
pub const MONTHLY_GOAL_TARGET: u32 = 20;
pub const WEEKLY_GOAL_CONFIG_KEY: &str = "weekly_goal_target";
pub const MONTHLY_GOAL_CONFIG_KEY: &str = "monthly_goal_target";

// ── Dashboard status buckets ───────────────────────────────────────

pub const STATUS_EXCELLENT_MIN: f64 = 8.0;
pub const STATUS_GOOD_MIN: f64 = 6.0;
pub const STATUS_FAIR_MIN: f64 = 4.0;
