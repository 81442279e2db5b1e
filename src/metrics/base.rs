//! Base metric calculators and the composite wellness scorer.

use std::sync::LazyLock;

use regex::Regex;

use super::constants::*;
use crate::journal::Entry;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}']+").unwrap());

/// Clamp into `[min, max]`, sending NaN to `min`.
pub fn clamp_finite(v: f64, min: f64, max: f64) -> f64 {
    if v.is_nan() {
        min
    } else {
        v.clamp(min, max)
    }
}

/// Clamp into the `[0, 10]` score range.
pub fn clamp_score(v: f64) -> f64 {
    clamp_finite(v, SCORE_MIN, SCORE_MAX)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Lower-cased words of a text.
pub(crate) fn words(text: &str) -> Vec<String> {
    RE_WORD
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Stability of the score series blended with its average level.
pub fn calculate_emotional_balance(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return NEUTRAL_BALANCE;
    }

    let avg = mean(scores);
    let variance = scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / scores.len() as f64;
    let stability = (SCORE_MAX - variance).max(0.0);

    let domain = SENTIMENT_DOMAIN_MAX - SENTIMENT_DOMAIN_MIN;
    let normalized_avg = (avg - SENTIMENT_DOMAIN_MIN) / domain * SCORE_MAX;

    clamp_score(stability * BALANCE_STABILITY_WEIGHT + normalized_avg * BALANCE_AVERAGE_WEIGHT)
}

/// Entries-per-day density against the ideal cadence.
pub fn calculate_writing_consistency(entry_count: usize, window_days: u32) -> f64 {
    if entry_count == 0 || window_days == 0 {
        return 0.0;
    }
    let per_day = entry_count as f64 / window_days as f64;
    clamp_score(per_day / IDEAL_ENTRIES_PER_DAY * SCORE_MAX)
}

/// Count of positive scores over count of negative scores.
///
/// `10` when there are positives and no negatives, `0` when there are no
/// scores or no positives.
pub fn calculate_positivity_ratio(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let positive = scores.iter().filter(|s| **s > 0.0).count();
    let negative = scores.iter().filter(|s| **s < 0.0).count();

    if negative == 0 {
        return if positive > 0 { POSITIVITY_NO_NEGATIVES } else { 0.0 };
    }
    positive as f64 / negative as f64
}

/// Depth score of a single text.
///
/// Distinct reflective keywords per word, plus a small bonus for length.
pub fn reflection_score(text: &str) -> f64 {
    let tokens = words(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = REFLECTION_KEYWORDS
        .iter()
        .filter(|kw| contains_phrase(&tokens, kw))
        .count();

    let word_count = tokens.len() as f64;
    clamp_score(
        hits as f64 / word_count * REFLECTION_KEYWORD_WEIGHT
            + word_count / REFLECTION_WORDS_PER_POINT,
    )
}

/// Whether the words of `phrase` appear as consecutive whole tokens.
fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let parts: Vec<&str> = phrase.split_whitespace().collect();
    !parts.is_empty()
        && tokens
            .windows(parts.len())
            .any(|w| w.iter().zip(&parts).all(|(t, p)| t == p))
}

/// Average reflection depth across entries.
pub fn calculate_self_reflection_depth(entries: &[Entry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let total: f64 = entries.iter().map(|e| reflection_score(&e.text)).sum();
    clamp_score(total / entries.len() as f64)
}

/// Weighted combination of the four base metrics.
pub fn calculate_wellness_score(
    emotional_balance: f64,
    writing_consistency: f64,
    positivity_ratio: f64,
    self_reflection_depth: f64,
) -> f64 {
    let normalized_positivity = clamp_score(positivity_ratio * POSITIVITY_RATIO_SCALE);

    clamp_score(
        clamp_score(emotional_balance) * WEIGHT_EMOTIONAL_BALANCE
            + clamp_score(writing_consistency) * WEIGHT_WRITING_CONSISTENCY
            + normalized_positivity * WEIGHT_POSITIVITY_RATIO
            + clamp_score(self_reflection_depth) * WEIGHT_SELF_REFLECTION,
    )
}
