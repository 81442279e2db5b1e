use chrono::{Duration, NaiveDateTime};

use super::types::{Goal, GoalStatus, Goals};
use crate::journal::Entry;

/// Goal targets, read from config with built-in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalTargets {
    pub weekly: u32,
    pub monthly: u32,
}

impl Default for GoalTargets {
    fn default() -> Self {
        Self {
            weekly: super::constants::WEEKLY_GOAL_TARGET,
            monthly: super::constants::MONTHLY_GOAL_TARGET,
        }
    }
}

pub fn evaluate_goal(target: u32, achieved: u32) -> Goal {
    let status = if achieved >= target {
        GoalStatus::Achieved
    } else {
        GoalStatus::InProgress
    };
    Goal {
        target,
        achieved,
        status,
    }
}

fn entries_in_last_days(entries: &[Entry], reference: NaiveDateTime, days: i64) -> u32 {
    let start = reference - Duration::days(days);
    entries
        .iter()
        .filter(|e| e.created_at >= start && e.created_at <= reference)
        .count() as u32
}

/// Entry-count goals over the 7 and 30 days ending at `reference`.
pub fn evaluate_goals(entries: &[Entry], reference: NaiveDateTime, targets: GoalTargets) -> Goals {
    Goals {
        weekly: evaluate_goal(targets.weekly, entries_in_last_days(entries, reference, 7)),
        monthly: evaluate_goal(targets.monthly, entries_in_last_days(entries, reference, 30)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 30)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap()
    }

    fn entries_days_ago(days: &[i64]) -> Vec<Entry> {
        days.iter()
            .enumerate()
            .map(|(i, d)| Entry {
                id: i as i64,
                author_id: "u1".into(),
                created_at: reference() - Duration::days(*d),
                text: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_goal_status() {
        assert_eq!(evaluate_goal(5, 5).status, GoalStatus::Achieved);
        assert_eq!(evaluate_goal(5, 9).status, GoalStatus::Achieved);
        assert_eq!(evaluate_goal(5, 4).status, GoalStatus::InProgress);
    }

    #[test]
    fn test_goals_count_their_own_windows() {
        let entries = entries_days_ago(&[0, 1, 2, 3, 4, 10, 20, 45]);
        let goals = evaluate_goals(&entries, reference(), GoalTargets::default());
        assert_eq!(goals.weekly.achieved, 5);
        assert_eq!(goals.weekly.status, GoalStatus::Achieved);
        assert_eq!(goals.monthly.achieved, 7);
        assert_eq!(goals.monthly.target, 20);
        assert_eq!(goals.monthly.status, GoalStatus::InProgress);
    }

    #[test]
    fn test_goals_ignore_future_entries() {
        let mut entries = entries_days_ago(&[0]);
        entries[0].created_at += Duration::hours(5);
        let goals = evaluate_goals(&entries, reference(), GoalTargets { weekly: 1, monthly: 1 });
        assert_eq!(goals.weekly.achieved, 0);
    }
}
