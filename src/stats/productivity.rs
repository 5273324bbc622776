use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    store::Snapshot,
    utils::time::{date_key, local_date},
};

use super::window::trailing_days;

pub const TASK_WEIGHT: u32 = 10;
pub const FOCUS_WEIGHT: u32 = 5;
pub const HABIT_WEIGHT: u32 = 3;

/// Number of days the rolling score covers. Also the divisor of the average, whether or not
/// there was any activity.
pub const SCORE_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScore {
    pub date: NaiveDate,
    pub score: u32,
    pub tasks: u32,
    pub focus_sessions: u32,
    pub habits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityScore {
    pub average_score: u32,
    /// Oldest first.
    pub days: Vec<DailyScore>,
}

/// Saturates instead of overflowing on absurd counts.
pub fn weighted_score(tasks: u32, focus_sessions: u32, habits: u32) -> u32 {
    tasks
        .saturating_mul(TASK_WEIGHT)
        .saturating_add(focus_sessions.saturating_mul(FOCUS_WEIGHT))
        .saturating_add(habits.saturating_mul(HABIT_WEIGHT))
}

/// Scores each of the last 7 days including today.
///
/// Unlike [monthly_stats](super::monthly::monthly_stats), focus sessions count here whether or not
/// they were completed.
#[instrument(skip_all)]
pub fn productivity_score<Tz: TimeZone>(now: &DateTime<Tz>, snapshot: &Snapshot) -> ProductivityScore {
    let on_day = |moment: Option<DateTime<chrono::Utc>>, day: NaiveDate| {
        moment.is_some_and(|v| local_date(v, now) == day)
    };

    let mut days = trailing_days(now, SCORE_DAYS)
        .into_iter()
        .map(|day| {
            let key = date_key(day);
            let tasks = snapshot
                .tasks
                .iter()
                .filter(|v| v.completed && on_day(v.updated_at, day))
                .count() as u32;
            let focus_sessions = snapshot
                .focus_sessions
                .iter()
                .filter(|v| v.is_focus() && on_day(v.date, day))
                .count() as u32;
            let habits = snapshot
                .habits
                .iter()
                .flat_map(|v| v.completions.iter())
                .filter(|v| v.completed && *v.date == *key)
                .count() as u32;
            DailyScore {
                date: day,
                score: weighted_score(tasks, focus_sessions, habits),
                tasks,
                focus_sessions,
                habits,
            }
        })
        .collect::<Vec<_>>();
    days.reverse();

    let total = days.iter().map(|v| v.score as f64).sum::<f64>();
    let average_score = (total / SCORE_DAYS as f64).round() as u32;
    debug!(average_score, "Computed productivity score");

    ProductivityScore {
        average_score,
        days,
    }
}
