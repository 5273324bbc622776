use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{instrument, trace};

use crate::{
    store::entities::HabitEntity,
    utils::{
        percentage::Percentage,
        time::{date_key, DATE_KEY_FORMAT},
    },
};

use super::window::week_dates;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitConsistency {
    pub name: Arc<str>,
    pub completed_days: usize,
    pub consistency: Percentage,
    /// Monday first, in calendar order.
    pub days: [bool; 7],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStreak {
    pub name: Arc<str>,
    /// Consecutive completed days ending today, or yesterday while today is still open.
    pub current: usize,
    pub longest: usize,
}

/// How many days of the current week each habit was completed on.
#[instrument(skip_all)]
pub fn weekly_habit_consistency<Tz: TimeZone>(
    now: &DateTime<Tz>,
    habits: &[HabitEntity],
) -> Vec<HabitConsistency> {
    let week = week_dates(now).map(date_key);

    habits
        .iter()
        .map(|habit| {
            let days = week.each_ref().map(|day| habit.completed_on(day));
            let completed_days = days.iter().filter(|v| **v).count();
            HabitConsistency {
                name: habit.name.clone(),
                completed_days,
                consistency: Percentage::ratio(completed_days, days.len()),
                days,
            }
        })
        .collect()
}

#[instrument(skip_all)]
pub fn habit_streaks<Tz: TimeZone>(now: &DateTime<Tz>, habits: &[HabitEntity]) -> Vec<HabitStreak> {
    let today = now.date_naive();
    habits
        .iter()
        .map(|habit| {
            let streak = HabitStreak {
                name: habit.name.clone(),
                current: current_streak(habit, today),
                longest: longest_streak(habit),
            };
            trace!("Streak {:?}", streak);
            streak
        })
        .collect()
}

fn current_streak(habit: &HabitEntity, today: NaiveDate) -> usize {
    let mut day = if habit.completed_on(&date_key(today)) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut streak = 0;
    // Every step matches a distinct entry, so this ends after at most `completions.len()` steps.
    while habit.completed_on(&date_key(day)) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

fn longest_streak(habit: &HabitEntity) -> usize {
    let days = habit
        .completions
        .iter()
        .filter(|v| habit.completed_on(&v.date))
        .filter_map(|v| NaiveDate::parse_from_str(&v.date, DATE_KEY_FORMAT).ok())
        .collect::<BTreeSet<_>>();

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        run = match previous {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}
