use chrono::{DateTime, NaiveDate, TimeZone};
use now::DateTimeNow;
use serde::Serialize;
use tracing::instrument;

use crate::{
    store::{
        entities::{ExpenseKind, FocusSessionEntity},
        Snapshot,
    },
    utils::percentage::{round_to, Percentage},
};

use super::window::{filter_within, TimeWindow};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub completion_rate: Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusStats {
    pub session_count: usize,
    pub minutes: f64,
    /// `minutes / 60` rounded to one decimal.
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// First day of the month, in the zone the stats were evaluated in.
    pub month: NaiveDate,
    pub window: TimeWindow,
    pub tasks: TaskStats,
    pub focus: FocusStats,
    pub books_completed: usize,
    pub total_expenses: f64,
    pub total_income: f64,
}

/// Statistics for the calendar month containing `now`. Habits don't take part.
#[instrument(skip_all)]
pub fn monthly_stats<Tz: TimeZone>(now: &DateTime<Tz>, snapshot: &Snapshot) -> MonthlyStats {
    let window = TimeWindow::month_of(now);

    let (total, completed) = filter_within(&snapshot.tasks, &window, |v| v.created_at).fold(
        (0, 0),
        |(total, completed), task| (total + 1, completed + task.completed as usize),
    );

    // Only finished focus blocks count as productive time.
    let sessions = filter_within(&snapshot.focus_sessions, &window, |v| v.date)
        .filter(|v| v.is_focus() && v.completed)
        .collect::<Vec<&FocusSessionEntity>>();
    let minutes = sessions.iter().map(|v| v.duration).sum::<f64>();

    let books_completed = filter_within(&snapshot.books, &window, |v| v.completed_date).count();

    let sum_of = |kind: ExpenseKind| {
        filter_within(&snapshot.expenses, &window, |v| v.date)
            .filter(|v| v.kind == kind)
            .map(|v| v.amount)
            .sum::<f64>()
    };
    let total_expenses = sum_of(ExpenseKind::Expense);
    let total_income = sum_of(ExpenseKind::Income);

    MonthlyStats {
        month: now.beginning_of_month().date_naive(),
        window,
        tasks: TaskStats {
            total,
            completed,
            completion_rate: Percentage::ratio(completed, total),
        },
        focus: FocusStats {
            session_count: sessions.len(),
            minutes,
            hours: round_to(minutes / 60., 1),
        },
        books_completed,
        total_expenses,
        total_income,
    }
}
