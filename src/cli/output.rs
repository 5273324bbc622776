use std::fmt::Write;

use ansi_term::{Colour, Style};
use chrono::Datelike;

use crate::stats::{
    habits::{HabitConsistency, HabitStreak},
    monthly::MonthlyStats,
    productivity::ProductivityScore,
    StatsReport,
};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

pub fn render_monthly(stats: &MonthlyStats) -> String {
    let mut out = String::new();
    let heading = stats.month.format("%B %Y");
    let _ = writeln!(out, "{}", Style::new().bold().paint(format!("Month of {heading}")));
    let _ = writeln!(
        out,
        "  Tasks\t{}/{} completed ({})",
        stats.tasks.completed, stats.tasks.total, stats.tasks.completion_rate
    );
    let _ = writeln!(
        out,
        "  Focus\t{} sessions, {} ({}h)",
        stats.focus.session_count,
        format_minutes(stats.focus.minutes),
        stats.focus.hours
    );
    let _ = writeln!(out, "  Books\t{} finished", stats.books_completed);
    let _ = writeln!(
        out,
        "  Money\t{:.2} spent, {:.2} earned",
        stats.total_expenses, stats.total_income
    );
    out
}

pub fn render_habits(habits: &[HabitConsistency], streaks: &[HabitStreak]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", Style::new().bold().paint("This week"));
    if habits.is_empty() {
        let _ = writeln!(out, "  No habits tracked");
        return out;
    }
    let _ = writeln!(out, "  {}\thabit", WEEKDAYS.join(" "));
    // Both come out of the same habit list in the same order.
    for (habit, streak) in habits.iter().zip(streaks) {
        let grid = habit
            .days
            .iter()
            .map(|done| {
                if *done {
                    Colour::Green.paint("██").to_string()
                } else {
                    Colour::Fixed(240).paint("··").to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        let streak = format!(", streak {} (best {})", streak.current, streak.longest);
        let _ = writeln!(
            out,
            "  {grid}\t{} {}/7 ({}){streak}",
            habit.name, habit.completed_days, habit.consistency
        );
    }
    out
}

pub fn render_productivity(score: &ProductivityScore) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        Style::new()
            .bold()
            .paint(format!("Productivity, 7 day average {}", score.average_score))
    );
    let max = score.days.iter().map(|v| v.score).max().unwrap_or(0).max(1);
    for day in &score.days {
        let width = (day.score * 20).div_ceil(max) as usize;
        let _ = writeln!(
            out,
            "  {} {}\t{:>3} {}\t{} tasks, {} focus, {} habits",
            WEEKDAYS[day.date.weekday().num_days_from_monday() as usize],
            day.date.format("%d.%m"),
            day.score,
            Colour::Cyan.paint("▇".repeat(width)),
            day.tasks,
            day.focus_sessions,
            day.habits
        );
    }
    out
}

pub fn render_report(report: &StatsReport) -> String {
    [
        render_monthly(&report.monthly),
        render_habits(&report.habits, &report.streaks),
        render_productivity(&report.productivity),
    ]
    .join("\n")
}

fn format_minutes(minutes: f64) -> String {
    let minutes = minutes.round() as u64;
    if minutes >= 60 {
        format!("{}h{}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}
