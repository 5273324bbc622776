//! Derivations over a [Snapshot]. Each one is a pure function of the snapshot and "now";
//! [StatsService] is the single place that reads the store and the clock.

pub mod habits;
pub mod monthly;
pub mod productivity;
pub mod window;

use chrono::{DateTime, TimeZone, Utc};
use habits::{habit_streaks, weekly_habit_consistency, HabitConsistency, HabitStreak};
use monthly::{monthly_stats, MonthlyStats};
use productivity::{productivity_score, ProductivityScore};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    store::{record_store::load_snapshot, record_store::RecordStore, Snapshot},
    utils::clock::Clock,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub generated_at: DateTime<Utc>,
    pub monthly: MonthlyStats,
    pub habits: Vec<HabitConsistency>,
    pub streaks: Vec<HabitStreak>,
    pub productivity: ProductivityScore,
}

impl StatsReport {
    pub fn compute<Tz: TimeZone>(now: &DateTime<Tz>, snapshot: &Snapshot) -> Self {
        StatsReport {
            generated_at: now.with_timezone(&Utc),
            monthly: monthly_stats(now, snapshot),
            habits: weekly_habit_consistency(now, &snapshot.habits),
            streaks: habit_streaks(now, &snapshot.habits),
            productivity: productivity_score(now, snapshot),
        }
    }
}

/// Owns the store and the clock. Holds nothing between calls, so whoever owns the refresh cadence
/// just calls [StatsService::refresh] again.
pub struct StatsService<S, C> {
    store: S,
    clock: C,
}

impl<S: RecordStore, C: Clock> StatsService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub async fn snapshot(&self) -> Snapshot {
        load_snapshot(&self.store).await
    }

    /// Reads a fresh snapshot and evaluates everything at the clock's current local time. Store
    /// failures already degrade to empty collections in [load_snapshot], so this can't fail.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> StatsReport {
        let now = self.clock.local_time();
        self.report_at(&now).await
    }

    pub async fn report_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> StatsReport {
        let snapshot = self.snapshot().await;
        let report = StatsReport::compute(now, &snapshot);
        info!(
            generated_at = %report.generated_at,
            habits = report.habits.len(),
            average_score = report.productivity.average_score,
            "Refreshed stats"
        );
        report
    }
}
