//!  Storage is organized through [record_store::RecordStore].
//!  The basic idea is:
//!   - There is a directory with all the collections the tracker writes.
//!   - Every collection is a single JSON array, read wholesale.
//!   - Records are decoded one by one, so a broken record only costs itself.

pub mod entities;
pub mod record_store;

use entities::{BookEntity, ExpenseEntity, FocusSessionEntity, HabitEntity, TaskEntity};
use serde::{Deserialize, Serialize};

/// Contents of every collection at one point in time. Derivations only ever look at one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tasks: Vec<TaskEntity>,
    pub habits: Vec<HabitEntity>,
    pub focus_sessions: Vec<FocusSessionEntity>,
    pub expenses: Vec<ExpenseEntity>,
    pub books: Vec<BookEntity>,
}
