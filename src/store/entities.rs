use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::sync::Arc;

/// A to-do item. `created_at` places it in a month, `updated_at` is when it was last touched,
/// which for completed tasks is effectively the completion day.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Arc<str>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Arc<str>>,
    pub name: Arc<str>,
    /// Not deduplicated. Lookups take the first entry for a date.
    #[serde(default)]
    pub completions: Vec<HabitEntryEntity>,
}

impl HabitEntity {
    /// First entry recorded for `date_key` (`YYYY-MM-DD`).
    pub fn entry_for(&self, date_key: &str) -> Option<&HabitEntryEntity> {
        self.completions.iter().find(|v| &*v.date == date_key)
    }

    /// A day counts only when its first entry exists and is marked completed.
    pub fn completed_on(&self, date_key: &str) -> bool {
        self.entry_for(date_key).is_some_and(|v| v.completed)
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct HabitEntryEntity {
    /// Calendar date as `YYYY-MM-DD`. Compared verbatim.
    pub date: Arc<str>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    Focus,
    ShortBreak,
    LongBreak,
    /// Also what a session without a `type` decodes to, so it never counts as focus time.
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FocusSessionEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Arc<str>>,
    /// Minutes, possibly fractional.
    #[serde(with = "lenient_number")]
    pub duration: f64,
    #[serde(default, with = "lenient_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub kind: SessionKind,
    #[serde(default)]
    pub completed: bool,
}

impl FocusSessionEntity {
    pub fn is_focus(&self) -> bool {
        self.kind == SessionKind::Focus
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseKind {
    Expense,
    Income,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Arc<str>>,
    #[serde(with = "lenient_number")]
    pub amount: f64,
    #[serde(default, with = "lenient_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub kind: ExpenseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Arc<str>>,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Arc<str>>,
    /// Only finished books have one.
    #[serde(default, with = "lenient_timestamp")]
    pub completed_date: Option<DateTime<Utc>>,
}

/// Dates written by hand or by older versions of the app come in many shapes. Whatever can't be
/// read becomes `None` instead of failing the whole record.
mod lenient_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use crate::utils::time::parse_timestamp;

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(v) => serializer.serialize_str(&v.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(parse_timestamp(&raw))
    }
}

/// Numbers typed into a form often end up stored as strings. A value that isn't a finite number
/// either way still fails the record.
mod lenient_number {
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let number = match &raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number
            .filter(|v| v.is_finite())
            .ok_or_else(|| D::Error::custom(format!("expected a number, found {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{
        ExpenseEntity, ExpenseKind, FocusSessionEntity, HabitEntity, SessionKind, TaskEntity,
    };

    #[test]
    fn task_with_broken_dates_still_decodes() {
        let task: TaskEntity = serde_json::from_value(json!({
            "id": "1",
            "title": "write report",
            "completed": true,
            "createdAt": "yesterday-ish",
            "updatedAt": 1741948200000i64,
        }))
        .unwrap();
        assert!(task.completed);
        assert_eq!(task.created_at, None);
        assert_eq!(
            task.updated_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn missing_fields_default() {
        let task: TaskEntity = serde_json::from_value(json!({})).unwrap();
        assert_eq!(task, TaskEntity::default());
    }

    #[test]
    fn unknown_kinds_are_kept_apart() {
        let session: FocusSessionEntity = serde_json::from_value(json!({
            "duration": 25,
            "date": "2025-03-14T10:00:00Z",
            "type": "meditation",
            "completed": true,
        }))
        .unwrap();
        assert_eq!(session.kind, SessionKind::Unknown);
        assert!(!session.is_focus());

        let session: FocusSessionEntity = serde_json::from_value(json!({
            "duration": 5,
            "type": "short-break",
        }))
        .unwrap();
        assert_eq!(session.kind, SessionKind::ShortBreak);
        assert_eq!(session.date, None);

        let expense: ExpenseEntity = serde_json::from_value(json!({
            "amount": 12.5,
            "date": "2025-03-14",
            "type": "income",
        }))
        .unwrap();
        assert_eq!(expense.kind, ExpenseKind::Income);
    }

    #[test]
    fn missing_kind_counts_as_nothing() {
        let session: FocusSessionEntity = serde_json::from_value(json!({
            "duration": 25,
            "date": "2025-03-12T10:00:00Z",
            "completed": true,
        }))
        .unwrap();
        assert_eq!(session.kind, SessionKind::Unknown);
        assert!(!session.is_focus());

        let expense: ExpenseEntity = serde_json::from_value(json!({
            "amount": 40.0,
            "date": "2025-03-12T10:00:00Z",
        }))
        .unwrap();
        assert_eq!(expense.kind, ExpenseKind::Unknown);
    }

    #[test]
    fn numbers_written_as_text_or_fractions() {
        let session: FocusSessionEntity = serde_json::from_value(json!({
            "duration": 25.5,
            "type": "focus",
        }))
        .unwrap();
        assert_eq!(session.duration, 25.5);

        let expense: ExpenseEntity = serde_json::from_value(json!({
            "amount": " 12.50",
            "type": "expense",
        }))
        .unwrap();
        assert_eq!(expense.amount, 12.5);

        for bad in [json!("twelve"), json!("NaN"), json!(null), json!([1])] {
            assert!(serde_json::from_value::<ExpenseEntity>(json!({ "amount": bad })).is_err());
        }
    }

    #[test]
    fn first_habit_entry_wins() {
        let habit: HabitEntity = serde_json::from_value(json!({
            "name": "read",
            "completions": [
                { "date": "2025-03-14", "completed": false },
                { "date": "2025-03-14", "completed": true },
                { "date": "2025-03-15", "completed": true },
            ],
        }))
        .unwrap();
        assert!(!habit.completed_on("2025-03-14"));
        assert!(habit.completed_on("2025-03-15"));
        assert!(!habit.completed_on("2025-03-16"));
    }

    #[test]
    fn serialized_dates_read_back() {
        let task = TaskEntity {
            completed: true,
            created_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()),
            ..Default::default()
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["createdAt"], json!("2025-03-01T08:00:00+00:00"));
        assert_eq!(value["updatedAt"], json!(null));
    }
}
