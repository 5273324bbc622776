use std::{
    fmt::Display,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, error, warn};

use super::{
    entities::{BookEntity, ExpenseEntity, FocusSessionEntity, HabitEntity, TaskEntity},
    Snapshot,
};

/// Named collections kept by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tasks,
    Habits,
    FocusSessions,
    Expenses,
    Books,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Tasks,
        Collection::Habits,
        Collection::FocusSessions,
        Collection::Expenses,
        Collection::Books,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Habits => "habits",
            Collection::FocusSessions => "focus-sessions",
            Collection::Expenses => "expenses",
            Collection::Books => "books",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Interface for abstracting the store the tracker writes into. Only reads are needed here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every record of a collection in stored order. A collection that was never written
    /// is empty, not an error.
    async fn read_collection(&self, collection: Collection) -> Result<Vec<Value>>;
}

#[async_trait]
impl<T> RecordStore for T
where
    T: Deref + Send + Sync,
    T::Target: RecordStore,
{
    async fn read_collection(&self, collection: Collection) -> Result<Vec<Value>> {
        self.deref().read_collection(collection).await
    }
}

/// The main realization of [RecordStore]. Every collection is a JSON array stored in
/// `<dir>/<collection>.json`.
pub struct DirRecordStore {
    record_dir: PathBuf,
}

impl DirRecordStore {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self { record_dir })
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.record_dir.join(format!("{}.json", collection.name()))
    }

    async fn read_inner(path: &Path) -> Result<Vec<Value>> {
        async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
            debug!("Extracting {path:?}");
            let mut file = File::open(path).await?;
            // Shared lock so a writer never hands us a half written document.
            file.lock_shared()?;
            let mut content = String::new();
            let read = file.read_to_string(&mut content).await;
            file.unlock_async().await?;
            read?;
            Ok(content)
        }

        let content = match extract(path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => Err(e)?,
        };

        if content.trim().is_empty() {
            return Ok(vec![]);
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Array(values) => Ok(values),
            Value::Null => Ok(vec![]),
            other => bail!(
                "Expected a JSON array in {path:?}, found {}",
                kind_name(&other)
            ),
        }
    }
}

#[async_trait]
impl RecordStore for DirRecordStore {
    async fn read_collection(&self, collection: Collection) -> Result<Vec<Value>> {
        Self::read_inner(&self.path_for(collection)).await
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turns raw records into typed ones. Records that don't fit are skipped, never the batch.
pub fn decode_records<T: DeserializeOwned>(collection: Collection, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Skipping record {index} of {collection}: {e}");
                None
            }
        })
        .collect()
}

async fn read_typed<T: DeserializeOwned>(
    store: &(impl RecordStore + ?Sized),
    collection: Collection,
) -> Vec<T> {
    match store.read_collection(collection).await {
        Ok(raw) => decode_records(collection, raw),
        Err(e) => {
            error!("Failed to read {collection}, treating it as empty: {e:?}");
            vec![]
        }
    }
}

/// Reads every collection at once. A collection that fails to load is logged and left empty so
/// one broken file doesn't hide the others.
pub async fn load_snapshot(store: &(impl RecordStore + ?Sized)) -> Snapshot {
    let (tasks, habits, focus_sessions, expenses, books) = tokio::join!(
        read_typed::<TaskEntity>(store, Collection::Tasks),
        read_typed::<HabitEntity>(store, Collection::Habits),
        read_typed::<FocusSessionEntity>(store, Collection::FocusSessions),
        read_typed::<ExpenseEntity>(store, Collection::Expenses),
        read_typed::<BookEntity>(store, Collection::Books),
    );
    debug!(
        tasks = tasks.len(),
        habits = habits.len(),
        focus_sessions = focus_sessions.len(),
        expenses = expenses.len(),
        books = books.len(),
        "Loaded snapshot"
    );
    Snapshot {
        tasks,
        habits,
        focus_sessions,
        expenses,
        books,
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    use super::{load_snapshot, Collection, DirRecordStore, MockRecordStore, RecordStore};
    use crate::{store::entities::TaskEntity, utils::logging::TEST_LOGGING};

    #[tokio::test]
    async fn test_missing_collection_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = DirRecordStore::new(dir.path().to_owned())?;
        for collection in Collection::ALL {
            assert!(store.read_collection(collection).await?.is_empty());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_reads_written_collection() -> Result<()> {
        let dir = tempdir()?;
        let store = DirRecordStore::new(dir.path().to_owned())?;
        std::fs::write(
            store.path_for(Collection::Tasks),
            serde_json::to_string(&json!([
                { "title": "a", "completed": true },
                { "title": "b" },
            ]))?,
        )?;

        let values = store.read_collection(Collection::Tasks).await?;
        assert_eq!(values.len(), 2);
        assert!(store.read_collection(Collection::Books).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_non_array_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let store = DirRecordStore::new(dir.path().to_owned())?;
        std::fs::write(store.path_for(Collection::Habits), "{\"name\": \"x\"}")?;
        assert!(store.read_collection(Collection::Habits).await.is_err());

        std::fs::write(store.path_for(Collection::Habits), "   ")?;
        assert!(store.read_collection(Collection::Habits).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_record_does_not_abort_batch() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = DirRecordStore::new(dir.path().to_owned())?;
        std::fs::write(
            store.path_for(Collection::FocusSessions),
            serde_json::to_string(&json!([
                { "duration": 25, "type": "focus", "completed": true },
                { "duration": "twenty five", "type": "focus" },
                "garbage",
                { "duration": 50, "type": "focus", "date": "nope" },
            ]))?,
        )?;
        std::fs::write(store.path_for(Collection::Books), "[{,]")?;

        let snapshot = load_snapshot(&store).await;
        assert_eq!(snapshot.focus_sessions.len(), 2);
        assert_eq!(snapshot.focus_sessions[1].date, None);
        assert!(snapshot.books.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_collection_is_isolated() -> Result<()> {
        let mut store = MockRecordStore::new();
        store
            .expect_read_collection()
            .returning(|collection| match collection {
                Collection::Tasks => Ok(vec![json!({ "completed": true })]),
                Collection::Expenses => Err(anyhow::anyhow!("disk on fire")),
                _ => Ok(vec![]),
            })
            .times(5);

        let snapshot = load_snapshot(&store).await;
        assert_eq!(
            snapshot.tasks,
            vec![TaskEntity {
                completed: true,
                ..Default::default()
            }]
        );
        assert!(snapshot.expenses.is_empty());
        Ok(())
    }
}
