//! Task records and the task store.
//!
//! `TaskStore` owns the authoritative ordered collection (newest first) and
//! is the only writer: every mutation goes through `add` / `toggle` /
//! `delete` / `move_to`, and each successful mutation synchronously
//! persists the full collection through [`Storage`]. Hydration on startup
//! fails open to an empty collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Minimum title length in characters, after trimming.
pub const TITLE_MIN_CHARS: usize = 3;
/// Maximum title length in characters, after trimming.
pub const TITLE_MAX_CHARS: usize = 80;

/// Which board column a task lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    Done,
}

impl Status {
    /// The opposite column.
    pub fn toggled(self) -> Self {
        match self {
            Status::Todo => Status::Done,
            Status::Done => Status::Todo,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Done => "done",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "done" => Ok(Status::Done),
            other => Err(Error::InvalidArgument(format!(
                "unknown status '{other}' (expected 'todo' or 'done')"
            ))),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single task record, persisted as one element of the tasks array.
///
/// `id` and `created_at` are immutable after creation; titles have no edit
/// operation, so title uniqueness only ever needs checking at insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub note: String,
    pub status: Status,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    fn new(title: String, note: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            note,
            status: Status::Todo,
            created_at: now_millis(),
        }
    }
}

/// Current time truncated to milliseconds, matching the on-disk precision
/// so a persisted task round-trips equal to the in-memory one.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::<Utc>::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Title validation failures, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,
    #[error("title must be at least 3 characters")]
    TitleTooShort,
    #[error("title must be at most 80 characters")]
    TitleTooLong,
    #[error("a task with this title already exists")]
    DuplicateTitle,
}

/// Run the four insertion rules against a prospective title, in order:
/// required, minimum length, maximum length, case-insensitive uniqueness.
/// The first failing rule wins. Returns the trimmed title on success.
pub fn validate_title<'a>(
    raw: &'a str,
    existing: &[Task],
) -> std::result::Result<&'a str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::TitleRequired);
    }

    let length = trimmed.chars().count();
    if length < TITLE_MIN_CHARS {
        return Err(ValidationError::TitleTooShort);
    }
    if length > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong);
    }

    let lowered = trimmed.to_lowercase();
    if existing
        .iter()
        .any(|task| task.title.to_lowercase() == lowered)
    {
        return Err(ValidationError::DuplicateTitle);
    }

    Ok(trimmed)
}

/// Ordered per-column views over the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub todo: Vec<Task>,
    pub done: Vec<Task>,
}

impl Partition {
    fn of(tasks: &[Task]) -> Self {
        let mut partition = Partition::default();
        for task in tasks {
            match task.status {
                Status::Todo => partition.todo.push(task.clone()),
                Status::Done => partition.done.push(task.clone()),
            }
        }
        partition
    }

    pub fn column(&self, status: Status) -> &[Task] {
        match status {
            Status::Todo => &self.todo,
            Status::Done => &self.done,
        }
    }
}

/// The authoritative ordered task collection.
pub struct TaskStore {
    storage: Storage,
    tasks: Vec<Task>,
    generation: u64,
    partition: Option<(u64, Partition)>,
}

impl TaskStore {
    /// Hydrate the store from storage.
    ///
    /// Never fails: missing or corrupt data loads as an empty collection
    /// and the next mutation rewrites the file.
    pub fn load(storage: Storage) -> Self {
        let tasks = storage.read_tasks();
        Self {
            storage,
            tasks,
            generation: 0,
            partition: None,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The full collection, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Mutation counter. Bumps once per successful mutation; partition
    /// views are cached against it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Resolve an exact id or a unique id prefix to a full id.
    ///
    /// An exact match wins outright. A prefix matching several tasks is an
    /// error; a prefix matching nothing resolves to `None` so the caller
    /// falls through to the store's silent no-op semantics.
    pub fn resolve_id(&self, raw: &str) -> Result<Option<String>> {
        let needle = raw.trim();
        if needle.is_empty() {
            return Err(Error::InvalidArgument(
                "task id cannot be empty".to_string(),
            ));
        }

        if let Some(task) = self.get(needle) {
            return Ok(Some(task.id.clone()));
        }

        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.id.starts_with(needle))
            .collect();
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0].id.clone())),
            count => Err(Error::AmbiguousId {
                prefix: needle.to_string(),
                count,
            }),
        }
    }

    /// Add a task at the head of the collection (newest first).
    ///
    /// Title rules run in order; the first failure aborts with no mutation
    /// and no write. The note is trimmed and may be empty.
    pub fn add(&mut self, title: &str, note: &str) -> Result<Task> {
        let title = validate_title(title, &self.tasks)?;
        let task = Task::new(title.to_string(), note.trim().to_string());
        self.tasks.insert(0, task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Flip a task between todo and done. Toggling twice restores the
    /// original status. Missing ids are a silent no-op.
    ///
    /// Returns whether a task changed.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };
        task.status = task.status.toggled();
        self.persist()?;
        Ok(true)
    }

    /// Remove a task. Missing ids are a silent no-op, so a repeated delete
    /// is harmless.
    ///
    /// Returns whether a task was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Set a task's status unconditionally. Moving a task onto its current
    /// status is a harmless write-through; missing ids are a silent no-op.
    ///
    /// Returns whether the task was found.
    pub fn move_to(&mut self, id: &str, status: Status) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };
        task.status = status;
        self.persist()?;
        Ok(true)
    }

    /// Ordered per-column views, memoized against collection identity: the
    /// cached partition is reused until the generation moves.
    pub fn partition(&mut self) -> &Partition {
        let generation = self.generation;
        let stale = !matches!(&self.partition, Some((cached, _)) if *cached == generation);
        if stale {
            self.partition = Some((generation, Partition::of(&self.tasks)));
        }
        let (_, partition) = self
            .partition
            .get_or_insert_with(|| (generation, Partition::of(&self.tasks)));
        partition
    }

    /// Replace the collection with whatever is currently on disk.
    ///
    /// Used by the board when another process rewrites the tasks file.
    pub fn reload(&mut self) {
        self.tasks = self.storage.read_tasks();
        self.generation += 1;
    }

    fn persist(&mut self) -> Result<()> {
        self.generation += 1;
        self.storage.write_tasks(&self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, TaskStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = TaskStore::load(Storage::new(dir.path()));
        (dir, store)
    }

    fn seeded(ids_titles: &[(&str, &str)]) -> (TempDir, TaskStore) {
        let dir = TempDir::new().expect("tempdir");
        let storage = Storage::new(dir.path());
        let tasks: Vec<Task> = ids_titles
            .iter()
            .map(|(id, title)| Task {
                id: id.to_string(),
                title: title.to_string(),
                note: String::new(),
                status: Status::Todo,
                created_at: Utc::now(),
            })
            .collect();
        storage.write_tasks(&tasks).expect("seed write");
        let store = TaskStore::load(storage);
        (dir, store)
    }

    #[test]
    fn add_prepends_to_todo_head() {
        let (_dir, mut store) = setup_store();

        store.add("Write docs", "").unwrap();
        let second = store.add("Buy milk", "half-fat").unwrap();

        let partition = store.partition();
        assert_eq!(partition.todo.len(), 2);
        assert_eq!(partition.todo[0].id, second.id);
        assert_eq!(partition.todo[0].title, "Buy milk");
        assert_eq!(partition.todo[0].status, Status::Todo);
        assert!(partition.done.is_empty());
    }

    #[test]
    fn add_trims_title_and_note() {
        let (_dir, mut store) = setup_store();

        let task = store
            .add("  Buy milk  ", "  from the corner shop  ")
            .unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.note, "from the corner shop");
    }

    #[test]
    fn validation_runs_in_order() {
        let (_dir, mut store) = setup_store();

        assert_eq!(
            store.add("   ", "").unwrap_err().to_string(),
            "title is required"
        );
        assert_eq!(
            store.add("ab", "").unwrap_err().to_string(),
            "title must be at least 3 characters"
        );
        assert_eq!(
            store.add(&"x".repeat(81), "").unwrap_err().to_string(),
            "title must be at most 80 characters"
        );
        assert!(store.is_empty());
    }

    #[test]
    fn title_boundaries() {
        let (_dir, mut store) = setup_store();

        assert!(store.add("abc", "").is_ok());
        assert!(store.add(&"y".repeat(80), "").is_ok());
        assert!(matches!(
            store.add("zz", ""),
            Err(Error::Validation(ValidationError::TitleTooShort))
        ));
        assert!(matches!(
            store.add(&"z".repeat(81), ""),
            Err(Error::Validation(ValidationError::TitleTooLong))
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn duplicate_titles_rejected_case_insensitively() {
        let (_dir, mut store) = setup_store();

        store.add("Buy milk", "").unwrap();
        let err = store.add("  BUY MILK  ", "").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::DuplicateTitle)
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn length_checks_run_before_duplicate_check() {
        let (_dir, mut store) = setup_store();

        store.add(&"x".repeat(80), "").unwrap();
        let err = validate_title(&"x".repeat(81), store.tasks()).unwrap_err();
        assert_eq!(err, ValidationError::TitleTooLong);
    }

    #[test]
    fn toggle_is_an_involution() {
        let (_dir, mut store) = setup_store();

        let task = store.add("Write docs", "").unwrap();
        store.toggle(&task.id).unwrap();
        assert_eq!(store.get(&task.id).unwrap().status, Status::Done);

        store.toggle(&task.id).unwrap();
        assert_eq!(store.get(&task.id).unwrap().status, Status::Todo);
    }

    #[test]
    fn toggle_missing_is_a_noop() {
        let (_dir, mut store) = setup_store();

        store.add("Write docs", "").unwrap();
        let generation = store.generation();

        assert!(!store.toggle("no-such-id").unwrap());
        assert_eq!(store.generation(), generation);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, mut store) = setup_store();

        let task = store.add("Write docs", "").unwrap();
        assert!(store.delete(&task.id).unwrap());
        assert!(!store.delete(&task.id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn move_sets_status_unconditionally() {
        let (_dir, mut store) = setup_store();

        let task = store.add("Write docs", "").unwrap();
        assert!(store.move_to(&task.id, Status::Todo).unwrap());
        assert_eq!(store.get(&task.id).unwrap().status, Status::Todo);

        assert!(store.move_to(&task.id, Status::Done).unwrap());
        assert_eq!(store.get(&task.id).unwrap().status, Status::Done);

        assert!(!store.move_to("no-such-id", Status::Todo).unwrap());
    }

    #[test]
    fn partition_preserves_relative_order() {
        let (_dir, mut store) = setup_store();

        let a = store.add("First", "").unwrap();
        let b = store.add("Second", "").unwrap();
        let c = store.add("Third", "").unwrap();
        store.toggle(&b.id).unwrap();

        let partition = store.partition();
        let todo_ids: Vec<&str> = partition.todo.iter().map(|t| t.id.as_str()).collect();
        let done_ids: Vec<&str> = partition.done.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(todo_ids, vec![c.id.as_str(), a.id.as_str()]);
        assert_eq!(done_ids, vec![b.id.as_str()]);
    }

    #[test]
    fn partition_is_pure_and_tracks_mutations() {
        let (_dir, mut store) = setup_store();

        let task = store.add("Write docs", "").unwrap();
        let generation = store.generation();

        store.partition();
        store.partition();
        assert_eq!(store.generation(), generation);

        store.toggle(&task.id).unwrap();
        assert_eq!(store.generation(), generation + 1);
        assert_eq!(store.partition().done.len(), 1);
    }

    #[test]
    fn mutations_persist_synchronously() {
        let (dir, mut store) = setup_store();

        let task = store.add("Write docs", "note").unwrap();
        store.toggle(&task.id).unwrap();

        // A fresh store over the same directory sees the mutated state.
        let reloaded = TaskStore::load(Storage::new(dir.path()));
        assert_eq!(reloaded.tasks(), store.tasks());
        assert_eq!(reloaded.get(&task.id).unwrap().status, Status::Done);
    }

    #[test]
    fn round_trip_preserves_everything() {
        let (dir, mut store) = setup_store();

        store.add("Write docs", "with edge cases").unwrap();
        let second = store.add("Buy milk", "").unwrap();
        store.toggle(&second.id).unwrap();

        let reloaded = TaskStore::load(Storage::new(dir.path()));
        assert_eq!(reloaded.tasks(), store.tasks());
    }

    #[test]
    fn load_fails_open_on_corrupt_data() {
        let dir = TempDir::new().expect("tempdir");
        let storage = Storage::new(dir.path());
        std::fs::write(storage.tasks_path(), b"]]] definitely not json").unwrap();

        let store = TaskStore::load(storage);
        assert!(store.is_empty());
    }

    #[test]
    fn end_to_end_lifecycle() {
        let (_dir, mut store) = setup_store();
        assert!(store.is_empty());

        let task = store.add("Write docs", "").unwrap();
        assert_eq!(store.partition().todo.len(), 1);

        store.toggle(&task.id).unwrap();
        assert_eq!(store.get(&task.id).unwrap().status, Status::Done);

        store.move_to(&task.id, Status::Todo).unwrap();
        assert_eq!(store.get(&task.id).unwrap().status, Status::Todo);

        store.delete(&task.id).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn resolve_id_handles_prefixes() {
        let (_dir, store) = seeded(&[("aaa1", "First"), ("aaa2", "Second"), ("bbb7", "Third")]);

        assert_eq!(store.resolve_id("bbb7").unwrap(), Some("bbb7".to_string()));
        assert_eq!(store.resolve_id("bb").unwrap(), Some("bbb7".to_string()));
        assert_eq!(store.resolve_id("zzz").unwrap(), None);
        assert!(matches!(
            store.resolve_id("aaa"),
            Err(Error::AmbiguousId { count: 2, .. })
        ));
        assert!(store.resolve_id("  ").is_err());
    }

    #[test]
    fn exact_id_wins_over_prefix_ambiguity() {
        let (_dir, store) = seeded(&[("abc", "First"), ("abcd", "Second")]);

        assert_eq!(store.resolve_id("abc").unwrap(), Some("abc".to_string()));
    }

    #[test]
    fn status_parse_and_display() {
        assert_eq!(Status::parse("todo").unwrap(), Status::Todo);
        assert_eq!(Status::parse(" DONE ").unwrap(), Status::Done);
        assert!(Status::parse("archived").is_err());
        assert_eq!(Status::Todo.to_string(), "todo");
        assert_eq!(Status::Done.toggled(), Status::Todo);
    }

    #[test]
    fn note_field_is_optional_on_disk() {
        let dir = TempDir::new().expect("tempdir");
        let storage = Storage::new(dir.path());
        std::fs::write(
            storage.tasks_path(),
            br#"[{"id":"a","title":"Old record","status":"todo","createdAt":1700000000000}]"#,
        )
        .unwrap();

        let store = TaskStore::load(storage);
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].note, "");
    }
}
