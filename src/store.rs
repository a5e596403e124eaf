use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::storage::KeyValueStore;
use crate::task::{Task, TaskFields, TaskId};

/// Storage key holding the whole collection.
pub const TODOS_KEY: &str = "todos";

/// Owns the task collection and writes it through to storage on every change.
///
/// The collection is an immutable snapshot; each mutation builds a new one, so a
/// snapshot handed out earlier never changes underneath its holder. A mutation that
/// returns `Err` has still been applied in memory; only the write-through failed.
pub struct TaskStore {
    tasks: Rc<[Task]>,
    backend: Box<dyn KeyValueStore>,
    last_issued_id: i64,
}

impl TaskStore {
    /// Restore the last snapshot. Missing or unreadable data means an empty list.
    #[tracing::instrument(skip(backend))]
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let tasks = match backend.get(TODOS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Task>>(&raw) {
                Ok(tasks) => {
                    info!(count = tasks.len(), "restored tasks");
                    tasks
                }
                Err(err) => {
                    warn!(error = %err, "stored tasks are malformed; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("no stored tasks");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "could not read stored tasks; starting empty");
                Vec::new()
            }
        };

        Self {
            tasks: tasks.into(),
            backend,
            last_issued_id: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Rc<[Task]> {
        Rc::clone(&self.tasks)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Create a task from form values and put it at the front of the list.
    pub fn add(&mut self, fields: TaskFields, now: DateTime<Local>) -> Result<TaskId> {
        let id = self.next_id(now);
        let task = Task::new(id.clone(), fields, now);
        debug!(id = %id, title = %task.title, "adding task");

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task);
        next.extend(self.tasks.iter().cloned());
        self.replace(next)?;
        Ok(id)
    }

    pub fn update(&mut self, id: &str, fields: TaskFields) -> Result<bool> {
        self.modify(id, |task| task.merge(fields))
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if !self.contains(id) {
            return Ok(false);
        }
        let next: Vec<Task> = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        debug!(id, "removing task");
        self.replace(next)?;
        Ok(true)
    }

    pub fn toggle_completed(&mut self, id: &str) -> Result<bool> {
        self.modify(id, |task| task.completed = !task.completed)
    }

    pub fn set_note(&mut self, id: &str, note: &str) -> Result<bool> {
        self.modify(id, |task| {
            task.notes = (!note.is_empty()).then(|| note.to_string());
        })
    }

    // Helper: copy the collection, change one task, write it through
    fn modify(&mut self, id: &str, change: impl FnOnce(&mut Task)) -> Result<bool> {
        let mut next = self.tasks.to_vec();
        let Some(task) = next.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        change(task);
        self.replace(next)?;
        Ok(true)
    }

    fn replace(&mut self, next: Vec<Task>) -> Result<()> {
        self.tasks = next.into();
        let result = self.persist();
        if let Err(err) = &result {
            error!(error = %format!("{err:#}"), "failed to persist tasks");
        }
        result
    }

    fn persist(&mut self) -> Result<()> {
        let serialized =
            serde_json::to_string(&*self.tasks).context("failed to serialize tasks")?;
        self.backend
            .set(TODOS_KEY, &serialized)
            .context("failed to write tasks to storage")?;
        debug!(count = self.tasks.len(), bytes = serialized.len(), "persisted tasks");
        Ok(())
    }

    // Clock-based ids, bumped past anything already issued or stored
    fn next_id(&mut self, now: DateTime<Local>) -> TaskId {
        let mut candidate = now.timestamp_millis().max(self.last_issued_id + 1);
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        self.last_issued_id = candidate;
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use anyhow::anyhow;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn empty_store() -> (TaskStore, MemoryStore) {
        let backend = MemoryStore::new();
        (TaskStore::load(Box::new(backend.clone())), backend)
    }

    struct BrokenBackend;

    impl KeyValueStore for BrokenBackend {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("read-only"))
        }
    }

    #[test]
    fn add_assigns_unique_ids_newest_first() {
        let (mut store, _) = empty_store();
        let mut ids = HashSet::new();
        // Same instant every time: the clock alone would collide.
        for n in 0..5 {
            let id = store.add(TaskFields::titled(&format!("task {n}")), noon()).unwrap();
            assert!(ids.insert(id));
        }

        assert_eq!(store.len(), 5);
        assert_eq!(store.tasks()[0].title, "task 4");
        assert!(store.tasks().iter().all(|t| !t.completed));
    }

    #[test]
    fn ids_skip_values_already_in_a_restored_snapshot() {
        let taken = noon().timestamp_millis().to_string();
        let raw = format!(
            r#"[{{"id":"{taken}","title":"old","completed":false,"createdAt":"x"}}]"#
        );
        let mut store = TaskStore::load(Box::new(MemoryStore::with_entry(TODOS_KEY, &raw)));

        let id = store.add(TaskFields::titled("new"), noon()).unwrap();
        assert_ne!(id, taken);
    }

    #[test]
    fn every_mutation_writes_the_full_collection() {
        let (mut store, backend) = empty_store();
        let id = store.add(TaskFields::titled("Buy milk"), noon()).unwrap();
        store.set_note(&id, "2 litres").unwrap();

        let saved: Vec<Task> =
            serde_json::from_str(&backend.entry(TODOS_KEY).unwrap()).unwrap();
        assert_eq!(saved.as_slice(), store.tasks());
        assert_eq!(saved[0].notes.as_deref(), Some("2 litres"));
    }

    #[test]
    fn snapshot_roundtrips_through_storage() {
        let (mut store, backend) = empty_store();
        let first = store.add(TaskFields::titled("one"), noon()).unwrap();
        let mut fields = TaskFields::titled("two");
        fields.notes = Some("details".into());
        fields.reminder = Some("2026-10-19T09:30".into());
        store.add(fields, noon()).unwrap();
        store.toggle_completed(&first).unwrap();

        let restored = TaskStore::load(Box::new(backend));
        assert_eq!(restored.tasks(), store.tasks());
    }

    #[test]
    fn malformed_snapshot_loads_empty() {
        let backend = MemoryStore::with_entry(TODOS_KEY, "{not json");
        assert!(TaskStore::load(Box::new(backend)).is_empty());

        let backend = MemoryStore::with_entry(TODOS_KEY, r#"[{"title":42}]"#);
        assert!(TaskStore::load(Box::new(backend)).is_empty());

        assert!(TaskStore::load(Box::new(BrokenBackend)).is_empty());
    }

    #[test]
    fn toggling_twice_restores_completion() {
        let (mut store, _) = empty_store();
        let id = store.add(TaskFields::titled("x"), noon()).unwrap();

        assert!(store.toggle_completed(&id).unwrap());
        assert!(store.get(&id).unwrap().completed);
        store.toggle_completed(&id).unwrap();
        assert!(!store.get(&id).unwrap().completed);
    }

    #[test]
    fn mutations_do_not_alias_earlier_snapshots() {
        let (mut store, _) = empty_store();
        let id = store.add(TaskFields::titled("x"), noon()).unwrap();
        let before = store.snapshot();

        store.toggle_completed(&id).unwrap();
        store.remove(&id).unwrap();

        assert_eq!(before.len(), 1);
        assert!(!before[0].completed);
        assert!(store.is_empty());
    }

    #[test]
    fn update_preserves_identity_and_creation_time() {
        let (mut store, _) = empty_store();
        let id = store.add(TaskFields::titled("draft"), noon()).unwrap();
        let created = store.get(&id).unwrap().created_at.clone();

        let mut fields = TaskFields::titled("final");
        fields.reminder = Some("2026-10-20T10:00".into());
        assert!(store.update(&id, fields).unwrap());

        let task = store.get(&id).unwrap();
        assert_eq!(task.title, "final");
        assert_eq!(task.created_at, created);
        assert!(!store.update("missing", TaskFields::titled("y")).unwrap());
    }

    #[test]
    fn empty_note_clears_notes() {
        let (mut store, _) = empty_store();
        let id = store.add(TaskFields::titled("x"), noon()).unwrap();
        store.set_note(&id, "hello").unwrap();
        store.set_note(&id, "").unwrap();
        assert_eq!(store.get(&id).unwrap().notes, None);
    }

    #[test]
    fn failed_write_keeps_the_change_in_memory() {
        let mut store = TaskStore::load(Box::new(BrokenBackend));
        let err = store.add(TaskFields::titled("x"), noon()).unwrap_err();

        assert!(format!("{err:#}").contains("read-only"));
        assert_eq!(store.len(), 1);
    }
}
