//! In-process store used by the test suites.
//!
//! Behaves like the PostgreSQL adapter with row-level security switched on:
//! rows owned by someone else are simply invisible. It can also be told to
//! fail, or to swallow inserted rows, to exercise the services' error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::{ProfileStore, StoreError, TaskStore};
use crate::models::{NewTask, Profile, ProfileChanges, Task, TaskChanges};

#[derive(Default)]
pub struct MemoryStore {
    tasks: Mutex<Vec<Task>>,
    profiles: Mutex<HashMap<String, Profile>>,
    failure: Mutex<Option<String>>,
    drop_inserts: AtomicBool,
    calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task as-is, bypassing ownership assignment.
    pub fn seed_task(&self, task: Task) {
        lock(&self.tasks).push(task);
    }

    pub fn seed_profile(&self, profile: Profile) {
        lock(&self.profiles).insert(profile.id.clone(), profile);
    }

    /// Makes every subsequent call fail with a backend error carrying `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.failure) = Some(message.into());
    }

    /// Makes inserts report success without handing back the row.
    pub fn return_nothing_on_insert(&self) {
        self.drop_inserts.store(true, Ordering::SeqCst);
    }

    /// Number of store operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All stored tasks regardless of owner.
    pub fn all_tasks(&self) -> Vec<Task> {
        lock(&self.tasks).clone()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.failure).as_ref() {
            Some(message) => Err(StoreError::Backend(message.clone().into())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(&self, owner: &str) -> Result<Vec<Task>, StoreError> {
        self.enter()?;
        let mut owned: Vec<Task> = lock(&self.tasks)
            .iter()
            .filter(|task| task.user_id == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_task(&self, id: Uuid, owner: &str) -> Result<Option<Task>, StoreError> {
        self.enter()?;
        Ok(lock(&self.tasks)
            .iter()
            .find(|task| task.id == id && task.user_id == owner)
            .cloned())
    }

    async fn insert_task(&self, owner: &str, task: &NewTask) -> Result<Option<Task>, StoreError> {
        self.enter()?;
        let task = Task::new(task.clone(), owner);
        lock(&self.tasks).push(task.clone());

        if self.drop_inserts.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(task))
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: &str,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, StoreError> {
        self.enter()?;
        let mut tasks = lock(&self.tasks);
        Ok(tasks
            .iter_mut()
            .find(|task| task.id == id && task.user_id == owner)
            .map(|task| {
                task.apply(changes);
                task.clone()
            }))
    }

    async fn delete_task(&self, id: Uuid, owner: &str) -> Result<u64, StoreError> {
        self.enter()?;
        let mut tasks = lock(&self.tasks);
        let before = tasks.len();
        tasks.retain(|task| !(task.id == id && task.user_id == owner));
        Ok((before - tasks.len()) as u64)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, owner: &str) -> Result<Option<Profile>, StoreError> {
        self.enter()?;
        Ok(lock(&self.profiles).get(owner).cloned())
    }

    async fn update_profile(
        &self,
        owner: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<Profile>, StoreError> {
        self.enter()?;
        Ok(lock(&self.profiles).get_mut(owner).map(|profile| {
            profile.apply(changes);
            profile.clone()
        }))
    }
}
