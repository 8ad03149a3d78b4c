//! Storage boundary.
//!
//! The services only see these traits, so ownership scoping and error mapping
//! can be exercised against [`MemoryStore`] without a database. Every method takes
//! the caller's subject as `owner` and must only ever touch rows owned by it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::{NewTask, Profile, ProfileChanges, Task, TaskChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failures reported by a store adapter.
#[derive(Debug)]
pub enum StoreError {
    /// The backend's own "no row matched" condition.
    NoRows,
    /// Any other backend failure, kept intact for diagnostics.
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::NoRows => write!(f, "no rows matched"),
            StoreError::Backend(source) => write!(f, "{}", source),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::NoRows => None,
            StoreError::Backend(source) => Some(source.as_ref()),
        }
    }
}

/// `sqlx::Error::RowNotFound` is the only backend error treated as "no row".
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::RowNotFound => StoreError::NoRows,
            other => StoreError::Backend(Box::new(other)),
        }
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks owned by `owner`, newest first.
    async fn list_tasks(&self, owner: &str) -> Result<Vec<Task>, StoreError>;

    async fn find_task(&self, id: Uuid, owner: &str) -> Result<Option<Task>, StoreError>;

    /// Inserts a task owned by `owner` and returns the persisted row, if the
    /// backend handed one back.
    async fn insert_task(&self, owner: &str, task: &NewTask) -> Result<Option<Task>, StoreError>;

    /// Applies `changes` and returns the updated row, or `None` when no owned
    /// row matched.
    async fn update_task(
        &self,
        id: Uuid,
        owner: &str,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns the number of rows deleted.
    async fn delete_task(&self, id: Uuid, owner: &str) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, owner: &str) -> Result<Option<Profile>, StoreError>;

    async fn update_profile(
        &self,
        owner: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<Profile>, StoreError>;
}
