use std::sync::Arc;
use uuid::Uuid;

use super::store_failure;
use crate::auth::CallerId;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges};
use crate::store::TaskStore;

/// Task operations scoped to the calling user.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

fn not_found(id: Uuid) -> AppError {
    // Same message whether the task is missing or owned by someone else.
    AppError::NotFound(format!("Task with id {} not found", id))
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// The caller's tasks, newest first.
    pub async fn list(&self, caller: &CallerId) -> Result<Vec<Task>, AppError> {
        self.store
            .list_tasks(caller.as_str())
            .await
            .map_err(|e| store_failure(e, "Fetching tasks"))
    }

    pub async fn get(&self, caller: &CallerId, id: Uuid) -> Result<Task, AppError> {
        self.store
            .find_task(id, caller.as_str())
            .await
            .map_err(|e| store_failure(e, "Fetching task by ID"))?
            .ok_or_else(|| not_found(id))
    }

    /// Creates a task owned by the caller. Any owner supplied by the client has
    /// already been dropped during deserialization.
    pub async fn create(&self, caller: &CallerId, input: NewTask) -> Result<Task, AppError> {
        let input = input.sanitized();
        let created = self
            .store
            .insert_task(caller.as_str(), &input)
            .await
            .map_err(|e| store_failure(e, "Creating task"))?;

        match created {
            Some(task) => {
                log::info!("Task {} created", task.id);
                Ok(task)
            }
            None => {
                log::error!("Task insert for {} reported success without a row", caller);
                Err(AppError::Internal("Task creation returned no data".into()))
            }
        }
    }

    pub async fn update(
        &self,
        caller: &CallerId,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Task, AppError> {
        let changes = changes.sanitized();
        self.store
            .update_task(id, caller.as_str(), &changes)
            .await
            .map_err(|e| store_failure(e, "Updating task"))?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, caller: &CallerId, id: Uuid) -> Result<(), AppError> {
        let deleted = self
            .store
            .delete_task(id, caller.as_str())
            .await
            .map_err(|e| store_failure(e, "Deleting task"))?;

        if deleted == 0 {
            return Err(not_found(id));
        }
        log::info!("Task {} deleted", id);
        Ok(())
    }
}
