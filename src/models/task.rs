use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::nullable;
use crate::security::neutralize_markup;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum (`todo`, `inprogress`, `done`).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

/// Request body for creating a task.
///
/// Fields the server owns (`id`, `user_id`, timestamps) are not part of the
/// input; if a client sends them they are ignored during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 2000 characters if provided.
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Defaults to `todo`.
    #[serde(default)]
    pub status: TaskStatus,

    /// Defaults to `medium`.
    #[serde(default)]
    pub priority: TaskPriority,

    /// RFC 3339 timestamp with offset.
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Returns the input with markup in its free-text fields neutralized.
    pub fn sanitized(self) -> Self {
        Self {
            title: neutralize_markup(&self.title),
            description: self.description.as_deref().map(neutralize_markup),
            ..self
        }
    }
}

/// Request body for a partial task update.
///
/// Absent fields are left untouched. `description` and `due_date` accept an
/// explicit `null` to clear the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskChanges {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 2000))]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskChanges {
    pub fn sanitized(self) -> Self {
        Self {
            title: self.title.as_deref().map(neutralize_markup),
            description: self
                .description
                .map(|value| value.as_deref().map(neutralize_markup)),
            ..self
        }
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    /// Subject of the caller that created the task.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, with a fresh id and both
    /// timestamps set to now.
    pub fn new(input: NewTask, user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update in place and advances `updated_at`.
    pub fn apply(&mut self, changes: &TaskChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        self.updated_at = Utc::now();
    }
}

/// Response body for `GET /api/tasks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}
