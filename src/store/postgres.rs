//! PostgreSQL adapter.
//!
//! Each operation runs in its own transaction that first publishes the caller's
//! subject as `request.jwt.claim.sub` (and optionally assumes a restricted
//! role), so the row-level-security policies in `migrations/` apply on top of
//! the explicit `user_id`/`id` filters below.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{ProfileStore, StoreError, TaskStore};
use crate::config::Config;
use crate::models::{NewTask, Profile, ProfileChanges, Task, TaskChanges};

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, due_date, user_id, created_at, updated_at";
const PROFILE_COLUMNS: &str = "id, email, name, avatar_url, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    role: Option<String>,
}

impl PgStore {
    /// `role` must already be a validated identifier (see `Config`).
    pub fn new(pool: PgPool, role: Option<String>) -> Self {
        Self { pool, role }
    }

    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool, config.database_role.clone()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Opens a transaction in which row-level security sees `owner` as the
    /// current user.
    async fn scoped(&self, owner: &str) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(role) = &self.role {
            let set_role = format!("SET LOCAL ROLE {}", role);
            sqlx::query(&set_role).execute(&mut *tx).await?;
        }

        sqlx::query(
            "SELECT set_config('request.jwt.claim.sub', $1, true), \
                    set_config('request.jwt.claims', json_build_object('sub', $1::text)::text, true)",
        )
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        Ok(tx)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_tasks(&self, owner: &str) -> Result<Vec<Task>, StoreError> {
        let mut tx = self.scoped(owner).await?;
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid, owner: &str) -> Result<Option<Task>, StoreError> {
        let mut tx = self.scoped(owner).await?;
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(task)
    }

    async fn insert_task(&self, owner: &str, task: &NewTask) -> Result<Option<Task>, StoreError> {
        let mut tx = self.scoped(owner).await?;
        let sql = format!(
            "INSERT INTO tasks (title, description, status, priority, due_date, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            TASK_COLUMNS
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.due_date)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: &str,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, StoreError> {
        let mut tx = self.scoped(owner).await?;

        // Only the fields present in the request are written.
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = now()");
        if let Some(title) = &changes.title {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = changes.status {
            builder.push(", status = ").push_bind(status);
        }
        if let Some(priority) = changes.priority {
            builder.push(", priority = ").push_bind(priority);
        }
        if let Some(due_date) = changes.due_date {
            builder.push(", due_date = ").push_bind(due_date);
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(owner.to_owned())
            .push(" RETURNING ")
            .push(TASK_COLUMNS);

        let updated = builder
            .build_query_as::<Task>()
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: Uuid, owner: &str) -> Result<u64, StoreError> {
        let mut tx = self.scoped(owner).await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_profile(&self, owner: &str) -> Result<Option<Profile>, StoreError> {
        let mut tx = self.scoped(owner).await?;
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn update_profile(
        &self,
        owner: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<Profile>, StoreError> {
        let mut tx = self.scoped(owner).await?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE profiles SET updated_at = now()");
        if let Some(name) = &changes.name {
            builder.push(", name = ").push_bind(name.clone());
        }
        if let Some(avatar_url) = &changes.avatar_url {
            builder.push(", avatar_url = ").push_bind(avatar_url.clone());
        }
        builder
            .push(" WHERE id = ")
            .push_bind(owner.to_owned())
            .push(" RETURNING ")
            .push(PROFILE_COLUMNS);

        let updated = builder
            .build_query_as::<Profile>()
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }
}
