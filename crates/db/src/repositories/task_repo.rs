//! Repository for the `tasks` table.
//!
//! Tasks of a soft-deleted project are hidden from every read.

use buildtrack_core::reports::TaskStatusCounts;
use buildtrack_core::status::TaskStatus;
use buildtrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, description, status, due_date, sort_order, \
                       assigned_to, created_by, created_at, updated_at";

/// Restricts a `tasks` query to rows whose project is live.
const LIVE_PROJECT: &str =
    "EXISTS (SELECT 1 FROM projects p WHERE p.id = tasks.project_id AND p.deleted_at IS NULL)";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task at the end of its project's board.
    ///
    /// Runs in a transaction: lock the project row, then take
    /// `MAX(sort_order) + 1` (1 for an empty project) unless the input names
    /// an explicit order. Concurrent creates in the same project serialize on
    /// the lock, so each sees the previous one's order.
    ///
    /// Returns `None` if the project does not exist or is soft-deleted.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: DbId,
        input: &CreateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM projects WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(None);
        }

        // Widened so the increment itself cannot overflow; a value past the
        // column range fails the insert with 22003 instead.
        let order: i64 = match input.order {
            Some(order) => i64::from(order),
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COALESCE(MAX(sort_order), 0)::BIGINT + 1 FROM tasks WHERE project_id = $1",
                )
                .bind(project_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let query = format!(
            "INSERT INTO tasks
                (project_id, title, description, status, due_date, sort_order, assigned_to, created_by)
             VALUES ($1, $2, $3, COALESCE($4, 'todo'), $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.due_date)
            .bind(order)
            .bind(input.assigned_to)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(task))
    }

    /// Find a task by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND {LIVE_PROJECT}");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Batch-load tasks for a set of IDs.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = ANY($1) AND {LIVE_PROJECT}");
        sqlx::query_as::<_, Task>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List a project's tasks in board order, optionally one status column.
    ///
    /// Orders are not unique; ties fall back to creation order (`id`).
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE project_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
               AND {LIVE_PROJECT}
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Only supplied fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                status = COALESCE($5, status),
                due_date = CASE WHEN $6 THEN $7 ELSE due_date END,
                sort_order = COALESCE($8, sort_order),
                assigned_to = CASE WHEN $9 THEN $10 ELSE assigned_to END
             WHERE id = $1 AND {LIVE_PROJECT}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|v| v.as_deref()))
            .bind(&input.status)
            .bind(input.due_date.is_some())
            .bind(input.due_date.flatten())
            .bind(input.order)
            .bind(input.assigned_to.is_some())
            .bind(input.assigned_to.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Move a task to another kanban column. Changes `status` only; the
    /// task keeps its order.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status = $2
             WHERE id = $1 AND {LIVE_PROJECT}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a task and, by cascade, its schedules.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM tasks WHERE id = $1 AND {LIVE_PROJECT}");
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a project's tasks per status column.
    pub async fn count_by_status(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<TaskStatusCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM tasks WHERE project_id = $1 GROUP BY status",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;
        Ok(tally(rows))
    }
}

/// Fold `(status, count)` rows into per-column counts.
pub(crate) fn tally(rows: Vec<(String, i64)>) -> TaskStatusCounts {
    let mut counts = TaskStatusCounts::default();
    for (status, count) in rows {
        match TaskStatus::from_name(&status) {
            Ok(status) => counts.record(status, count),
            Err(e) => tracing::warn!(error = %e, "Skipping task count with unknown status"),
        }
    }
    counts
}
