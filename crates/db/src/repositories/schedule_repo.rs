//! Repository for the `schedules` table.
//!
//! A schedule is visible while its task's project is live.

use buildtrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::schedule::{CreateSchedule, Schedule, ScheduleFilter, UpdateSchedule};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_id, assigned_to, scheduled_start, scheduled_end, status, \
                       notes, created_by, created_at, updated_at";

const LIVE_PROJECT: &str = "EXISTS (SELECT 1 FROM tasks t JOIN projects p ON p.id = t.project_id \
                            WHERE t.id = schedules.task_id AND p.deleted_at IS NULL)";

/// Provides CRUD operations for schedules.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Insert a new schedule entry. `status` defaults to `scheduled`.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateSchedule,
    ) -> Result<Schedule, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedules
                (task_id, assigned_to, scheduled_start, scheduled_end, status, notes, created_by)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'scheduled'), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(input.task_id)
            .bind(input.assigned_to)
            .bind(input.scheduled_start)
            .bind(input.scheduled_end)
            .bind(&input.status)
            .bind(&input.notes)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = $1 AND {LIVE_PROJECT}");
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List schedules by start time. A window filter keeps entries that
    /// overlap `[from, to]`.
    pub async fn list(
        pool: &PgPool,
        filter: &ScheduleFilter,
    ) -> Result<Vec<Schedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM schedules
             WHERE ($1::BIGINT IS NULL OR task_id = $1)
               AND ($2::BIGINT IS NULL OR assigned_to = $2)
               AND ($3::TEXT IS NULL OR status = $3)
               AND ($4::TIMESTAMPTZ IS NULL OR scheduled_end >= $4)
               AND ($5::TIMESTAMPTZ IS NULL OR scheduled_start <= $5)
               AND {LIVE_PROJECT}
             ORDER BY scheduled_start ASC, id ASC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(filter.task_id)
            .bind(filter.assigned_to)
            .bind(&filter.status)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Update a schedule. Only supplied fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSchedule,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!(
            "UPDATE schedules SET
                task_id = COALESCE($2, task_id),
                assigned_to = CASE WHEN $3 THEN $4 ELSE assigned_to END,
                scheduled_start = COALESCE($5, scheduled_start),
                scheduled_end = COALESCE($6, scheduled_end),
                status = COALESCE($7, status),
                notes = CASE WHEN $8 THEN $9 ELSE notes END
             WHERE id = $1 AND {LIVE_PROJECT}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .bind(input.task_id)
            .bind(input.assigned_to.is_some())
            .bind(input.assigned_to.flatten())
            .bind(input.scheduled_start)
            .bind(input.scheduled_end)
            .bind(&input.status)
            .bind(input.notes.is_some())
            .bind(input.notes.as_ref().and_then(|v| v.as_deref()))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM schedules WHERE id = $1 AND {LIVE_PROJECT}");
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
