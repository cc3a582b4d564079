//! Repository for the `projects` table.

use buildtrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{
    CreateProject, Project, ProjectFilter, ProjectSummary, UpdateProject,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, start_date, end_date, budget, status, \
                       created_by, deleted_at, created_at, updated_at";

/// Provides CRUD, soft-delete and purge operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project owned by `created_by`, returning the created row.
    ///
    /// `budget` defaults to 0 and `status` to `active` when omitted.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, start_date, end_date, budget, status, created_by)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 'active'), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(&input.status)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by ID, including soft-deleted rows. Used by restore and purge.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects, most recently created first. Excludes soft-deleted rows.
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE deleted_at IS NULL
               AND ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&filter.status)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Batch-load summaries of non-deleted projects for a set of IDs.
    pub async fn find_summaries_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProjectSummary>(
            "SELECT id, name, status FROM projects
             WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Update a project. Only supplied fields in `input` are applied;
    /// nullable columns are cleared by an explicit `null`.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                start_date = CASE WHEN $5 THEN $6 ELSE start_date END,
                end_date = CASE WHEN $7 THEN $8 ELSE end_date END,
                budget = COALESCE($9, budget),
                status = COALESCE($10, status)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|v| v.as_deref()))
            .bind(input.start_date.is_some())
            .bind(input.start_date.flatten())
            .bind(input.end_date.is_some())
            .bind(input.end_date.flatten())
            .bind(input.budget)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a project by ID. Returns `true` if a row was marked deleted.
    ///
    /// Children stay in place and disappear from reads with their project.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted project. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a project, live or soft-deleted.
    ///
    /// The database cascades to tasks (and through them schedules),
    /// documents, expenses and contracts, and nulls `reports.project_id`.
    /// Returns the storage paths of every file owned by the cascaded rows so
    /// the caller can remove them once the transaction has committed, or
    /// `None` if the project does not exist.
    pub async fn purge(pool: &PgPool, id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let paths: Vec<String> = sqlx::query_scalar(
            "SELECT file_path FROM documents WHERE project_id = $1
             UNION ALL
             SELECT receipt_path FROM expenses WHERE project_id = $1 AND receipt_path IS NOT NULL
             UNION ALL
             SELECT file_path FROM contracts WHERE project_id = $1 AND file_path IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(paths))
    }
}
