//! Repository for the `reports` table.

use buildtrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::report::{CreateReport, Report, ReportFilter, UpdateReport};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, type, content, report_date, generated_by, \
                       created_at, updated_at";

/// Provides CRUD operations for reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a report authored (or generated) by `generated_by`.
    pub async fn create(
        pool: &PgPool,
        generated_by: DbId,
        input: &CreateReport,
    ) -> Result<Report, sqlx::Error> {
        let query = format!(
            "INSERT INTO reports (project_id, title, type, content, report_date, generated_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.report_type)
            .bind(&input.content)
            .bind(input.report_date)
            .bind(generated_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reports, latest report date first.
    pub async fn list(pool: &PgPool, filter: &ReportFilter) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports
             WHERE ($1::BIGINT IS NULL OR project_id = $1)
               AND ($2::TEXT IS NULL OR type = $2)
             ORDER BY report_date DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(filter.project_id)
            .bind(&filter.report_type)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReport,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET
                project_id = CASE WHEN $2 THEN $3 ELSE project_id END,
                title = COALESCE($4, title),
                type = COALESCE($5, type),
                content = CASE WHEN $6 THEN $7 ELSE content END,
                report_date = COALESCE($8, report_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(input.project_id.is_some())
            .bind(input.project_id.flatten())
            .bind(&input.title)
            .bind(&input.report_type)
            .bind(input.content.is_some())
            .bind(input.content.as_ref().and_then(|v| v.as_deref()))
            .bind(input.report_date)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
