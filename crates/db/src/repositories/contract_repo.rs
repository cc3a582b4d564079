//! Repository for the `contracts` table.

use buildtrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::attachment::Replaced;
use crate::models::contract::{Contract, CreateContract, UpdateContract};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, parties_involved, start_date, end_date, value, \
                       status, file_path, created_by, created_at, updated_at";

/// Provides CRUD operations for contracts.
pub struct ContractRepo;

impl ContractRepo {
    /// Insert a contract. `status` defaults to `draft`.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: DbId,
        input: &CreateContract,
        file_path: Option<&str>,
    ) -> Result<Contract, sqlx::Error> {
        let query = format!(
            "INSERT INTO contracts
                (project_id, title, parties_involved, start_date, end_date, value, status,
                 file_path, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'draft'), $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.parties_involved)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.value)
            .bind(&input.status)
            .bind(file_path)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
    ) -> Result<Vec<Contract>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts
             WHERE project_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY start_date DESC, id DESC"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(project_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Update a contract. A new `file_path` replaces the stored one and the
    /// overwritten path, read under a row lock, is returned for removal.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateContract,
        file_path: Option<&str>,
    ) -> Result<Option<Replaced<Contract>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<Option<String>> = sqlx::query_scalar(
            "SELECT file_path FROM contracts WHERE id = $1 AND project_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE contracts SET
                title = COALESCE($3, title),
                parties_involved = COALESCE($4, parties_involved),
                start_date = COALESCE($5, start_date),
                end_date = CASE WHEN $6 THEN $7 ELSE end_date END,
                value = COALESCE($8, value),
                status = COALESCE($9, status),
                file_path = COALESCE($10, file_path)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        let contract = sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.parties_involved)
            .bind(input.start_date)
            .bind(input.end_date.is_some())
            .bind(input.end_date.flatten())
            .bind(input.value)
            .bind(&input.status)
            .bind(file_path)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(Replaced {
            row: contract,
            previous_file: file_path.and(previous),
        }))
    }

    /// Delete a contract row, returning it so the caller can remove its file.
    pub async fn delete(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "DELETE FROM contracts WHERE id = $1 AND project_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }
}
