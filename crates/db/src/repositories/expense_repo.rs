//! Repository for the `expenses` table.

use buildtrack_core::types::{DbId, Money};
use sqlx::PgPool;

use crate::models::attachment::Replaced;
use crate::models::expense::{CategoryTotal, CreateExpense, Expense, UpdateExpense};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, description, amount, category, spent_at, receipt_path, \
                       uploaded_by, created_at, updated_at";

/// Provides CRUD and per-project totals for expenses.
pub struct ExpenseRepo;

impl ExpenseRepo {
    /// Record an expense, with the path of an already stored receipt if any.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        uploaded_by: DbId,
        input: &CreateExpense,
        receipt_path: Option<&str>,
    ) -> Result<Expense, sqlx::Error> {
        let query = format!(
            "INSERT INTO expenses
                (project_id, description, amount, category, spent_at, receipt_path, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(project_id)
            .bind(&input.description)
            .bind(input.amount)
            .bind(&input.category)
            .bind(input.spent_at)
            .bind(receipt_path)
            .bind(uploaded_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM expenses WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's expenses, most recent spend first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses
             WHERE project_id = $1 AND ($2::TEXT IS NULL OR category = $2)
             ORDER BY spent_at DESC, id DESC"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(project_id)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// Update an expense. A new `receipt_path` replaces the stored one and
    /// the overwritten path, read under a row lock, is returned for removal.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateExpense,
        receipt_path: Option<&str>,
    ) -> Result<Option<Replaced<Expense>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<Option<String>> = sqlx::query_scalar(
            "SELECT receipt_path FROM expenses WHERE id = $1 AND project_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE expenses SET
                description = COALESCE($3, description),
                amount = COALESCE($4, amount),
                category = COALESCE($5, category),
                spent_at = COALESCE($6, spent_at),
                receipt_path = COALESCE($7, receipt_path)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        let expense = sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.description)
            .bind(input.amount)
            .bind(&input.category)
            .bind(input.spent_at)
            .bind(receipt_path)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(Replaced {
            row: expense,
            previous_file: receipt_path.and(previous),
        }))
    }

    /// Delete an expense row, returning it so the caller can remove its receipt.
    pub async fn delete(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!(
            "DELETE FROM expenses WHERE id = $1 AND project_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Total spend recorded against a project.
    pub async fn total_for_project(pool: &PgPool, project_id: DbId) -> Result<Money, sqlx::Error> {
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// Spend per category for a project, largest first.
    pub async fn totals_by_category(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<CategoryTotal>, sqlx::Error> {
        sqlx::query_as::<_, CategoryTotal>(
            "SELECT category, SUM(amount) AS total FROM expenses
             WHERE project_id = $1
             GROUP BY category
             ORDER BY total DESC, category ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
