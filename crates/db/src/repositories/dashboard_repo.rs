//! Dashboard aggregation over live projects.

use buildtrack_core::types::Money;
use sqlx::PgPool;

use crate::models::dashboard::{DashboardSummary, ProjectTotals};
use crate::models::expense::CategoryTotal;
use crate::repositories::task_repo::tally;

/// Provides the portfolio-wide dashboard summary.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Compute the dashboard summary.
    ///
    /// All aggregates are read inside one `REPEATABLE READ` transaction, so
    /// they describe the same snapshot even while writes are in flight.
    /// Soft-deleted projects and everything under them are excluded.
    pub async fn summary(pool: &PgPool) -> Result<DashboardSummary, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let totals = sqlx::query_as::<_, ProjectTotals>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'active') AS active,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'on_hold') AS on_hold,
                COALESCE(SUM(budget), 0) AS total_budget
             FROM projects
             WHERE deleted_at IS NULL",
        )
        .fetch_one(&mut *tx)
        .await?;

        let budget_used: Money = sqlx::query_scalar(
            "SELECT COALESCE(SUM(e.amount), 0)
             FROM expenses e JOIN projects p ON p.id = e.project_id
             WHERE p.deleted_at IS NULL",
        )
        .fetch_one(&mut *tx)
        .await?;

        let expenses_by_category = sqlx::query_as::<_, CategoryTotal>(
            "SELECT e.category, SUM(e.amount) AS total
             FROM expenses e JOIN projects p ON p.id = e.project_id
             WHERE p.deleted_at IS NULL
             GROUP BY e.category
             ORDER BY total DESC, e.category ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let task_rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT t.status, COUNT(*)
             FROM tasks t JOIN projects p ON p.id = t.project_id
             WHERE p.deleted_at IS NULL
             GROUP BY t.status",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            total_projects: totals.total,
            active_projects: totals.active,
            completed_projects: totals.completed,
            on_hold_projects: totals.on_hold,
            total_budget: totals.total_budget,
            budget_used,
            expenses_by_category,
            tasks_by_status: tally(task_rows),
        })
    }
}
