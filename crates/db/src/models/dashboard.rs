//! Dashboard summary model.

use buildtrack_core::reports::TaskStatusCounts;
use buildtrack_core::types::Money;
use serde::Serialize;
use sqlx::FromRow;

use super::expense::CategoryTotal;

/// Project counts and budget sums over non-deleted projects.
#[derive(Debug, Clone, Default, FromRow)]
pub struct ProjectTotals {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub on_hold: i64,
    pub total_budget: Money,
}

/// Portfolio-wide statistics, taken from one snapshot of the store.
///
/// `active_projects + completed_projects + on_hold_projects == total_projects`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_projects: i64,
    pub active_projects: i64,
    pub completed_projects: i64,
    pub on_hold_projects: i64,
    pub total_budget: Money,
    /// Sum of expenses recorded against non-deleted projects.
    pub budget_used: Money,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub tasks_by_status: TaskStatusCounts,
}
