//! Expense entity model and DTOs.

use buildtrack_core::types::{Date, DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserSummary;

/// An expense row from the `expenses` table. Owns the receipt file, if any.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Expense {
    pub id: DbId,
    pub project_id: DbId,
    pub description: String,
    pub amount: Money,
    pub category: String,
    pub spent_at: Date,
    pub receipt_path: Option<String>,
    pub uploaded_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpense {
    pub description: String,
    pub amount: Money,
    pub category: String,
    pub spent_at: Date,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExpense {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub category: Option<String>,
    pub spent_at: Option<Date>,
}

/// Sum of expenses sharing a category.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseDetail {
    #[serde(flatten)]
    pub expense: Expense,
    pub uploader: Option<UserSummary>,
}
