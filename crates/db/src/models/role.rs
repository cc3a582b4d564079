//! Role entity model and DTOs.

use buildtrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub label: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub label: Option<String>,
}
