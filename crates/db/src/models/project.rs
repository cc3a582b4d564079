//! Project entity model and DTOs.

use buildtrack_core::types::{Date, DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::clearable;
use super::task::TaskWithAssignee;
use super::user::UserSummary;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub budget: Money,
    /// One of [`ProjectStatus::ALL`](buildtrack_core::status::ProjectStatus::ALL).
    pub status: String,
    pub created_by: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Minimal project reference embedded in child entities.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ProjectSummary {
    pub id: DbId,
    pub name: String,
    pub status: String,
}

/// DTO for creating a new project. `created_by` is taken from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    /// Defaults to 0 if omitted.
    pub budget: Option<Money>,
    /// Defaults to `active` if omitted.
    pub status: Option<String>,
}

/// DTO for updating an existing project. All fields are optional; nullable
/// columns can be cleared with an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub start_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "clearable")]
    pub end_date: Option<Option<Date>>,
    pub budget: Option<Money>,
    pub status: Option<String>,
}

/// Query filter for project listings.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// A project with its creator and its tasks (each with its assignee).
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub creator: Option<UserSummary>,
    pub tasks: Vec<TaskWithAssignee>,
}
