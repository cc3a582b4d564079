//! Task entity model and DTOs.

use buildtrack_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::clearable;
use super::project::ProjectSummary;
use super::user::UserSummary;

/// A task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<Date>,
    /// Manual kanban position within the project. Not unique.
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub assigned_to: Option<DbId>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task under a project (taken from the path).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `todo` if omitted.
    pub status: Option<String>,
    pub due_date: Option<Date>,
    /// Appended after the current last task if omitted.
    pub order: Option<i32>,
    pub assigned_to: Option<DbId>,
}

/// DTO for updating a task. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub due_date: Option<Option<Date>>,
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "clearable")]
    pub assigned_to: Option<Option<DbId>>,
}

/// Kanban status move.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskStatus {
    pub status: String,
}

/// A task with its assignee, as listed on a project.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithAssignee {
    #[serde(flatten)]
    pub task: Task,
    pub assignee: Option<UserSummary>,
}

/// A task with its project, assignee and creator.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub project: Option<ProjectSummary>,
    pub assignee: Option<UserSummary>,
    pub creator: Option<UserSummary>,
}
