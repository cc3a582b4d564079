//! Schedule entity model and DTOs.

use buildtrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::clearable;
use super::project::ProjectSummary;
use super::task::Task;
use super::user::UserSummary;

/// A schedule row from the `schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Schedule {
    pub id: DbId,
    pub task_id: DbId,
    pub assigned_to: Option<DbId>,
    pub scheduled_start: Timestamp,
    pub scheduled_end: Timestamp,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchedule {
    pub task_id: DbId,
    pub assigned_to: Option<DbId>,
    pub scheduled_start: Timestamp,
    pub scheduled_end: Timestamp,
    /// Defaults to `scheduled` if omitted.
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSchedule {
    pub task_id: Option<DbId>,
    #[serde(default, deserialize_with = "clearable")]
    pub assigned_to: Option<Option<DbId>>,
    pub scheduled_start: Option<Timestamp>,
    pub scheduled_end: Option<Timestamp>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub notes: Option<Option<String>>,
}

/// Query filter for schedule listings.
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub task_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
    pub status: Option<String>,
    /// Only schedules ending at or after this instant.
    pub from: Option<Timestamp>,
    /// Only schedules starting at or before this instant.
    pub to: Option<Timestamp>,
    pub limit: i64,
    pub offset: i64,
}

/// The scheduled task with its own project and assignee.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleTask {
    #[serde(flatten)]
    pub task: Task,
    pub project: Option<ProjectSummary>,
    pub assignee: Option<UserSummary>,
}

/// A schedule with its task (nested relations included) and assignee.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub task: Option<ScheduleTask>,
    pub assignee: Option<UserSummary>,
}
