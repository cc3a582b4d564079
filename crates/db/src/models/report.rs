//! Report entity model and DTOs.

use buildtrack_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::clearable;
use super::project::ProjectSummary;
use super::user::UserSummary;

/// A report row from the `reports` table.
///
/// `project_id` becomes `NULL` when the project is purged; the report stays.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub title: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub report_type: String,
    pub content: Option<String>,
    pub report_date: Date,
    pub generated_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReport {
    pub project_id: Option<DbId>,
    pub title: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub content: Option<String>,
    pub report_date: Date,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReport {
    #[serde(default, deserialize_with = "clearable")]
    pub project_id: Option<Option<DbId>>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub content: Option<Option<String>>,
    pub report_date: Option<Date>,
}

/// Input for building a report from current store state.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReport {
    pub project_id: DbId,
    #[serde(rename = "type")]
    pub report_type: String,
    pub title: Option<String>,
    pub report_date: Option<Date>,
}

/// Query filter for report listings.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub project_id: Option<DbId>,
    pub report_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// A report with its project (if still linked) and generator.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub project: Option<ProjectSummary>,
    pub generator: Option<UserSummary>,
}
