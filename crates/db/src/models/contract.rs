//! Contract entity model and DTOs.

use buildtrack_core::types::{Date, DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::clearable;
use super::project::ProjectSummary;
use super::user::UserSummary;

/// A contract row from the `contracts` table. Owns the file at `file_path`, if any.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub parties_involved: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub value: Money,
    pub status: String,
    pub file_path: Option<String>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContract {
    pub title: String,
    pub parties_involved: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub value: Money,
    /// Defaults to `draft` if omitted.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContract {
    pub title: Option<String>,
    pub parties_involved: Option<String>,
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "clearable")]
    pub end_date: Option<Option<Date>>,
    pub value: Option<Money>,
    pub status: Option<String>,
}

/// A contract with its project and creator.
#[derive(Debug, Clone, Serialize)]
pub struct ContractDetail {
    #[serde(flatten)]
    pub contract: Contract,
    pub project: Option<ProjectSummary>,
    pub creator: Option<UserSummary>,
}
