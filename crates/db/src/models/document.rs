//! Document entity model and DTOs.

use buildtrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::clearable;
use super::user::UserSummary;

/// A document row from the `documents` table. Owns the file at `file_path`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub project_id: DbId,
    pub category: String,
    pub name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub version: Option<String>,
    pub uploaded_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Document metadata supplied with the upload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocument {
    pub name: String,
    pub category: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocument {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub version: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub uploader: Option<UserSummary>,
}
