pub mod auth;
pub mod contract;
pub mod dashboard;
pub mod document;
pub mod expense;
pub mod project;
pub mod report;
pub mod role;
pub mod schedule;
pub mod task;

use buildtrack_core::error::CoreError;
use buildtrack_core::types::DbId;
use buildtrack_core::validation::rules::label;
use buildtrack_db::models::project::Project;
use buildtrack_db::repositories::ProjectRepo;
use buildtrack_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::storage::FileStore;

/// 404 for `entity` with `id`.
pub(crate) fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

/// Load a live (not soft-deleted) project or fail with 404.
///
/// Project-scoped handlers call this first so nested resources of a
/// soft-deleted project are hidden.
pub(crate) async fn live_project(pool: &DbPool, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| not_found("Project", project_id))
}

/// Reject a list filter value outside its vocabulary with a 422.
pub(crate) fn check_filter(
    field: &str,
    value: Option<&str>,
    allowed: &[&str],
) -> AppResult<()> {
    match value {
        Some(v) if !allowed.contains(&v) => Err(CoreError::invalid_field(
            field,
            format!("The selected {} is invalid.", label(field)),
        )
        .into()),
        _ => Ok(()),
    }
}

/// The one element of a single-row relation load.
pub(crate) fn single<T>(items: Vec<T>, entity: &'static str, id: DbId) -> AppResult<T> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| AppError::InternalError(format!("Relation load dropped {entity} {id}")))
}

/// Pass through a row write that points at a freshly stored file, removing
/// that file when the write did not land.
pub(crate) async fn keep_file_if_written<T>(
    files: &FileStore,
    stored: Option<&str>,
    result: Result<Option<T>, sqlx::Error>,
) -> AppResult<Option<T>> {
    match result {
        Ok(Some(row)) => Ok(Some(row)),
        other => {
            if let Some(path) = stored {
                files.remove_quietly(path).await;
            }
            Ok(other?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_write_removes_the_stored_file() {
        let tmp = tempfile::tempdir().unwrap();
        let files = FileStore::new(tmp.path());

        let path = files.store("documents", "pdf", b"%PDF").await.unwrap();
        let result: Result<Option<()>, sqlx::Error> = Err(sqlx::Error::RowNotFound);
        assert!(keep_file_if_written(&files, Some(path.as_str()), result).await.is_err());
        assert!(!files.resolve(&path).exists());

        let path = files.store("documents", "pdf", b"%PDF").await.unwrap();
        let missing = keep_file_if_written::<()>(&files, Some(path.as_str()), Ok(None))
            .await
            .unwrap();
        assert!(missing.is_none());
        assert!(!files.resolve(&path).exists());
    }

    #[tokio::test]
    async fn landed_write_keeps_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let files = FileStore::new(tmp.path());

        let path = files.store("receipts", "png", b"png").await.unwrap();
        let row = keep_file_if_written(&files, Some(path.as_str()), Ok(Some(7))).await.unwrap();
        assert_eq!(row, Some(7));
        assert!(files.resolve(&path).exists());
    }
}
