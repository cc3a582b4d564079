//! Repository for the `documents` table.
//!
//! Rows are always addressed through their project; callers check that the
//! project is live before reaching here.

use buildtrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::attachment::{FileAttachment, Replaced};
use crate::models::document::{CreateDocument, Document, UpdateDocument};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, category, name, file_path, file_size, mime_type, \
                       version, uploaded_by, created_at, updated_at";

/// Provides CRUD operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Record an uploaded document. The file must already be stored.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        uploaded_by: DbId,
        input: &CreateDocument,
        file: &FileAttachment,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (project_id, category, name, file_path, file_size, mime_type, version, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(project_id)
            .bind(&input.category)
            .bind(&input.name)
            .bind(&file.path)
            .bind(file.size)
            .bind(&file.mime_type)
            .bind(&input.version)
            .bind(uploaded_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's documents, newest first, optionally one category.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        category: Option<&str>,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE project_id = $1 AND ($2::TEXT IS NULL OR category = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(project_id)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// Update metadata and, when `file` is given, point the row at a new
    /// stored file.
    ///
    /// The row is locked while its current path is read, so concurrent
    /// replacements each report the path they actually overwrote. The caller
    /// removes that file afterwards.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateDocument,
        file: Option<&FileAttachment>,
    ) -> Result<Option<Replaced<Document>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<String> = sqlx::query_scalar(
            "SELECT file_path FROM documents WHERE id = $1 AND project_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE documents SET
                name = COALESCE($3, name),
                category = COALESCE($4, category),
                version = CASE WHEN $5 THEN $6 ELSE version END,
                file_path = COALESCE($7, file_path),
                file_size = COALESCE($8, file_size),
                mime_type = CASE WHEN $7 IS NULL THEN mime_type ELSE $9 END
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        let document = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.version.is_some())
            .bind(input.version.as_ref().and_then(|v| v.as_deref()))
            .bind(file.map(|f| f.path.as_str()))
            .bind(file.map(|f| f.size))
            .bind(file.and_then(|f| f.mime_type.as_deref()))
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(Replaced {
            row: document,
            previous_file: file.map(|_| previous),
        }))
    }

    /// Delete a document row, returning it so the caller can remove its file.
    pub async fn delete(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "DELETE FROM documents WHERE id = $1 AND project_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }
}
