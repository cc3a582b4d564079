//! Existence checks for ids named in validated input.

use buildtrack_core::types::DbId;
use buildtrack_core::validation::RefTable;
use sqlx::PgPool;

/// Answers whether a referenced row exists and is visible.
pub struct ReferenceRepo;

impl ReferenceRepo {
    /// `true` if `id` names a row of `table` that reads would return:
    /// projects must not be soft-deleted, and tasks must belong to a live
    /// project.
    pub async fn exists(pool: &PgPool, table: RefTable, id: DbId) -> Result<bool, sqlx::Error> {
        let query = match table {
            RefTable::Users => "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)",
            RefTable::Projects => {
                "SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1 AND deleted_at IS NULL)"
            }
            RefTable::Tasks => {
                "SELECT EXISTS (
                    SELECT 1 FROM tasks t JOIN projects p ON p.id = t.project_id
                    WHERE t.id = $1 AND p.deleted_at IS NULL
                 )"
            }
        };
        sqlx::query_scalar(query).bind(id).fetch_one(pool).await
    }
}
