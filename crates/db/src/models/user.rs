//! User entity model and DTOs.

use buildtrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] or [`UserSummary`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The public face of a user when embedded in another entity
/// (task assignee, project creator, document uploader, ...).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UserSummary {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// Resolved role name (e.g. `"admin"`, `"member"`).
    pub role: String,
    pub role_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating a new user. The password must already be hashed.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
}

impl UserResponse {
    /// Public view of `user` with its resolved role name.
    pub fn new(user: User, role: String) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
            role_id: user.role_id,
            created_at: user.created_at,
        }
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
