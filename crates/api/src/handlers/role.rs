//! Handlers for the `/roles` resource.
//!
//! Reading roles needs any authenticated user; every mutation is admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use buildtrack_core::types::DbId;
use buildtrack_core::validation::{schemas, Mode};
use buildtrack_db::models::role::{CreateRole, Role, UpdateRole};
use buildtrack_db::repositories::RoleRepo;
use serde_json::{Map, Value};

use super::not_found;
use crate::error::AppResult;
use crate::form::{as_current, validate_input, JsonBody};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/roles
pub async fn index(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// POST /api/v1/roles
pub async fn store(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<DataResponse<Role>>)> {
    let validated = validate_input(&state.pool, &schemas::role(), &input, Mode::Create, None).await?;
    let dto: CreateRole = validated.into_dto()?;

    let role = RoleRepo::create(&state.pool, &dto).await?;
    tracing::info!(role_id = role.id, user_id = admin.user_id, name = %role.name, "Role created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// GET /api/v1/roles/{id}
pub async fn show(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Role>>> {
    let role = RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Role", id))?;
    Ok(Json(DataResponse { data: role }))
}

/// PUT /api/v1/roles/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<Json<DataResponse<Role>>> {
    let existing = RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Role", id))?;
    let current = as_current(&existing)?;

    let validated =
        validate_input(&state.pool, &schemas::role(), &input, Mode::Update, Some(&current)).await?;
    let dto: UpdateRole = validated.into_dto()?;

    let role = RoleRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or_else(|| not_found("Role", id))?;
    tracing::info!(role_id = id, user_id = admin.user_id, "Role updated");

    Ok(Json(DataResponse { data: role }))
}

/// DELETE /api/v1/roles/{id}
///
/// A role still assigned to users cannot be deleted (409).
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !RoleRepo::delete(&state.pool, id).await? {
        return Err(not_found("Role", id));
    }
    tracing::info!(role_id = id, user_id = admin.user_id, "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}
