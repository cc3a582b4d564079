//! Handlers for the `/projects` resource.
//!
//! `DELETE /projects/{id}` is a soft delete; the project and everything
//! under it disappear from reads until restored. Purge removes the project
//! row, its cascaded children and their stored files for good.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildtrack_core::status::ProjectStatus;
use buildtrack_core::types::DbId;
use buildtrack_core::validation::{schemas, Mode};
use buildtrack_db::models::project::{
    CreateProject, Project, ProjectDetail, ProjectFilter, UpdateProject,
};
use buildtrack_db::relations;
use buildtrack_db::repositories::ProjectRepo;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{check_filter, live_project, not_found};
use crate::error::AppResult;
use crate::form::{as_current, validate_input, JsonBody};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /projects`.
#[derive(Debug, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/projects
pub async fn index(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    check_filter("status", params.status.as_deref(), ProjectStatus::ALL)?;
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .clamped();
    let filter = ProjectFilter {
        status: params.status,
        limit,
        offset,
    };

    let projects = ProjectRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
pub async fn store(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let validated =
        validate_input(&state.pool, &schemas::project(), &input, Mode::Create, None).await?;
    let dto: CreateProject = validated.into_dto()?;

    let project = ProjectRepo::create(&state.pool, auth.user_id, &dto).await?;
    tracing::info!(project_id = project.id, user_id = auth.user_id, "Project created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
///
/// Includes the creator and every task with its assignee.
pub async fn show(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let project = live_project(&state.pool, id).await?;
    let detail = relations::project_detail(&state.pool, project).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<Json<DataResponse<Project>>> {
    let existing = live_project(&state.pool, id).await?;
    let current = as_current(&existing)?;

    let validated = validate_input(
        &state.pool,
        &schemas::project(),
        &input,
        Mode::Update,
        Some(&current),
    )
    .await?;
    let dto: UpdateProject = validated.into_dto()?;

    let project = ProjectRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    tracing::info!(project_id = id, user_id = auth.user_id, "Project updated");

    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
pub async fn destroy(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProjectRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found("Project", id));
    }
    tracing::info!(project_id = id, user_id = user.user_id, "Project soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/restore
pub async fn restore(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    if !ProjectRepo::restore(&state.pool, id).await? {
        return Err(not_found("Project", id));
    }
    let project = live_project(&state.pool, id).await?;
    tracing::info!(project_id = id, user_id = user.user_id, "Project restored");
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}/purge
///
/// Works on live and soft-deleted projects alike. Stored files are removed
/// after the rows are gone.
pub async fn purge(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let paths = ProjectRepo::purge(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;

    state.files.remove_all_quietly(&paths).await;
    tracing::info!(
        project_id = id,
        user_id = admin.user_id,
        files = paths.len(),
        "Project purged"
    );
    Ok(StatusCode::NO_CONTENT)
}
