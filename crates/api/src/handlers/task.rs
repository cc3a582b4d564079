//! Handlers for tasks: listed and created under `/projects/{id}/tasks`,
//! addressed directly under `/tasks/{id}`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildtrack_core::status::TaskStatus;
use buildtrack_core::types::DbId;
use buildtrack_core::validation::{schemas, Mode};
use buildtrack_db::models::task::{CreateTask, Task, TaskDetail, UpdateTask, UpdateTaskStatus};
use buildtrack_db::relations;
use buildtrack_db::repositories::TaskRepo;
use buildtrack_db::DbPool;
use serde_json::{Map, Value};

use super::{check_filter, live_project, not_found, single};
use crate::error::AppResult;
use crate::form::{as_current, validate_input, JsonBody};
use crate::middleware::auth::AuthUser;
use crate::query::StatusFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn detail(pool: &DbPool, task: Task) -> AppResult<TaskDetail> {
    let id = task.id;
    single(relations::task_details(pool, vec![task]).await?, "Task", id)
}

/// GET /api/v1/projects/{project_id}/tasks
///
/// Sorted by kanban order, then id. `?status=` narrows to one column.
pub async fn index(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<DataResponse<Vec<TaskDetail>>>> {
    check_filter("status", params.status.as_deref(), TaskStatus::ALL)?;
    live_project(&state.pool, project_id).await?;

    let tasks =
        TaskRepo::list_by_project(&state.pool, project_id, params.status.as_deref()).await?;
    let tasks = relations::task_details(&state.pool, tasks).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/v1/projects/{project_id}/tasks
///
/// Without an explicit `order` the task is appended after the project's
/// last task.
pub async fn store(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskDetail>>)> {
    live_project(&state.pool, project_id).await?;

    let validated = validate_input(&state.pool, &schemas::task(), &input, Mode::Create, None).await?;
    let dto: CreateTask = validated.into_dto()?;

    let task = TaskRepo::create(&state.pool, project_id, auth.user_id, &dto)
        .await?
        .ok_or_else(|| not_found("Project", project_id))?;
    tracing::info!(
        task_id = task.id,
        project_id,
        order = task.order,
        user_id = auth.user_id,
        "Task created"
    );

    let task = detail(&state.pool, task).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks/{id}
pub async fn show(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Task", id))?;
    Ok(Json(DataResponse {
        data: detail(&state.pool, task).await?,
    }))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    let existing = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Task", id))?;
    let current = as_current(&existing)?;

    let validated = validate_input(
        &state.pool,
        &schemas::task(),
        &input,
        Mode::Update,
        Some(&current),
    )
    .await?;
    let dto: UpdateTask = validated.into_dto()?;

    let task = TaskRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or_else(|| not_found("Task", id))?;
    tracing::info!(task_id = id, user_id = auth.user_id, "Task updated");

    Ok(Json(DataResponse {
        data: detail(&state.pool, task).await?,
    }))
}

/// PATCH /api/v1/tasks/{id}/status
///
/// Kanban move. Only the status changes; the task keeps its order.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    let validated =
        validate_input(&state.pool, &schemas::task_status(), &input, Mode::Create, None).await?;
    let dto: UpdateTaskStatus = validated.into_dto()?;

    let task = TaskRepo::update_status(&state.pool, id, &dto.status)
        .await?
        .ok_or_else(|| not_found("Task", id))?;
    tracing::info!(task_id = id, status = %task.status, user_id = auth.user_id, "Task moved");

    Ok(Json(DataResponse {
        data: detail(&state.pool, task).await?,
    }))
}

/// DELETE /api/v1/tasks/{id}
///
/// The task's schedules are removed with it.
pub async fn destroy(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(not_found("Task", id));
    }
    tracing::info!(task_id = id, user_id = auth.user_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
