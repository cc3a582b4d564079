//! Handlers for the `/schedules` resource.
//!
//! Every schedule is returned with its task (and that task's project and
//! assignee) and its own assignee, loaded in batched queries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildtrack_core::status::ScheduleStatus;
use buildtrack_core::types::{DbId, Timestamp};
use buildtrack_core::validation::{schemas, Mode};
use buildtrack_db::models::schedule::{
    CreateSchedule, Schedule, ScheduleDetail, ScheduleFilter, UpdateSchedule,
};
use buildtrack_db::relations;
use buildtrack_db::repositories::ScheduleRepo;
use buildtrack_db::DbPool;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{check_filter, not_found, single};
use crate::error::AppResult;
use crate::form::{as_current, validate_input, JsonBody};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /schedules`.
///
/// `from`/`to` select entries whose window overlaps the given range.
#[derive(Debug, Deserialize)]
pub struct ScheduleListParams {
    pub task_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
    pub status: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

async fn detail(pool: &DbPool, schedule: Schedule) -> AppResult<ScheduleDetail> {
    let id = schedule.id;
    single(
        relations::schedule_details(pool, vec![schedule]).await?,
        "Schedule",
        id,
    )
}

/// GET /api/v1/schedules
pub async fn index(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ScheduleListParams>,
) -> AppResult<Json<DataResponse<Vec<ScheduleDetail>>>> {
    check_filter("status", params.status.as_deref(), ScheduleStatus::ALL)?;
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .clamped();

    let filter = ScheduleFilter {
        task_id: params.task_id,
        assigned_to: params.assigned_to,
        status: params.status,
        from: params.from,
        to: params.to,
        limit,
        offset,
    };
    let schedules = ScheduleRepo::list(&state.pool, &filter).await?;
    let schedules = relations::schedule_details(&state.pool, schedules).await?;
    Ok(Json(DataResponse { data: schedules }))
}

/// POST /api/v1/schedules
pub async fn store(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<DataResponse<ScheduleDetail>>)> {
    let validated =
        validate_input(&state.pool, &schemas::schedule(), &input, Mode::Create, None).await?;
    let dto: CreateSchedule = validated.into_dto()?;

    let schedule = ScheduleRepo::create(&state.pool, auth.user_id, &dto).await?;
    tracing::info!(
        schedule_id = schedule.id,
        task_id = schedule.task_id,
        user_id = auth.user_id,
        "Schedule created"
    );

    let schedule = detail(&state.pool, schedule).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: schedule })))
}

/// GET /api/v1/schedules/{id}
pub async fn show(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ScheduleDetail>>> {
    let schedule = ScheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Schedule", id))?;
    Ok(Json(DataResponse {
        data: detail(&state.pool, schedule).await?,
    }))
}

/// PUT /api/v1/schedules/{id}
///
/// A new `scheduled_end` alone is checked against the stored start.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<Json<DataResponse<ScheduleDetail>>> {
    let existing = ScheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Schedule", id))?;
    let current = as_current(&existing)?;

    let validated = validate_input(
        &state.pool,
        &schemas::schedule(),
        &input,
        Mode::Update,
        Some(&current),
    )
    .await?;
    let dto: UpdateSchedule = validated.into_dto()?;

    let schedule = ScheduleRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or_else(|| not_found("Schedule", id))?;
    tracing::info!(schedule_id = id, user_id = auth.user_id, "Schedule updated");

    Ok(Json(DataResponse {
        data: detail(&state.pool, schedule).await?,
    }))
}

/// DELETE /api/v1/schedules/{id}
pub async fn destroy(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ScheduleRepo::delete(&state.pool, id).await? {
        return Err(not_found("Schedule", id));
    }
    tracing::info!(schedule_id = id, user_id = auth.user_id, "Schedule deleted");
    Ok(StatusCode::NO_CONTENT)
}
