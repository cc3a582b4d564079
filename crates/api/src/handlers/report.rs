//! Handlers for the `/reports` resource.
//!
//! Reports are either written by hand or generated from a project's current
//! tasks and expenses. A report outlives its project: after a purge its
//! `project_id` is null and `project` is omitted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildtrack_core::error::CoreError;
use buildtrack_core::reports::{self, FinancialSnapshot, TaskLine};
use buildtrack_core::status::ReportType;
use buildtrack_core::types::DbId;
use buildtrack_core::validation::{schemas, Mode};
use buildtrack_db::models::project::Project;
use buildtrack_db::models::report::{
    CreateReport, GenerateReport, Report, ReportDetail, ReportFilter, UpdateReport,
};
use buildtrack_db::relations;
use buildtrack_db::repositories::{ExpenseRepo, ReportRepo, TaskRepo};
use buildtrack_db::DbPool;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{check_filter, live_project, not_found, single};
use crate::error::AppResult;
use crate::form::{as_current, validate_input, JsonBody};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /reports`.
#[derive(Debug, Deserialize)]
pub struct ReportListParams {
    pub project_id: Option<DbId>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

async fn detail(pool: &DbPool, report: Report) -> AppResult<ReportDetail> {
    let id = report.id;
    single(relations::report_details(pool, vec![report]).await?, "Report", id)
}

/// GET /api/v1/reports
pub async fn index(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReportListParams>,
) -> AppResult<Json<DataResponse<Vec<ReportDetail>>>> {
    check_filter("type", params.report_type.as_deref(), ReportType::ALL)?;
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .clamped();

    let filter = ReportFilter {
        project_id: params.project_id,
        report_type: params.report_type,
        limit,
        offset,
    };
    let reports = ReportRepo::list(&state.pool, &filter).await?;
    let reports = relations::report_details(&state.pool, reports).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// POST /api/v1/reports
pub async fn store(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<DataResponse<ReportDetail>>)> {
    let validated =
        validate_input(&state.pool, &schemas::report(), &input, Mode::Create, None).await?;
    let dto: CreateReport = validated.into_dto()?;

    let report = ReportRepo::create(&state.pool, auth.user_id, &dto).await?;
    tracing::info!(report_id = report.id, user_id = auth.user_id, "Report created");

    let report = detail(&state.pool, report).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// POST /api/v1/reports/generate
///
/// Builds `progress`, `financial` or `task` content from the project's
/// current state and stores it as a new report.
pub async fn generate(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<DataResponse<ReportDetail>>)> {
    let validated = validate_input(
        &state.pool,
        &schemas::report_generation(),
        &input,
        Mode::Create,
        None,
    )
    .await?;
    let dto: GenerateReport = validated.into_dto()?;

    let project = live_project(&state.pool, dto.project_id).await?;
    let kind = ReportType::from_name(&dto.report_type)?;
    let content = build_content(&state.pool, kind, &project).await?;

    let report_date = dto
        .report_date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let title = dto
        .title
        .unwrap_or_else(|| reports::default_title(kind, &project.name, report_date));

    let create = CreateReport {
        project_id: Some(project.id),
        title,
        report_type: kind.as_str().to_string(),
        content: Some(content),
        report_date,
    };
    let report = ReportRepo::create(&state.pool, auth.user_id, &create).await?;
    tracing::info!(
        report_id = report.id,
        project_id = project.id,
        report_type = %kind,
        user_id = auth.user_id,
        "Report generated"
    );

    let report = detail(&state.pool, report).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

async fn build_content(pool: &DbPool, kind: ReportType, project: &Project) -> AppResult<String> {
    match kind {
        ReportType::Progress => {
            let counts = TaskRepo::count_by_status(pool, project.id).await?;
            Ok(reports::progress_content(&project.name, &counts))
        }
        ReportType::Financial => {
            let spent = ExpenseRepo::total_for_project(pool, project.id).await?;
            let by_category = ExpenseRepo::totals_by_category(pool, project.id)
                .await?
                .into_iter()
                .map(|c| (c.category, c.total))
                .collect();
            let snapshot = FinancialSnapshot {
                budget: project.budget,
                spent,
                by_category,
            };
            Ok(reports::financial_content(&project.name, &snapshot))
        }
        ReportType::Task => {
            let tasks = TaskRepo::list_by_project(pool, project.id, None).await?;
            let lines: Vec<TaskLine> = relations::tasks_with_assignees(pool, tasks)
                .await?
                .into_iter()
                .map(|t| TaskLine {
                    title: t.task.title,
                    status: t.task.status,
                    due_date: t.task.due_date,
                    assignee: t.assignee.map(|u| u.name),
                })
                .collect();
            Ok(reports::task_content(&project.name, &lines))
        }
        ReportType::Custom => Err(CoreError::invalid_field(
            "type",
            "Custom reports cannot be generated.",
        )
        .into()),
    }
}

/// GET /api/v1/reports/{id}
pub async fn show(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReportDetail>>> {
    let report = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Report", id))?;
    Ok(Json(DataResponse {
        data: detail(&state.pool, report).await?,
    }))
}

/// PUT /api/v1/reports/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> AppResult<Json<DataResponse<ReportDetail>>> {
    let existing = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Report", id))?;
    let current = as_current(&existing)?;

    let validated = validate_input(
        &state.pool,
        &schemas::report(),
        &input,
        Mode::Update,
        Some(&current),
    )
    .await?;
    let dto: UpdateReport = validated.into_dto()?;

    let report = ReportRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or_else(|| not_found("Report", id))?;
    tracing::info!(report_id = id, user_id = auth.user_id, "Report updated");

    Ok(Json(DataResponse {
        data: detail(&state.pool, report).await?,
    }))
}

/// DELETE /api/v1/reports/{id}
pub async fn destroy(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ReportRepo::delete(&state.pool, id).await? {
        return Err(not_found("Report", id));
    }
    tracing::info!(report_id = id, user_id = auth.user_id, "Report deleted");
    Ok(StatusCode::NO_CONTENT)
}
