//! Handlers for project contracts under `/projects/{project_id}/contracts`.
//!
//! The signed contract may be attached as the `file` multipart part.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildtrack_core::status::ContractStatus;
use buildtrack_core::types::DbId;
use buildtrack_core::uploads::CONTRACT_POLICY;
use buildtrack_core::validation::{schemas, Mode};
use buildtrack_db::models::contract::{Contract, ContractDetail, CreateContract, UpdateContract};
use buildtrack_db::relations;
use buildtrack_db::repositories::ContractRepo;
use buildtrack_db::DbPool;

use super::{check_filter, keep_file_if_written, live_project, not_found, single};
use crate::error::{AppError, AppResult};
use crate::form::{as_current, validate_submission, FormInput, UploadRule};
use crate::middleware::auth::AuthUser;
use crate::query::StatusFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

const FILE: UploadRule = UploadRule {
    field: "file",
    policy: &CONTRACT_POLICY,
    required: false,
};

async fn detail(pool: &DbPool, contract: Contract) -> AppResult<ContractDetail> {
    let id = contract.id;
    single(
        relations::contract_details(pool, vec![contract]).await?,
        "Contract",
        id,
    )
}

/// GET /api/v1/projects/{project_id}/contracts
pub async fn index(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<DataResponse<Vec<ContractDetail>>>> {
    check_filter("status", params.status.as_deref(), ContractStatus::ALL)?;
    live_project(&state.pool, project_id).await?;

    let contracts =
        ContractRepo::list_by_project(&state.pool, project_id, params.status.as_deref()).await?;
    let contracts = relations::contract_details(&state.pool, contracts).await?;
    Ok(Json(DataResponse { data: contracts }))
}

/// POST /api/v1/projects/{project_id}/contracts
pub async fn store(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    form: FormInput,
) -> AppResult<(StatusCode, Json<DataResponse<ContractDetail>>)> {
    live_project(&state.pool, project_id).await?;

    let submission = validate_submission(
        &state.pool,
        &schemas::contract(),
        form,
        Mode::Create,
        None,
        Some(FILE),
    )
    .await?;
    let dto: CreateContract = submission.validated.into_dto()?;

    let file_path = match &submission.file {
        Some(file) => Some(file.save(&state.files, &CONTRACT_POLICY).await?.path),
        None => None,
    };
    let created = ContractRepo::create(
        &state.pool,
        project_id,
        auth.user_id,
        &dto,
        file_path.as_deref(),
    )
    .await
    .map(Some);
    let contract = keep_file_if_written(&state.files, file_path.as_deref(), created)
        .await?
        .ok_or_else(|| AppError::InternalError("Contract insert returned no row".into()))?;

    tracing::info!(
        contract_id = contract.id,
        project_id,
        user_id = auth.user_id,
        "Contract created"
    );

    let contract = detail(&state.pool, contract).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: contract })))
}

/// GET /api/v1/projects/{project_id}/contracts/{id}
pub async fn show(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ContractDetail>>> {
    live_project(&state.pool, project_id).await?;
    let contract = ContractRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Contract", id))?;
    Ok(Json(DataResponse {
        data: detail(&state.pool, contract).await?,
    }))
}

/// PUT /api/v1/projects/{project_id}/contracts/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    form: FormInput,
) -> AppResult<Json<DataResponse<ContractDetail>>> {
    live_project(&state.pool, project_id).await?;
    let existing = ContractRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Contract", id))?;
    let current = as_current(&existing)?;

    let submission = validate_submission(
        &state.pool,
        &schemas::contract(),
        form,
        Mode::Update,
        Some(&current),
        Some(FILE),
    )
    .await?;
    let dto: UpdateContract = submission.validated.into_dto()?;

    let file_path = match &submission.file {
        Some(file) => Some(file.save(&state.files, &CONTRACT_POLICY).await?.path),
        None => None,
    };
    let updated =
        ContractRepo::update(&state.pool, project_id, id, &dto, file_path.as_deref()).await;
    let replaced = keep_file_if_written(&state.files, file_path.as_deref(), updated)
        .await?
        .ok_or_else(|| not_found("Contract", id))?;

    if let Some(old) = replaced.previous_file.as_deref() {
        state.files.remove_quietly(old).await;
    }
    let contract = replaced.row;
    tracing::info!(contract_id = id, project_id, user_id = auth.user_id, "Contract updated");

    Ok(Json(DataResponse {
        data: detail(&state.pool, contract).await?,
    }))
}

/// DELETE /api/v1/projects/{project_id}/contracts/{id}
pub async fn destroy(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    live_project(&state.pool, project_id).await?;
    let contract = ContractRepo::delete(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Contract", id))?;

    if let Some(path) = contract.file_path.as_deref() {
        state.files.remove_quietly(path).await;
    }
    tracing::info!(contract_id = id, project_id, user_id = auth.user_id, "Contract deleted");
    Ok(StatusCode::NO_CONTENT)
}
