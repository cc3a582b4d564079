//! Handlers for project expenses under `/projects/{project_id}/expenses`.
//!
//! A receipt image or PDF may be attached as the `receipt` multipart part.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildtrack_core::types::DbId;
use buildtrack_core::uploads::RECEIPT_POLICY;
use buildtrack_core::validation::{schemas, Mode};
use buildtrack_db::models::expense::{CreateExpense, Expense, ExpenseDetail, UpdateExpense};
use buildtrack_db::relations;
use buildtrack_db::repositories::ExpenseRepo;
use buildtrack_db::DbPool;

use super::{keep_file_if_written, live_project, not_found, single};
use crate::error::{AppError, AppResult};
use crate::form::{as_current, validate_submission, FormInput, UploadRule};
use crate::middleware::auth::AuthUser;
use crate::query::CategoryFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

const RECEIPT: UploadRule = UploadRule {
    field: "receipt",
    policy: &RECEIPT_POLICY,
    required: false,
};

async fn detail(pool: &DbPool, expense: Expense) -> AppResult<ExpenseDetail> {
    let id = expense.id;
    single(
        relations::expense_details(pool, vec![expense]).await?,
        "Expense",
        id,
    )
}

/// GET /api/v1/projects/{project_id}/expenses
pub async fn index(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<CategoryFilterParams>,
) -> AppResult<Json<DataResponse<Vec<ExpenseDetail>>>> {
    live_project(&state.pool, project_id).await?;

    let expenses =
        ExpenseRepo::list_by_project(&state.pool, project_id, params.category.as_deref()).await?;
    let expenses = relations::expense_details(&state.pool, expenses).await?;
    Ok(Json(DataResponse { data: expenses }))
}

/// POST /api/v1/projects/{project_id}/expenses
pub async fn store(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    form: FormInput,
) -> AppResult<(StatusCode, Json<DataResponse<ExpenseDetail>>)> {
    live_project(&state.pool, project_id).await?;

    let submission = validate_submission(
        &state.pool,
        &schemas::expense(),
        form,
        Mode::Create,
        None,
        Some(RECEIPT),
    )
    .await?;
    let dto: CreateExpense = submission.validated.into_dto()?;

    let receipt = match &submission.file {
        Some(file) => Some(file.save(&state.files, &RECEIPT_POLICY).await?.path),
        None => None,
    };
    let created = ExpenseRepo::create(
        &state.pool,
        project_id,
        auth.user_id,
        &dto,
        receipt.as_deref(),
    )
    .await
    .map(Some);
    let expense = keep_file_if_written(&state.files, receipt.as_deref(), created)
        .await?
        .ok_or_else(|| AppError::InternalError("Expense insert returned no row".into()))?;

    tracing::info!(
        expense_id = expense.id,
        project_id,
        user_id = auth.user_id,
        amount = %expense.amount,
        "Expense recorded"
    );

    let expense = detail(&state.pool, expense).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: expense })))
}

/// GET /api/v1/projects/{project_id}/expenses/{id}
pub async fn show(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ExpenseDetail>>> {
    live_project(&state.pool, project_id).await?;
    let expense = ExpenseRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Expense", id))?;
    Ok(Json(DataResponse {
        data: detail(&state.pool, expense).await?,
    }))
}

/// PUT /api/v1/projects/{project_id}/expenses/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    form: FormInput,
) -> AppResult<Json<DataResponse<ExpenseDetail>>> {
    live_project(&state.pool, project_id).await?;
    let existing = ExpenseRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Expense", id))?;
    let current = as_current(&existing)?;

    let submission = validate_submission(
        &state.pool,
        &schemas::expense(),
        form,
        Mode::Update,
        Some(&current),
        Some(RECEIPT),
    )
    .await?;
    let dto: UpdateExpense = submission.validated.into_dto()?;

    let receipt = match &submission.file {
        Some(file) => Some(file.save(&state.files, &RECEIPT_POLICY).await?.path),
        None => None,
    };
    let updated =
        ExpenseRepo::update(&state.pool, project_id, id, &dto, receipt.as_deref()).await;
    let replaced = keep_file_if_written(&state.files, receipt.as_deref(), updated)
        .await?
        .ok_or_else(|| not_found("Expense", id))?;

    if let Some(old) = replaced.previous_file.as_deref() {
        state.files.remove_quietly(old).await;
    }
    let expense = replaced.row;
    tracing::info!(expense_id = id, project_id, user_id = auth.user_id, "Expense updated");

    Ok(Json(DataResponse {
        data: detail(&state.pool, expense).await?,
    }))
}

/// DELETE /api/v1/projects/{project_id}/expenses/{id}
pub async fn destroy(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    live_project(&state.pool, project_id).await?;
    let expense = ExpenseRepo::delete(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Expense", id))?;

    if let Some(receipt) = expense.receipt_path.as_deref() {
        state.files.remove_quietly(receipt).await;
    }
    tracing::info!(expense_id = id, project_id, user_id = auth.user_id, "Expense deleted");
    Ok(StatusCode::NO_CONTENT)
}
