//! Handlers for project documents under `/projects/{project_id}/documents`.
//!
//! Create takes a multipart form with a required `file` part. Update may
//! carry a replacement file; the file the row pointed at until then is
//! removed once the row points at the new one.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildtrack_core::status::DocumentCategory;
use buildtrack_core::types::DbId;
use buildtrack_core::uploads::DOCUMENT_POLICY;
use buildtrack_core::validation::{schemas, Mode};
use buildtrack_db::models::document::{CreateDocument, Document, DocumentDetail, UpdateDocument};
use buildtrack_db::relations;
use buildtrack_db::repositories::DocumentRepo;
use buildtrack_db::DbPool;

use super::{check_filter, keep_file_if_written, live_project, not_found, single};
use crate::error::{AppError, AppResult};
use crate::form::{as_current, validate_submission, FormInput, UploadRule};
use crate::middleware::auth::AuthUser;
use crate::query::CategoryFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

const FILE: UploadRule = UploadRule {
    field: "file",
    policy: &DOCUMENT_POLICY,
    required: true,
};

async fn detail(pool: &DbPool, document: Document) -> AppResult<DocumentDetail> {
    let id = document.id;
    single(
        relations::document_details(pool, vec![document]).await?,
        "Document",
        id,
    )
}

/// GET /api/v1/projects/{project_id}/documents
pub async fn index(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<CategoryFilterParams>,
) -> AppResult<Json<DataResponse<Vec<DocumentDetail>>>> {
    check_filter("category", params.category.as_deref(), DocumentCategory::ALL)?;
    live_project(&state.pool, project_id).await?;

    let documents =
        DocumentRepo::list_by_project(&state.pool, project_id, params.category.as_deref()).await?;
    let documents = relations::document_details(&state.pool, documents).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/projects/{project_id}/documents
pub async fn store(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    form: FormInput,
) -> AppResult<(StatusCode, Json<DataResponse<DocumentDetail>>)> {
    live_project(&state.pool, project_id).await?;

    let submission = validate_submission(
        &state.pool,
        &schemas::document(),
        form,
        Mode::Create,
        None,
        Some(FILE),
    )
    .await?;
    let file = submission
        .file
        .ok_or_else(|| AppError::InternalError("Validated document without a file".into()))?;
    let dto: CreateDocument = submission.validated.into_dto()?;

    let attachment = file.save(&state.files, &DOCUMENT_POLICY).await?;
    let created = DocumentRepo::create(&state.pool, project_id, auth.user_id, &dto, &attachment)
        .await
        .map(Some);
    let document = keep_file_if_written(&state.files, Some(&attachment.path), created)
        .await?
        .ok_or_else(|| AppError::InternalError("Document insert returned no row".into()))?;

    tracing::info!(
        document_id = document.id,
        project_id,
        user_id = auth.user_id,
        size = document.file_size,
        "Document uploaded"
    );

    let document = detail(&state.pool, document).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

/// GET /api/v1/projects/{project_id}/documents/{id}
pub async fn show(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<DocumentDetail>>> {
    live_project(&state.pool, project_id).await?;
    let document = DocumentRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Document", id))?;

    Ok(Json(DataResponse {
        data: detail(&state.pool, document).await?,
    }))
}

/// PUT /api/v1/projects/{project_id}/documents/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    form: FormInput,
) -> AppResult<Json<DataResponse<DocumentDetail>>> {
    live_project(&state.pool, project_id).await?;
    let existing = DocumentRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Document", id))?;
    let current = as_current(&existing)?;

    let submission = validate_submission(
        &state.pool,
        &schemas::document(),
        form,
        Mode::Update,
        Some(&current),
        Some(FILE),
    )
    .await?;
    let dto: UpdateDocument = submission.validated.into_dto()?;

    let attachment = match &submission.file {
        Some(file) => Some(file.save(&state.files, &DOCUMENT_POLICY).await?),
        None => None,
    };
    let updated =
        DocumentRepo::update(&state.pool, project_id, id, &dto, attachment.as_ref()).await;
    let replaced = keep_file_if_written(
        &state.files,
        attachment.as_ref().map(|a| a.path.as_str()),
        updated,
    )
    .await?
    .ok_or_else(|| not_found("Document", id))?;

    if let Some(old) = replaced.previous_file.as_deref() {
        state.files.remove_quietly(old).await;
    }
    let document = replaced.row;
    tracing::info!(
        document_id = id,
        project_id,
        user_id = auth.user_id,
        replaced_file = attachment.is_some(),
        "Document updated"
    );

    Ok(Json(DataResponse {
        data: detail(&state.pool, document).await?,
    }))
}

/// DELETE /api/v1/projects/{project_id}/documents/{id}
pub async fn destroy(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    live_project(&state.pool, project_id).await?;
    let document = DocumentRepo::delete(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Document", id))?;

    state.files.remove_quietly(&document.file_path).await;
    tracing::info!(document_id = id, project_id, user_id = auth.user_id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
