//! Handler for the `/dashboard` summary.

use axum::extract::State;
use axum::Json;
use buildtrack_db::models::dashboard::DashboardSummary;
use buildtrack_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// Portfolio totals over live projects, read from one consistent snapshot.
pub async fn summary(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let summary = DashboardRepo::summary(&state.pool).await?;
    Ok(Json(DataResponse { data: summary }))
}
