//! Role gates layered on [`AuthUser`].
//!
//! A caller without the required role gets 403; a caller without a valid
//! token still gets 401 from [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use buildtrack_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&AuthUser) -> bool,
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed(&user) {
        tracing::info!(user_id = user.user_id, role = %user.role, "Role check failed");
        return Err(AppError::Core(CoreError::Forbidden(message.to_string())));
    }
    Ok(user)
}

/// Admin only: role management and project purge.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, AuthUser::is_admin, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Manager or admin: project soft delete and restore.
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, AuthUser::is_manager, "Manager or Admin role required")
            .await
            .map(RequireManager)
    }
}
