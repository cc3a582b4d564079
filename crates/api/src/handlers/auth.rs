//! Handlers for `/auth`: password login and the current user.

use axum::extract::State;
use axum::Json;
use buildtrack_core::error::CoreError;
use buildtrack_db::models::user::{User, UserResponse};
use buildtrack_db::repositories::{RoleRepo, UserRepo};
use buildtrack_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::form::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued token plus the user it belongs to.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until `access_token` expires.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn bad_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid email or password".into(),
    ))
}

async fn with_role(pool: &DbPool, user: User) -> AppResult<UserResponse> {
    let role = RoleRepo::resolve_name(pool, user.role_id).await?;
    Ok(UserResponse::new(user, role))
}

/// POST /api/v1/auth/login
///
/// Email matching ignores case. An unknown email and a wrong password get
/// the same 401.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(bad_credentials)?;

    let matches = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Stored password hash is unusable: {e}")))?;
    if !matches {
        tracing::info!(user_id = user.id, "Login rejected");
        return Err(bad_credentials());
    }

    let user = with_role(&state.pool, user).await?;
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token signing failed: {e}")))?;
    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expires_in_secs(),
        user,
    }))
}

/// GET /api/v1/auth/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    Ok(Json(DataResponse {
        data: with_role(&state.pool, user).await?,
    }))
}
