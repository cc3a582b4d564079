//! Route definitions for the `/tasks` resource.
//!
//! Tasks are listed and created under `/projects/{project_id}/tasks`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /{id}          -> show
/// PUT    /{id}          -> update
/// DELETE /{id}          -> destroy
/// PATCH  /{id}/status   -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(task::show).put(task::update).delete(task::destroy),
        )
        .route("/{id}/status", patch(task::update_status))
}
