//! Route definitions for the `/roles` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::role;
use crate::state::AppState;

/// Routes mounted at `/roles`.
///
/// ```text
/// GET    /        -> index
/// POST   /        -> store (admin)
/// GET    /{id}    -> show
/// PUT    /{id}    -> update (admin)
/// DELETE /{id}    -> destroy (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(role::index).post(role::store))
        .route(
            "/{id}",
            get(role::show).put(role::update).delete(role::destroy),
        )
}
