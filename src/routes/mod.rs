//! HTTP surface of the service.

pub mod auth;
pub mod notifications;
pub mod users;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::health;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(health::check_health))
        .nest("/api/auth", auth::routes());

    let protected = Router::new()
        .nest("/api/users", users::routes())
        .nest("/api/suggestions", users::suggestion_routes())
        .nest("/api/notifications", notifications::routes())
        .layer(from_fn_with_state(
            state.clone(),
            crate::auth::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
}
