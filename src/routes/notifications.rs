use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::routing::get;
use axum::{Extension, Json, Router};
use futures::Stream;
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::events::Event;
use crate::models::Notification;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list))
        .route("/stream", get(stream))
}

async fn list(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state.notifications.for_user(user.id).await?;
    Ok(Json(notifications))
}

/// Live notification push for the authenticated user.
async fn stream(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    let rx = state.events.subscribe();
    let user_id = user.id;

    let stream = BroadcastStream::new(rx).filter_map(move |event| match event {
        Ok(Event::NotificationAdded(n)) if n.dest_user == user_id => {
            Some(SseEvent::default().event("notification").json_data(&n))
        }
        // other users' notifications and lagged slots are skipped
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
