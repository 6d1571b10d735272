use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::events::Event;
use crate::models::{Follow, Notification, Profile};
use crate::state::AppState;
use crate::suggest::SuggestError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(me))
        .route("/:id", get(profile))
        .route("/:id/follow", post(follow_user))
        .route("/:id/unfollow", post(unfollow_user))
}

pub fn suggestion_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(suggest_friends))
}

async fn me(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .users
        .profile(user.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(profile))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state.users.profile(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(profile))
}

async fn follow_user(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResult>, ApiError> {
    if id == user.id {
        return Err(ApiError::BadRequest("cannot follow yourself".into()));
    }
    if state.graph.is_following(user.id, id).await? {
        return Ok(Json(ApiResult::err("Already following this user")));
    }

    let target = state.users.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

    state.follows.follow(Follow::new(user.id, target.id)).await?;

    let notification = state
        .notifications
        .add(Notification::follow(&user, target.id))
        .await?;
    state.events.publish(Event::NotificationAdded(notification));

    Ok(Json(ApiResult::ok("Follow user successfully")))
}

async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResult>, ApiError> {
    if !state.graph.is_following(user.id, id).await? {
        return Ok(Json(ApiResult::err("You have not followed this user")));
    }

    state.follows.unfollow(user.id, id).await?;

    Ok(Json(ApiResult::ok("Unfollow user successfully")))
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SuggestFriendsResponse {
    pub ok: bool,
    pub message: String,
    pub users: Vec<Profile>,
}

async fn suggest_friends(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<SuggestFriendsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(state.suggestions.cap());

    match state.suggestions.suggest(user.id, limit).await {
        Ok(users) => Ok(Json(SuggestFriendsResponse {
            ok: true,
            message: "Fetched suggested friends successfully".into(),
            users,
        })),
        // an out-of-range limit is a structured refusal, not a failure
        Err(e @ SuggestError::LimitExceedsMaximum { .. }) => Ok(Json(SuggestFriendsResponse {
            ok: false,
            message: e.to_string(),
            users: Vec::new(),
        })),
        Err(e) => Err(e.into()),
    }
}
