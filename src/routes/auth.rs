use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::auth;
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 32))]
    pub user_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub ok: bool,
    pub message: String,
    pub token: String,
    pub user: AccountResponse,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if state.users.find_by_email(&request.email).await?.is_some() {
        return Err(ApiError::BadRequest("email already registered".into()));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let user = state
        .users
        .create(User::new(request.user_name, request.email, password_hash))
        .await?;

    // Seed failure never fails account creation; the next refresh pass
    // repairs a missing record.
    if let Err(e) = state.suggestions.seed(user.id).await {
        warn!(user = %user.id, error = %e, "could not seed suggestions at signup");
    }

    let token = auth::mint_token(
        &state.config.token_secret,
        user.id,
        Duration::hours(state.config.token_ttl_hours),
    )?;

    Ok(Json(AuthResponse {
        ok: true,
        message: "Account created successfully".into(),
        token,
        user: user.into(),
    }))
}

async fn signin(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !user.active || !auth::verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = auth::mint_token(
        &state.config.token_secret,
        user.id,
        Duration::hours(state.config.token_ttl_hours),
    )?;

    Ok(Json(AuthResponse {
        ok: true,
        message: "Signed in successfully".into(),
        token,
        user: user.into(),
    }))
}
