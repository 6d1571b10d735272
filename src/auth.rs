//! Credentials and request authentication.
//!
//! Passwords are stored as argon2id hashes. Sessions are bearer tokens of
//! the form `base64url(claims).base64url(hmac-sha256 signature)`; the
//! middleware verifies the signature and expiry, loads the account and
//! injects it into the request for handlers to extract.

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,

    #[error("bad token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("crypto failure: {0}")]
    Crypto(String),
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

fn sign(secret: &str, payload: &[u8]) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::Crypto(e.to_string()))?;
    mac.update(payload);
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

pub fn mint_token(secret: &str, user: Uuid, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&claims).map_err(|e| AuthError::Crypto(e.to_string()))?,
    );
    let signature = sign(secret, payload.as_bytes())?;
    Ok(format!("{payload}.{signature}"))
}

pub fn verify_token(secret: &str, token: &str) -> Result<TokenClaims, AuthError> {
    let (payload, signature) = token.split_once('.').ok_or(AuthError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::Crypto(e.to_string()))?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::Malformed)?;
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::BadSignature)?;

    let claims: TokenClaims = serde_json::from_slice(
        &URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::Malformed)?,
    )
    .map_err(|_| AuthError::Malformed)?;

    if claims.exp < Utc::now().timestamp() {
        return Err(AuthError::Expired);
    }

    Ok(claims)
}

/// The authenticated account, injected by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

    let claims = verify_token(&state.config.token_secret, token)
        .map_err(|_| ApiError::Unauthorized)?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    if !user.active {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser(user));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn token_roundtrip() {
        let user = Uuid::new_v4();
        let token = mint_token("secret", user, Duration::hours(1)).unwrap();
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, user);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = mint_token("secret", Uuid::new_v4(), Duration::seconds(-10)).unwrap();
        assert!(matches!(
            verify_token("secret", &token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint_token("secret", Uuid::new_v4(), Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_token("other secret", &token),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_token("secret", "not-a-token"),
            Err(AuthError::Malformed)
        ));
    }
}
