use axum::{extract::State, http::StatusCode, response::Response, routing::post, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::Identity,
        dto::{LoginRequest, PublicUser, RegisterRequest, TokenData},
        password::{hash_password, verify_password},
    },
    error::ApiError,
    extract::JsonBody,
    response::{respond, LOGGED_IN, USER_ADDED},
    state::AppState,
};

/// Same message for unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Response, ApiError> {
    let payload = payload.validate().map_err(|e| {
        warn!("invalid registration payload");
        e
    })?;

    if state.store.find_user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict);
    }

    let hash = hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(&payload.email, &hash, &payload.username)
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(respond(StatusCode::OK, USER_ADDED, Some(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = payload.email.trim();

    let Some(user) = state.store.find_user_by_email(email).await? else {
        warn!(%email, "login unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.sign(&Identity {
        id: user.id,
        username: user.username,
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(respond(StatusCode::OK, LOGGED_IN, Some(TokenData { token })))
}
