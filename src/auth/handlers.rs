use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        password,
        repo_types::User,
        session::SessionKeys,
    },
    error::{method_not_allowed, ApiError, ApiResult},
    extract::JsonBody,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).fallback(method_not_allowed))
        .route("/login", post(login).fallback(method_not_allowed))
        .route("/logout", post(logout).fallback(method_not_allowed))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<StatusCode> {
    let existing = User::count_by_username(&state.db, &payload.username)
        .await
        .map_err(|e| {
            error!(error = %e, "count_by_username failed");
            ApiError::from(e)
        })?;
    if existing > 0 {
        warn!("username already exists");
        return Err(ApiError::Conflict("Username already exists"));
    }

    let hash = password::hash(payload.password).await.map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::from(e)
    })?;

    let user_id = match User::create(&state.db, &payload.username, &hash).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            warn!("username taken concurrently");
            return Err(ApiError::Conflict("Username already exists"));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    info!(user_id, "user registered");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<(CookieJar, StatusCode)> {
    let user = match User::find_by_username(&state.db, &payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            password::verify_unknown_user(payload.password).await;
            warn!("login unknown username");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err(ApiError::InvalidCredentials);
        }
    };

    match password::verify(payload.password, user.password_hash).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, user_id = user.id, "verify_password failed");
            return Err(ApiError::InvalidCredentials);
        }
    }

    let cookie = SessionKeys::from_ref(&state)
        .login_cookie(&user.username)
        .map_err(|e| {
            error!(error = %e, "session sign failed");
            ApiError::from(e)
        })?;

    info!(user_id = user.id, "user logged in");
    Ok((jar.add(cookie), StatusCode::OK))
}

#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let cookie = SessionKeys::from_ref(&state).logout_cookie();
    (jar.add(cookie), StatusCode::OK)
}
