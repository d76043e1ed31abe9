use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, warn};

use super::{
    repo_types::User,
    session::{SessionKeys, SESSION_COOKIE},
};
use crate::{error::ApiError, state::AppState};

/// Caller holding a valid session cookie. Does not touch the store.
pub struct Session {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .ok_or(ApiError::Unauthorized)?;

        let keys = SessionKeys::from_ref(state);
        let username = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired session");
            ApiError::Unauthorized
        })?;
        Ok(Session { username })
    }
}

/// Identified caller: a valid session whose username still resolves to a user.
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Session { username } = Session::from_request_parts(parts, state).await?;

        match User::id_by_username(&state.db, &username).await {
            Ok(Some(id)) => Ok(AuthUser { id, username }),
            Ok(None) => {
                warn!(%username, "session for unknown user");
                Err(ApiError::Unauthorized)
            }
            Err(e) => {
                error!(error = %e, %username, "identify failed");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut req = Request::builder().uri("/review");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthorized() {
        let state = AppState::fake().await;
        let mut parts = parts_with_cookie(None);
        let err = Session::from_request_parts(&mut parts, &state).await.err().unwrap();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn forged_username_cookie_is_unauthorized() {
        let state = AppState::fake().await;
        User::create(&state.db, "alice", "hash").await.unwrap();
        let mut parts = parts_with_cookie(Some("session_token=alice"));
        let err = AuthUser::from_request_parts(&mut parts, &state).await.err().unwrap();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn valid_session_resolves_user_id() {
        let state = AppState::fake().await;
        let id = User::create(&state.db, "alice", "hash").await.unwrap().unwrap();
        let (token, _) = SessionKeys::from_ref(&state).sign("alice").unwrap();

        let mut parts = parts_with_cookie(Some(&format!("session_token={token}")));
        let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn valid_session_for_unknown_user_is_unauthorized() {
        let state = AppState::fake().await;
        let (token, _) = SessionKeys::from_ref(&state).sign("ghost").unwrap();

        let mut parts = parts_with_cookie(Some(&format!("session_token={token}")));
        assert!(Session::from_request_parts(&mut parts, &state).await.is_ok());
        let err = AuthUser::from_request_parts(&mut parts, &state).await.err().unwrap();
        assert!(matches!(err, ApiError::Unauthorized));
    }
}
