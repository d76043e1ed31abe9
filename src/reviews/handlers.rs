use axum::{extract::State, http::StatusCode, routing::post, Router};
use tracing::{error, info, instrument, warn};

use super::{
    dto::{CreateReviewRequest, DeleteReviewRequest, UpdateReviewRequest},
    repo_types::Review,
};
use crate::{
    auth::AuthUser,
    catalog::repo_types::Film,
    error::{method_not_allowed, ApiError, ApiResult, REVIEW_NOT_FOUND},
    extract::JsonBody,
    state::AppState,
};

pub fn review_routes() -> Router<AppState> {
    Router::new().route(
        "/review",
        post(create_review)
            .patch(update_review)
            .delete(delete_review)
            .fallback(method_not_allowed),
    )
}

#[instrument(skip(state, user, body), fields(user_id = user.id, film_id = body.film_id))]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<CreateReviewRequest>,
) -> ApiResult<StatusCode> {
    let exists = Film::exists(&state.db, body.film_id).await.map_err(|e| {
        error!(error = %e, "film existence probe failed");
        ApiError::from(e)
    })?;
    if !exists {
        warn!("review for unknown film");
        return Err(ApiError::BadRequest("Film not found".into()));
    }

    let id = Review::create(&state.db, body.film_id, &body.review, user.id)
        .await
        .map_err(|e| {
            error!(error = %e, "insert review failed");
            ApiError::from(e)
        })?;

    info!(review_id = id, username = %user.username, "review created");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, user, body), fields(user_id = user.id, review_id = body.id))]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<UpdateReviewRequest>,
) -> ApiResult<StatusCode> {
    let affected = Review::update_owned(&state.db, body.id, user.id, &body.review)
        .await
        .map_err(|e| {
            error!(error = %e, "update review failed");
            ApiError::from(e)
        })?;
    if affected == 0 {
        warn!("update matched no owned review");
        return Err(ApiError::NotFound(REVIEW_NOT_FOUND));
    }

    info!("review updated");
    Ok(StatusCode::ACCEPTED)
}

#[instrument(skip(state, user, body), fields(user_id = user.id, review_id = body.id))]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<DeleteReviewRequest>,
) -> ApiResult<StatusCode> {
    let affected = Review::delete_owned(&state.db, body.id, user.id)
        .await
        .map_err(|e| {
            error!(error = %e, "delete review failed");
            ApiError::from(e)
        })?;
    if affected == 0 {
        warn!("delete matched no owned review");
        return Err(ApiError::NotFound(REVIEW_NOT_FOUND));
    }

    info!("review deleted");
    Ok(StatusCode::ACCEPTED)
}
