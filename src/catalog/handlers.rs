use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{debug, error, instrument, warn};

use super::{
    dto::{FilmDetails, FilmQuery, ReviewView},
    repo_types::{Film, FilmSummary},
};
use crate::{
    auth::{repo_types::User, Session},
    error::{method_not_allowed, ApiError, ApiResult},
    reviews::repo_types::Review,
    state::AppState,
};

pub fn film_routes() -> Router<AppState> {
    Router::new().route("/film", get(film).fallback(method_not_allowed))
}

/// GET /film lists the catalog, GET /film?id=N returns one film with its reviews.
#[instrument(skip(state, session, query), fields(username = %session.username))]
pub async fn film(
    State(state): State<AppState>,
    session: Session,
    query: Result<Query<FilmQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    match query.film_id()? {
        Some(id) => Ok(get_film(&state, id).await?.into_response()),
        None => Ok(list_films(&state).await?.into_response()),
    }
}

async fn list_films(state: &AppState) -> ApiResult<Json<Vec<FilmSummary>>> {
    let films = Film::list(&state.db).await.map_err(|e| {
        error!(error = %e, "list films failed");
        ApiError::from(e)
    })?;
    debug!(count = films.len(), "films listed");
    Ok(Json(films))
}

async fn get_film(state: &AppState, id: i64) -> ApiResult<Json<FilmDetails>> {
    let film = match Film::find_by_id(&state.db, id).await {
        Ok(Some(f)) => f,
        Ok(None) => {
            warn!(film_id = id, "film not found");
            return Err(ApiError::NotFound("Film not found"));
        }
        Err(e) => {
            error!(error = %e, film_id = id, "find film failed");
            return Err(e.into());
        }
    };

    let rows = Review::list_by_film(&state.db, film.id).await.map_err(|e| {
        error!(error = %e, film_id = id, "list reviews failed");
        ApiError::from(e)
    })?;

    let mut reviews = Vec::with_capacity(rows.len());
    for r in rows {
        let user = User::username_by_id(&state.db, r.user_id)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = r.user_id, "review author lookup failed");
                ApiError::from(e)
            })?
            .ok_or_else(|| {
                error!(review_id = r.id, user_id = r.user_id, "review without author");
                ApiError::Internal("review author missing".into())
            })?;
        reviews.push(ReviewView {
            id: r.id,
            user_id: r.user_id,
            film_id: r.film_id,
            review: r.review,
            user,
        });
    }

    Ok(Json(FilmDetails {
        id: film.id,
        title: film.title,
        director: film.director,
        year: film.year,
        description: film.description,
        reviews,
    }))
}
