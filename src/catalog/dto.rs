use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct FilmQuery {
    pub id: Option<String>,
}

impl FilmQuery {
    /// `None` means "list"; an empty `id=` is treated as absent.
    pub fn film_id(&self) -> Result<Option<i64>, ApiError> {
        match self.id.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) if id > 0 => Ok(Some(id)),
                _ => Err(ApiError::BadRequest("Invalid film id".into())),
            },
        }
    }
}

/// Film aggregate: the film plus its reviews.
#[derive(Debug, Serialize)]
pub struct FilmDetails {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i64,
    pub description: String,
    pub reviews: Vec<ReviewView>,
}

#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub id: i64,
    pub user_id: i64,
    pub film_id: i64,
    pub review: String,
    pub user: String, // author's username
}
