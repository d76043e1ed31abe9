use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i64,
    pub description: String,
}

/// Row of the film list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FilmSummary {
    pub id: i64,
    pub title: String,
}
