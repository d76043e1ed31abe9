use sqlx::FromRow;

/// Review record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: i64,
    pub review: String,
    pub film_id: i64,
    pub user_id: i64, // author, fixed at creation
}
