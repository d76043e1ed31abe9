use serde::Serialize;
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
}
