use anyhow::Context;
use sqlx::SqlitePool;

use crate::auth::repo_types::User;

impl User {
    /// Number of accounts registered under `username` (0 or 1).
    pub async fn count_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(db)
            .await
            .context("count users by username")?;
        Ok(count)
    }

    /// Insert a new account. Returns `None` when the username is already taken.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<i64>> {
        let res = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(db)
            .await;

        match res {
            Ok(done) => Ok(Some(done.last_insert_rowid())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e).context("insert user"),
        }
    }

    pub async fn id_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(db)
            .await
            .context("select id by username")?;
        Ok(row.map(|(id,)| id))
    }

    pub async fn username_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("select username by id")?;
        Ok(row.map(|(u,)| u))
    }

    /// Login lookup; carries the stored password hash.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
        .context("find user by username")?;
        Ok(user)
    }
}
