use std::time::Duration;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id       INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
        username TEXT,
        password TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS films (
        id          INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
        title       TEXT,
        director    TEXT,
        year        INTEGER,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id      INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
        film_id INTEGER,
        review  TEXT,
        user_id INTEGER,
        FOREIGN KEY(film_id) REFERENCES films(id),
        FOREIGN KEY(user_id) REFERENCES users(id)
    )
    "#,
];

const USERNAME_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS users_username_key ON users (username)";

/// Open (creating if needed) the SQLite file at `path`.
pub async fn connect(path: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let db = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("open database {path}"))?;
    tracing::info!(path, "database opened");
    Ok(db)
}

/// Single-connection in-memory store. The connection is never recycled,
/// otherwise the database would vanish with it.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("open in-memory database")?;
    Ok(db)
}

/// First-boot schema creation. Never drops or alters existing tables.
pub async fn init_schema(db: &SqlitePool) -> anyhow::Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(db)
            .await
            .context("create schema")?;
    }

    // Fails on a database that already holds duplicate usernames; those
    // rows have to be merged by hand before the service will start.
    if let Err(e) = sqlx::query(USERNAME_INDEX).execute(db).await {
        tracing::error!(error = %e, "users.username is not unique; resolve duplicate usernames");
        return Err(e).context("create unique index users_username_key on users(username)");
    }
    tracing::debug!("schema ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let db = connect_in_memory().await.unwrap();
        init_schema(&db).await.unwrap();
        init_schema(&db).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'films', 'reviews') ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap();
        let names: Vec<_> = tables.into_iter().map(|(n,)| n).collect();
        assert_eq!(names, vec!["films", "reviews", "users"]);
    }

    #[tokio::test]
    async fn duplicate_usernames_block_startup() {
        let db = connect_in_memory().await.unwrap();
        sqlx::query(SCHEMA[0]).execute(&db).await.unwrap();
        sqlx::query("INSERT INTO users (username, password) VALUES ('alice', 'a'), ('alice', 'b')")
            .execute(&db)
            .await
            .unwrap();

        let err = init_schema(&db).await.unwrap_err();
        assert!(format!("{err:#}").contains("users(username)"));
    }

    #[tokio::test]
    async fn init_schema_keeps_existing_rows() {
        let db = connect_in_memory().await.unwrap();
        init_schema(&db).await.unwrap();
        sqlx::query("INSERT INTO films (title, director, year, description) VALUES ('A', 'D', 2001, 'x')")
            .execute(&db)
            .await
            .unwrap();

        init_schema(&db).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM films")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
