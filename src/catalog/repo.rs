use anyhow::Context;
use sqlx::SqlitePool;

use crate::catalog::repo_types::{Film, FilmSummary};

impl Film {
    /// All films, in storage order.
    pub async fn list(db: &SqlitePool) -> anyhow::Result<Vec<FilmSummary>> {
        let rows = sqlx::query_as::<_, FilmSummary>("SELECT id, title FROM films")
            .fetch_all(db)
            .await
            .context("list films")?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<Film>> {
        let film = sqlx::query_as::<_, Film>(
            r#"
            SELECT id, title, director, year, description
              FROM films
             WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("select film by id")?;
        Ok(film)
    }

    pub async fn exists(db: &SqlitePool, id: i64) -> anyhow::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM films WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("probe film by id")?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    async fn insert_film(db: &SqlitePool, title: &str) -> i64 {
        sqlx::query("INSERT INTO films (title, director, year, description) VALUES (?, 'D', 2001, 'x')")
            .bind(title)
            .execute(db)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn list_is_empty_without_films() {
        let state = AppState::fake().await;
        assert!(Film::list(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_and_lookup() {
        let state = AppState::fake().await;
        let a = insert_film(&state.db, "A").await;
        let b = insert_film(&state.db, "B").await;

        let titles: Vec<_> = Film::list(&state.db)
            .await
            .unwrap()
            .into_iter()
            .map(|f| (f.id, f.title))
            .collect();
        assert_eq!(titles, vec![(a, "A".to_string()), (b, "B".to_string())]);

        let film = Film::find_by_id(&state.db, a).await.unwrap().unwrap();
        assert_eq!(film.director, "D");
        assert_eq!(film.year, 2001);

        assert!(Film::exists(&state.db, b).await.unwrap());
        assert!(!Film::exists(&state.db, 9999).await.unwrap());
        assert!(Film::find_by_id(&state.db, 9999).await.unwrap().is_none());
    }
}
