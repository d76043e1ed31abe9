use anyhow::Context;
use sqlx::SqlitePool;

use crate::reviews::repo_types::Review;

impl Review {
    pub async fn list_by_film(db: &SqlitePool, film_id: i64) -> anyhow::Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, review, film_id, user_id
              FROM reviews
             WHERE film_id = ?
             ORDER BY id
            "#,
        )
        .bind(film_id)
        .fetch_all(db)
        .await
        .context("list reviews by film")?;
        Ok(rows)
    }

    pub async fn create(
        db: &SqlitePool,
        film_id: i64,
        review: &str,
        user_id: i64,
    ) -> anyhow::Result<i64> {
        let done = sqlx::query("INSERT INTO reviews (film_id, review, user_id) VALUES (?, ?, ?)")
            .bind(film_id)
            .bind(review)
            .bind(user_id)
            .execute(db)
            .await
            .context("insert review")?;
        Ok(done.last_insert_rowid())
    }

    /// Rewrites the body of a review owned by `user_id`. Returns rows affected.
    pub async fn update_owned(
        db: &SqlitePool,
        id: i64,
        user_id: i64,
        review: &str,
    ) -> anyhow::Result<u64> {
        let done = sqlx::query("UPDATE reviews SET review = ? WHERE id = ? AND user_id = ?")
            .bind(review)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("update review")?;
        Ok(done.rows_affected())
    }

    /// Deletes a review owned by `user_id`. Returns rows affected.
    pub async fn delete_owned(db: &SqlitePool, id: i64, user_id: i64) -> anyhow::Result<u64> {
        let done = sqlx::query("DELETE FROM reviews WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete review")?;
        Ok(done.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo_types::User, state::AppState};

    async fn seed(state: &AppState) -> (i64, i64, i64) {
        let film: (i64,) = sqlx::query_as(
            "INSERT INTO films (title, director, year, description) VALUES ('A', 'D', 2001, 'x') RETURNING id",
        )
        .fetch_one(&state.db)
        .await
        .unwrap();
        let alice = User::create(&state.db, "alice", "h").await.unwrap().unwrap();
        let bob = User::create(&state.db, "bob", "h").await.unwrap().unwrap();
        (film.0, alice, bob)
    }

    #[tokio::test]
    async fn update_and_delete_are_scoped_to_author() {
        let state = AppState::fake().await;
        let (film, alice, bob) = seed(&state).await;
        let id = Review::create(&state.db, film, "great", alice).await.unwrap();

        assert_eq!(Review::update_owned(&state.db, id, bob, "hijacked").await.unwrap(), 0);
        assert_eq!(Review::delete_owned(&state.db, id, bob).await.unwrap(), 0);

        let rows = Review::list_by_film(&state.db, film).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].review, "great");
        assert_eq!(rows[0].user_id, alice);

        assert_eq!(Review::update_owned(&state.db, id, alice, "ok").await.unwrap(), 1);
        assert_eq!(Review::list_by_film(&state.db, film).await.unwrap()[0].review, "ok");

        assert_eq!(Review::delete_owned(&state.db, id, alice).await.unwrap(), 1);
        assert!(Review::list_by_film(&state.db, film).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_review_affects_nothing() {
        let state = AppState::fake().await;
        let (_, alice, _) = seed(&state).await;
        assert_eq!(Review::update_owned(&state.db, 42, alice, "x").await.unwrap(), 0);
        assert_eq!(Review::delete_owned(&state.db, 42, alice).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reviews_are_listed_per_film() {
        let state = AppState::fake().await;
        let (film, alice, bob) = seed(&state).await;
        Review::create(&state.db, film, "one", alice).await.unwrap();
        Review::create(&state.db, film, "two", bob).await.unwrap();

        let rows = Review::list_by_film(&state.db, film).await.unwrap();
        let bodies: Vec<_> = rows.iter().map(|r| r.review.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two"]);
        assert!(Review::list_by_film(&state.db, film + 1).await.unwrap().is_empty());
    }
}
