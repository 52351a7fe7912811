use async_trait::async_trait;
use uuid::Uuid;

use super::dto::Review;
use super::repo_types::{LedgerRow, ReviewRow};
use crate::recipes::dto::AggregateRating;
use crate::store::{PgStore, StoreError};

/// Aggregate as read at the start of a submission, tagged with the version
/// the commit must still find.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerSnapshot {
    pub rating: AggregateRating,
    pub version: i64,
}

/// Append-only review log plus the per-recipe aggregate it maintains.
#[async_trait]
pub trait ReviewLedgerRepo: Send + Sync {
    /// `None` when the recipe does not exist.
    async fn load_snapshot(&self, recipe_id: Uuid) -> Result<Option<LedgerSnapshot>, StoreError>;

    /// Appends `review` and replaces the aggregate with `next` as a single
    /// unit, provided the recipe is still at `expected_version`. Otherwise
    /// nothing is written and [`StoreError::Conflict`] is returned.
    async fn commit_review(
        &self,
        review: &Review,
        expected_version: i64,
        next: AggregateRating,
    ) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_reviews(&self, recipe_id: Uuid) -> Result<Vec<Review>, StoreError>;
}

#[async_trait]
impl ReviewLedgerRepo for PgStore {
    async fn load_snapshot(&self, recipe_id: Uuid) -> Result<Option<LedgerSnapshot>, StoreError> {
        let row = sqlx::query_as::<_, LedgerRow>(
            "SELECT rating_count, rating_avg, version FROM recipes WHERE id = $1",
        )
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| LedgerSnapshot {
            rating: AggregateRating::from_columns(r.rating_count, r.rating_avg),
            version: r.version,
        }))
    }

    async fn commit_review(
        &self,
        review: &Review,
        expected_version: i64,
        next: AggregateRating,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE recipes
               SET rating_count = $2, rating_avg = $3, version = version + 1
             WHERE id = $1 AND version = $4
            "#,
        )
        .bind(review.recipe_id)
        .bind(next.count as i32)
        .bind(next.average_column())
        .bind(expected_version)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Err(StoreError::Conflict);
        }

        sqlx::query(
            r#"
            INSERT INTO reviews (id, recipe_id, author_id, author_name, author_photo,
                                 rating, comment, image_ref, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(review.id)
        .bind(review.recipe_id)
        .bind(review.author.id)
        .bind(&review.author.display_name)
        .bind(&review.author.photo_ref)
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .bind(&review.image_ref)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_reviews(&self, recipe_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, recipe_id, author_id, author_name, author_photo,
                   rating, comment, image_ref, created_at
              FROM reviews
             WHERE recipe_id = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }
}
