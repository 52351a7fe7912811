use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::PantryItem;
use crate::store::{PgStore, StoreError};

#[async_trait]
pub trait PantryRepo: Send + Sync {
    async fn list_pantry(&self, user_id: Uuid) -> Result<Vec<PantryItem>, StoreError>;

    /// No uniqueness check here; callers pre-check normalized names.
    async fn insert_pantry_item(&self, user_id: Uuid, name: &str) -> Result<PantryItem, StoreError>;

    async fn delete_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
impl PantryRepo for PgStore {
    async fn list_pantry(&self, user_id: Uuid) -> Result<Vec<PantryItem>, StoreError> {
        let rows = sqlx::query_as::<_, PantryItem>(
            r#"
            SELECT id, name, created_at
              FROM pantry_items
             WHERE user_id = $1
             ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_pantry_item(&self, user_id: Uuid, name: &str) -> Result<PantryItem, StoreError> {
        let item = sqlx::query_as::<_, PantryItem>(
            r#"
            INSERT INTO pantry_items (id, user_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn delete_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM pantry_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
