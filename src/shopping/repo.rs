use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::derive::DerivedItem;
use super::dto::ShoppingListItem;
use crate::store::{PgStore, StoreError};

#[async_trait]
pub trait ShoppingListRepo: Send + Sync {
    /// Oldest first.
    async fn list_items(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, StoreError>;

    /// Writes the whole batch or nothing.
    async fn insert_items(
        &self,
        user_id: Uuid,
        items: &[DerivedItem],
    ) -> Result<Vec<ShoppingListItem>, StoreError>;

    async fn set_checked(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        checked: bool,
    ) -> Result<Option<ShoppingListItem>, StoreError>;

    async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool, StoreError>;

    async fn delete_checked(&self, user_id: Uuid) -> Result<u64, StoreError>;

    async fn delete_all(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

#[async_trait]
impl ShoppingListRepo for PgStore {
    async fn list_items(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, StoreError> {
        let rows = sqlx::query_as::<_, ShoppingListItem>(
            r#"
            SELECT id, text, source, checked, created_at
              FROM shopping_list_items
             WHERE user_id = $1
             ORDER BY seq ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_items(
        &self,
        user_id: Uuid,
        items: &[DerivedItem],
    ) -> Result<Vec<ShoppingListItem>, StoreError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let now = OffsetDateTime::now_utc();
        let mut created = Vec::with_capacity(items.len());
        let mut tx = self.pool.begin().await?;
        for item in items {
            let row = sqlx::query_as::<_, ShoppingListItem>(
                r#"
                INSERT INTO shopping_list_items (id, user_id, text, source, checked, created_at)
                VALUES ($1, $2, $3, $4, FALSE, $5)
                RETURNING id, text, source, checked, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&item.text)
            .bind(&item.source)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn set_checked(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        checked: bool,
    ) -> Result<Option<ShoppingListItem>, StoreError> {
        let row = sqlx::query_as::<_, ShoppingListItem>(
            r#"
            UPDATE shopping_list_items
               SET checked = $3
             WHERE id = $1 AND user_id = $2
            RETURNING id, text, source, checked, created_at
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .bind(checked)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM shopping_list_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_checked(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM shopping_list_items WHERE user_id = $1 AND checked")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn delete_all(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM shopping_list_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
