use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{Recipe, RecipeDraft};
use super::repo_types::RecipeRow;
use crate::store::{PgStore, StoreError};

/// Canonical recipes plus each user's references to them.
#[async_trait]
pub trait RecipeRepo: Send + Sync {
    /// Id of a recipe the user references whose title matches exactly.
    async fn find_saved_by_title(
        &self,
        user_id: Uuid,
        title: &str,
    ) -> Result<Option<Uuid>, StoreError>;

    /// Creates the canonical recipe and the owner's reference in one unit.
    async fn insert_recipe(&self, owner_id: Uuid, draft: &RecipeDraft)
        -> Result<Recipe, StoreError>;

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, StoreError>;

    /// Recipes the user references, most recently saved first.
    async fn list_saved(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError>;

    /// Returns `false` when the reference already existed.
    async fn add_reference(&self, user_id: Uuid, recipe_id: Uuid) -> Result<bool, StoreError>;

    /// Returns `false` when there was nothing to remove. Canonical content is
    /// dropped together with its last reference.
    async fn remove_reference(&self, user_id: Uuid, recipe_id: Uuid)
        -> Result<bool, StoreError>;
}

const RECIPE_COLUMNS: &str = r#"
    r.id, r.owner_id, r.title, r.description, r.prep_time, r.cook_time,
    r.ingredients, r.instructions, r.nutrition, r.beverage_pairing,
    r.rating_count, r.rating_avg, r.created_at
"#;

#[async_trait]
impl RecipeRepo for PgStore {
    async fn find_saved_by_title(
        &self,
        user_id: Uuid,
        title: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT r.id
              FROM saved_recipes s
              JOIN recipes r ON r.id = s.recipe_id
             WHERE s.user_id = $1 AND r.title = $2
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn insert_recipe(
        &self,
        owner_id: Uuid,
        draft: &RecipeDraft,
    ) -> Result<Recipe, StoreError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO recipes (id, owner_id, title, description, prep_time, cook_time,
                                 ingredients, instructions, nutrition, beverage_pairing, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.prep_time)
        .bind(&draft.cook_time)
        .bind(&draft.ingredients)
        .bind(&draft.instructions)
        .bind(draft.nutrition.as_ref().map(Json))
        .bind(draft.beverage_pairing.as_ref().map(Json))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO saved_recipes (user_id, recipe_id, created_at) VALUES ($1, $2, $3)")
            .bind(owner_id)
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Recipe::from_draft(id, owner_id, draft.clone(), now))
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, StoreError> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"
        ))
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Recipe::from))
    }

    async fn list_saved(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
              FROM saved_recipes s
              JOIN recipes r ON r.id = s.recipe_id
             WHERE s.user_id = $1
             ORDER BY s.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    async fn add_reference(&self, user_id: Uuid, recipe_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            INSERT INTO saved_recipes (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn remove_reference(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed > 0 {
            sqlx::query(
                r#"
                DELETE FROM recipes r
                 WHERE r.id = $1
                   AND NOT EXISTS (SELECT 1 FROM saved_recipes s WHERE s.recipe_id = r.id)
                "#,
            )
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(removed > 0)
    }
}
