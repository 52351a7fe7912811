use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{MealPlan, TasteProfile};
use crate::store::{PgStore, StoreError};

/// Per-user documents replaced wholesale; last write wins.
#[async_trait]
pub trait PlannerRepo: Send + Sync {
    async fn load_meal_plan(&self, user_id: Uuid) -> Result<MealPlan, StoreError>;
    async fn store_meal_plan(&self, user_id: Uuid, plan: &MealPlan) -> Result<(), StoreError>;
    async fn load_taste_profile(&self, user_id: Uuid) -> Result<TasteProfile, StoreError>;
    async fn store_taste_profile(
        &self,
        user_id: Uuid,
        profile: &TasteProfile,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl PlannerRepo for PgStore {
    async fn load_meal_plan(&self, user_id: Uuid) -> Result<MealPlan, StoreError> {
        let plan = sqlx::query_scalar::<_, Json<MealPlan>>(
            "SELECT plan FROM meal_plans WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan.map(|Json(p)| p).unwrap_or_default())
    }

    async fn store_meal_plan(&self, user_id: Uuid, plan: &MealPlan) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO meal_plans (user_id, plan, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
               SET plan = EXCLUDED.plan,
                   updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(plan))
        .bind(OffsetDateTime::now_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_taste_profile(&self, user_id: Uuid) -> Result<TasteProfile, StoreError> {
        let profile = sqlx::query_scalar::<_, Json<TasteProfile>>(
            "SELECT profile FROM taste_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile.map(|Json(p)| p).unwrap_or_default())
    }

    async fn store_taste_profile(
        &self,
        user_id: Uuid,
        profile: &TasteProfile,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO taste_profiles (user_id, profile, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
               SET profile = EXCLUDED.profile,
                   updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(profile))
        .bind(OffsetDateTime::now_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
