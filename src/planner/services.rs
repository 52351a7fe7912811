use tracing::info;
use uuid::Uuid;

use super::dto::{MealPlan, TasteProfile};
use super::repo::PlannerRepo;
use crate::error::AppError;

/// Empty when the user never saved one.
pub async fn get_meal_plan<P: PlannerRepo + ?Sized>(
    repo: &P,
    user_id: Uuid,
) -> Result<MealPlan, AppError> {
    Ok(repo.load_meal_plan(user_id).await?)
}

/// Replaces the whole plan.
pub async fn set_meal_plan<P: PlannerRepo + ?Sized>(
    repo: &P,
    user_id: Uuid,
    plan: MealPlan,
) -> Result<MealPlan, AppError> {
    repo.store_meal_plan(user_id, &plan).await?;
    info!(%user_id, recipes = plan.recipe_ids().len(), "meal plan replaced");
    Ok(plan)
}

pub async fn get_taste_profile<P: PlannerRepo + ?Sized>(
    repo: &P,
    user_id: Uuid,
) -> Result<TasteProfile, AppError> {
    Ok(repo.load_taste_profile(user_id).await?)
}

pub async fn set_taste_profile<P: PlannerRepo + ?Sized>(
    repo: &P,
    user_id: Uuid,
    profile: TasteProfile,
) -> Result<TasteProfile, AppError> {
    repo.store_taste_profile(user_id, &profile).await?;
    info!(%user_id, "taste profile replaced");
    Ok(profile)
}
