use axum::{extract::State, routing::get, Router};
use tracing::instrument;

use super::dto::{MealPlan, TasteProfile};
use super::services;
use crate::extract::Json;
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plan", get(get_meal_plan).put(put_meal_plan))
        .route("/taste-profile", get(get_taste_profile).put(put_taste_profile))
}

#[instrument(skip(state))]
pub async fn get_meal_plan(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MealPlan>, AppError> {
    Ok(Json(services::get_meal_plan(state.store.as_ref(), user.id).await?))
}

#[instrument(skip(state, plan))]
pub async fn put_meal_plan(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(plan): Json<MealPlan>,
) -> Result<Json<MealPlan>, AppError> {
    Ok(Json(services::set_meal_plan(state.store.as_ref(), user.id, plan).await?))
}

#[instrument(skip(state))]
pub async fn get_taste_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TasteProfile>, AppError> {
    Ok(Json(services::get_taste_profile(state.store.as_ref(), user.id).await?))
}

#[instrument(skip(state, profile))]
pub async fn put_taste_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(profile): Json<TasteProfile>,
) -> Result<Json<TasteProfile>, AppError> {
    Ok(Json(
        services::set_taste_profile(state.store.as_ref(), user.id, profile).await?,
    ))
}
