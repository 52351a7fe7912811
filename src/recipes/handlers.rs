use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{ListQuery, Recipe, RecipeDraft, ReferenceResponse, SaveRecipeResponse};
use super::services;
use crate::extract::{Json, Path, Query};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(save_recipe))
        .route("/recipes/:id", axum::routing::delete(delete_recipe))
        .route("/recipes/:id/reference", post(add_reference))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let recipes = services::list_recipes(state.store.as_ref(), user.id, q.sort).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = services::get_recipe(state.store.as_ref(), id).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state, draft))]
pub async fn save_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(draft): Json<RecipeDraft>,
) -> Result<(StatusCode, Json<SaveRecipeResponse>), AppError> {
    let saved = services::save_recipe(state.store.as_ref(), &user, draft).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state))]
pub async fn add_reference(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse>, AppError> {
    let added = services::add_reference(state.store.as_ref(), user.id, id).await?;
    Ok(Json(ReferenceResponse {
        recipe_id: id,
        added,
    }))
}

/// Always 204; a second delete of the same reference is a no-op.
#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_recipe(state.store.as_ref(), user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
