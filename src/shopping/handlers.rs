use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{ClearedResponse, ShoppingListItem, ShoppingListOutcome, UpdateItemRequest};
use super::services;
use crate::extract::{Json, Path};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shopping-list", get(list_items).delete(clear_all))
        .route("/shopping-list/:id", patch(update_item).delete(delete_item))
        .route("/shopping-list/clear-checked", post(clear_checked))
        .route("/shopping-list/weekly", post(generate_weekly))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ShoppingListItem>>, AppError> {
    Ok(Json(services::list_items(state.store.as_ref(), user.id).await?))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<ShoppingListItem>, AppError> {
    let item = services::set_checked(state.store.as_ref(), user.id, id, body.checked).await?;
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_item(state.store.as_ref(), user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn clear_checked(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ClearedResponse>, AppError> {
    let deleted_count = services::clear_checked(state.store.as_ref(), user.id).await?;
    Ok(Json(ClearedResponse { deleted_count }))
}

#[instrument(skip(state))]
pub async fn clear_all(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ClearedResponse>, AppError> {
    let deleted_count = services::clear_all(state.store.as_ref(), user.id).await?;
    Ok(Json(ClearedResponse { deleted_count }))
}

#[instrument(skip(state))]
pub async fn generate_weekly(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ShoppingListOutcome>, AppError> {
    Ok(Json(services::generate_weekly(state.store.as_ref(), user.id).await?))
}
