use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{AddPantryItemRequest, PantryItem};
use super::services;
use crate::extract::{Json, Path};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pantry", get(list_pantry).post(add_pantry_item))
        .route("/pantry/:id", delete(remove_pantry_item))
}

#[instrument(skip(state))]
pub async fn list_pantry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<PantryItem>>, AppError> {
    Ok(Json(services::list_items(state.store.as_ref(), user.id).await?))
}

#[instrument(skip(state, body))]
pub async fn add_pantry_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<AddPantryItemRequest>,
) -> Result<(StatusCode, Json<PantryItem>), AppError> {
    let item = services::add_item(state.store.as_ref(), user.id, &body.name).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state))]
pub async fn remove_pantry_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::remove_item(state.store.as_ref(), user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
