use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::extract::{Json, Path};
use crate::recipes::dto::RecipeDraft;
use crate::recipes::services::get_recipe;
use crate::{auth::AuthUser, error::AppError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareToken {
    pub token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/:id/share", get(share_recipe))
        .route("/share/open", post(open_share))
}

#[instrument(skip(state))]
pub async fn share_recipe(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShareToken>, AppError> {
    let recipe = get_recipe(state.store.as_ref(), id).await?;
    let token = super::encode(&recipe.to_draft()).map_err(|e| {
        error!(error = %e, recipe_id = %id, "share encoding failed");
        AppError::Validation("recipe cannot be shared".into())
    })?;
    Ok(Json(ShareToken { token }))
}

#[instrument(skip(body))]
pub async fn open_share(
    AuthUser(_user): AuthUser,
    Json(body): Json<ShareToken>,
) -> Result<Json<RecipeDraft>, AppError> {
    Ok(Json(super::decode(&body.token)?))
}
