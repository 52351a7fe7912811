use axum::{extract::State, routing::post, Router};
use tracing::instrument;

use super::dto::{GenerationCriteria, ImageRequest, ImageResponse, ModifyRequest};
use super::services;
use crate::extract::Json;
use crate::recipes::dto::RecipeDraft;
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/generate/modify", post(modify))
        .route("/generate/image", post(image))
}

#[instrument(skip(state, criteria))]
pub async fn generate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(criteria): Json<GenerationCriteria>,
) -> Result<Json<Vec<RecipeDraft>>, AppError> {
    let drafts = services::generate(
        state.store.as_ref(),
        state.generator.as_ref(),
        user.id,
        criteria,
    )
    .await?;
    Ok(Json(drafts))
}

#[instrument(skip(state, body))]
pub async fn modify(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(body): Json<ModifyRequest>,
) -> Result<Json<RecipeDraft>, AppError> {
    let modified =
        services::modify(state.generator.as_ref(), body.recipe, &body.modification).await?;
    Ok(Json(modified))
}

#[instrument(skip(state, body))]
pub async fn image(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(body): Json<ImageRequest>,
) -> Result<Json<ImageResponse>, AppError> {
    let image_url = services::image(state.generator.as_ref(), &body.prompt).await?;
    Ok(Json(ImageResponse { image_url }))
}
