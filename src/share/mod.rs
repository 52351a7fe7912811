//! Self-contained share links: a recipe's content as URL-safe base64 JSON.

pub mod handlers;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

use crate::recipes::dto::RecipeDraft;
use crate::state::AppState;
use axum::Router;

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("share token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("share token does not hold a recipe: {0}")]
    Json(#[from] serde_json::Error),

    #[error("shared recipe is incomplete: {0}")]
    Incomplete(&'static str),
}

pub fn encode(recipe: &RecipeDraft) -> Result<String, ShareError> {
    let bytes = serde_json::to_vec(recipe)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

pub fn decode(token: &str) -> Result<RecipeDraft, ShareError> {
    let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
    let recipe: RecipeDraft = serde_json::from_slice(&bytes)?;
    if let Some(problem) = recipe.problem() {
        return Err(ShareError::Incomplete(problem));
    }
    Ok(recipe)
}

pub fn router() -> Router<AppState> {
    handlers::routes()
}
