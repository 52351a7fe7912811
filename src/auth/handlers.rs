use axum::{routing::get, Router};
use tracing::instrument;

use super::{AuthUser, Identity};
use crate::extract::Json;
use crate::state::AppState;

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<Identity> {
    Json(user)
}
