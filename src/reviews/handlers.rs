use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{ReviewView, SubmitReviewRequest, SubmittedReview, UploadedImage};
use super::retry::RetryPolicy;
use super::services::{self, NewReview, UploadItem};
use crate::extract::{Json, Path};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/recipes/:id/reviews", get(list_reviews))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/:id/reviews", post(submit_review))
        .route(
            "/recipes/:id/reviews/image",
            post(upload_image).layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewView>>, AppError> {
    let reviews = services::list_reviews(state.store.as_ref(), state.storage.as_ref(), id).await?;
    Ok(Json(reviews))
}

#[instrument(skip(state, body))]
pub async fn submit_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<SubmittedReview>), AppError> {
    let input = NewReview::parse(id, body)?;
    let policy = RetryPolicy::from(&state.config.ledger);
    let submitted =
        services::submit_review(state.store.as_ref(), &policy, id, &user, input).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

/// POST /recipes/:id/reviews/image (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<UploadedImage>), AppError> {
    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "malformed multipart body");
                return Err(AppError::Validation("malformed multipart body".into()));
            }
        };
        if !matches!(field.name(), Some("image") | Some("file")) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().map(str::to_string);
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read image: {e}")))?;

        let image_ref = services::upload_review_image(
            state.store.as_ref(),
            state.storage.as_ref(),
            id,
            user.id,
            UploadItem {
                body,
                content_type: &content_type,
                file_name: file_name.as_deref(),
            },
        )
        .await?;
        return Ok((StatusCode::CREATED, Json(UploadedImage { image_ref })));
    }

    Err(AppError::Validation("image field is required".into()))
}
