use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::dto::AggregateRating;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub id: Uuid,
    pub display_name: String,
    pub photo_ref: Option<String>,
}

/// A committed review. Reviews are never edited or retracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub author: ReviewAuthor,
    pub rating: u8,
    pub comment: String,
    pub image_ref: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    /// Kept wide so out-of-range values reach validation instead of failing
    /// deserialization.
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: String,
    pub image_ref: Option<String>,
}

/// The new review plus the authoritative aggregate it produced. Clients
/// replace any locally projected rating with this value.
#[derive(Debug, Serialize)]
pub struct SubmittedReview {
    pub review: Review,
    pub rating: AggregateRating,
}

#[derive(Debug, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub image_ref: String,
}
