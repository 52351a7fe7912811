use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{Review, ReviewAuthor};

#[derive(Debug, FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_photo: Option<String>,
    pub rating: i16,
    pub comment: String,
    pub image_ref: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: r.id,
            recipe_id: r.recipe_id,
            author: ReviewAuthor {
                id: r.author_id,
                display_name: r.author_name,
                photo_ref: r.author_photo,
            },
            rating: r.rating.clamp(1, 5) as u8,
            comment: r.comment,
            image_ref: r.image_ref,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct LedgerRow {
    pub rating_count: i32,
    pub rating_avg: f64,
    pub version: i64,
}
