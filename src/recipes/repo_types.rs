use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{AggregateRating, BeveragePairing, Nutrition, Recipe};

#[derive(Debug, FromRow)]
pub struct RecipeRow {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub nutrition: Option<Json<Nutrition>>,
    pub beverage_pairing: Option<Json<BeveragePairing>>,
    pub rating_count: i32,
    pub rating_avg: f64,
    pub created_at: OffsetDateTime,
}

impl From<RecipeRow> for Recipe {
    fn from(r: RecipeRow) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            title: r.title,
            description: r.description,
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            ingredients: r.ingredients,
            instructions: r.instructions,
            nutrition: r.nutrition.map(|j| j.0),
            beverage_pairing: r.beverage_pairing.map(|j| j.0),
            rating: AggregateRating::from_columns(r.rating_count, r.rating_avg),
            created_at: r.created_at,
        }
    }
}
