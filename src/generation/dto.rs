use serde::{Deserialize, Serialize};

use crate::recipes::dto::RecipeDraft;

/// What the user asked for. Blank fields mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationCriteria {
    /// Free text, e.g. "chicken, rice".
    pub ingredients: String,
    pub diet: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_method: Option<String>,
    pub meal_type: Option<String>,
    pub favorite_ingredients: Vec<String>,
    pub favorite_cuisines: Vec<String>,
    pub excluded_ingredients: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModifyRequest {
    pub recipe: RecipeDraft,
    pub modification: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    #[serde(alias = "imageUrl")]
    pub image_url: String,
}
