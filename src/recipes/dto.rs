use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::shopping::dto::ShoppingListOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeveragePairing {
    pub wine: String,
    pub beer: String,
    #[serde(alias = "nonAlcoholic")]
    pub non_alcoholic: String,
}

/// Recipe content as produced by the generator or carried in a share link.
/// The aliases accept the generator's camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(alias = "recipeName")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "prepTime")]
    pub prep_time: String,
    #[serde(default, alias = "cookTime")]
    pub cook_time: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(default, alias = "nutritionalInfo", skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, alias = "beveragePairing", skip_serializing_if = "Option::is_none")]
    pub beverage_pairing: Option<BeveragePairing>,
}

impl RecipeDraft {
    /// Returns the reason the draft cannot be stored, if any.
    pub fn problem(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            return Some("recipe title is required");
        }
        if self.ingredients.iter().all(|i| i.trim().is_empty()) {
            return Some("recipe needs at least one ingredient");
        }
        None
    }
}

/// Running summary of every review attached to a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateRating {
    pub count: u32,
    /// `None` while `count == 0`, otherwise within `[1, 5]`.
    pub average: Option<f64>,
}

impl AggregateRating {
    pub fn from_columns(count: i32, average: f64) -> Self {
        let count = count.max(0) as u32;
        Self {
            count,
            average: (count > 0).then_some(average),
        }
    }

    /// Aggregate after one more review with `rating`.
    pub fn with_rating(self, rating: u8) -> Self {
        let count = self.count + 1;
        let total = self.average.unwrap_or(0.0) * f64::from(self.count) + f64::from(rating);
        Self {
            count,
            average: Some(total / f64::from(count)),
        }
    }

    /// Column value for `rating_avg`; zero stands in for "no reviews yet".
    pub fn average_column(&self) -> f64 {
        self.average.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beverage_pairing: Option<BeveragePairing>,
    pub rating: AggregateRating,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Recipe {
    pub fn from_draft(id: Uuid, owner_id: Uuid, draft: RecipeDraft, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            owner_id: Some(owner_id),
            title: draft.title,
            description: draft.description,
            prep_time: draft.prep_time,
            cook_time: draft.cook_time,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            nutrition: draft.nutrition,
            beverage_pairing: draft.beverage_pairing,
            rating: AggregateRating::default(),
            created_at,
        }
    }

    /// Content without identity or ratings, as shared between users.
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            prep_time: self.prep_time.clone(),
            cook_time: self.cook_time.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            nutrition: self.nutrition.clone(),
            beverage_pairing: self.beverage_pairing.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently saved first.
    #[default]
    Newest,
    Title,
    TotalTime,
    Rating,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Debug, Serialize)]
pub struct SaveRecipeResponse {
    pub recipe: Recipe,
    pub shopping_list: ShoppingListOutcome,
}

#[derive(Debug, Serialize)]
pub struct ReferenceResponse {
    pub recipe_id: Uuid,
    pub added: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_tracks_running_average() {
        let empty = AggregateRating::default();
        assert_eq!(empty.average, None);

        let one = empty.with_rating(4);
        assert_eq!(one, AggregateRating { count: 1, average: Some(4.0) });

        let two = one.with_rating(5);
        assert_eq!(two.count, 2);
        assert_eq!(two.average, Some(4.5));

        let three = two.with_rating(1);
        assert_eq!(three.count, 3);
        assert!((three.average.unwrap() - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_count_column_means_no_average() {
        assert_eq!(AggregateRating::from_columns(0, 0.0).average, None);
        assert_eq!(AggregateRating::from_columns(2, 4.5).average, Some(4.5));
        assert_eq!(AggregateRating::default().average_column(), 0.0);
    }

    #[test]
    fn draft_accepts_generator_field_names() {
        let raw = r#"{
            "recipeName": "Lemon Pasta",
            "description": "Bright and quick",
            "prepTime": "10 mins",
            "cookTime": "15 mins",
            "ingredients": ["200g spaghetti", "1 lemon, zested"],
            "instructions": ["Boil pasta", "Toss with lemon"],
            "nutritionalInfo": {"calories": "450 kcal", "protein": "12g", "carbs": "70g", "fat": "10g"},
            "beveragePairing": {"wine": "Vermentino", "beer": "Pilsner", "nonAlcoholic": "Lemonade"}
        }"#;
        let draft: RecipeDraft = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.title, "Lemon Pasta");
        assert_eq!(draft.prep_time, "10 mins");
        assert_eq!(draft.beverage_pairing.unwrap().non_alcoholic, "Lemonade");
        assert_eq!(draft.nutrition.unwrap().calories, "450 kcal");
    }

    #[test]
    fn draft_problems() {
        let mut draft = RecipeDraft {
            title: "Soup".into(),
            description: String::new(),
            prep_time: String::new(),
            cook_time: String::new(),
            ingredients: vec!["water".into()],
            instructions: vec![],
            nutrition: None,
            beverage_pairing: None,
        };
        assert_eq!(draft.problem(), None);
        draft.ingredients = vec!["  ".into()];
        assert!(draft.problem().is_some());
        draft.title = " ".into();
        assert_eq!(draft.problem(), Some("recipe title is required"));
    }
}
