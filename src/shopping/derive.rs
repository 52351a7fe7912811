//! Missing-ingredient derivation.
//!
//! Given recipes and a pantry, produce at most one line per normalized
//! ingredient key, skipping anything the pantry already covers. The result
//! keeps the first occurrence's original wording and input order. It is not
//! checked against what an existing shopping list already holds, so running
//! it twice queues the same lines twice.

use std::collections::HashSet;

use serde::Serialize;

use crate::ingredients::normalize;
use crate::pantry::services::PantrySet;
use crate::recipes::dto::{Recipe, RecipeDraft};

/// Provenance used when a derivation spans a whole meal plan.
pub const WEEKLY_PLAN_LABEL: &str = "Weekly Meal Plan";

pub trait IngredientSource {
    fn title(&self) -> &str;
    fn ingredients(&self) -> &[String];
}

impl IngredientSource for Recipe {
    fn title(&self) -> &str {
        &self.title
    }
    fn ingredients(&self) -> &[String] {
        &self.ingredients
    }
}

impl IngredientSource for RecipeDraft {
    fn title(&self) -> &str {
        &self.title
    }
    fn ingredients(&self) -> &[String] {
        &self.ingredients
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLabel {
    /// Each line is attributed to the recipe it came from.
    RecipeTitle,
    /// Every line carries the same label.
    Fixed(&'static str),
}

impl SourceLabel {
    pub fn weekly_plan() -> Self {
        SourceLabel::Fixed(WEEKLY_PLAN_LABEL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedItem {
    pub text: String,
    pub source: String,
}

pub fn derive<R: IngredientSource>(
    recipes: &[R],
    pantry: &PantrySet,
    label: &SourceLabel,
) -> Vec<DerivedItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for recipe in recipes {
        for line in recipe.ingredients() {
            let key = normalize(line);
            if key.is_empty() || pantry.contains(&key) || !seen.insert(key) {
                continue;
            }
            let source = match label {
                SourceLabel::RecipeTitle => recipe.title().to_string(),
                SourceLabel::Fixed(l) => (*l).to_string(),
            };
            out.push(DerivedItem {
                text: line.clone(),
                source,
            });
        }
    }
    out
}
