use tracing::{info, warn};
use uuid::Uuid;

use super::client::RecipeGenerator;
use super::dto::GenerationCriteria;
use crate::error::AppError;
use crate::planner::dto::TasteProfile;
use crate::planner::repo::PlannerRepo;
use crate::recipes::dto::RecipeDraft;

/// Folds the stored taste profile into a request. Explicit criteria win;
/// list preferences are merged without duplicates.
pub fn apply_taste_profile(mut criteria: GenerationCriteria, profile: &TasteProfile) -> GenerationCriteria {
    let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
    if blank(&criteria.diet) {
        criteria.diet = profile
            .dietary_preference
            .clone()
            .filter(|d| !d.trim().is_empty());
    }

    merge(&mut criteria.favorite_ingredients, &profile.favorite_ingredients);
    merge(&mut criteria.favorite_cuisines, &profile.favorite_cuisines);
    merge(&mut criteria.excluded_ingredients, &profile.excluded_ingredients);
    criteria
}

fn merge(into: &mut Vec<String>, from: &[String]) {
    for item in from {
        if !item.trim().is_empty() && !into.iter().any(|i| i.eq_ignore_ascii_case(item)) {
            into.push(item.clone());
        }
    }
}

/// Generates recipe suggestions, dropping any the service returns without a
/// title or ingredients.
pub async fn generate<P: PlannerRepo + ?Sized>(
    planner: &P,
    generator: &dyn RecipeGenerator,
    user_id: Uuid,
    criteria: GenerationCriteria,
) -> Result<Vec<RecipeDraft>, AppError> {
    let profile = planner.load_taste_profile(user_id).await?;
    let criteria = apply_taste_profile(criteria, &profile);

    let drafts = generator.generate(&criteria).await?;
    let total = drafts.len();
    let usable: Vec<RecipeDraft> = drafts
        .into_iter()
        .filter(|d| match d.problem() {
            Some(problem) => {
                warn!(title = %d.title, problem, "discarding generated recipe");
                false
            }
            None => true,
        })
        .collect();

    info!(%user_id, returned = total, kept = usable.len(), "recipes generated");
    Ok(usable)
}

pub async fn modify(
    generator: &dyn RecipeGenerator,
    recipe: RecipeDraft,
    modification: &str,
) -> Result<RecipeDraft, AppError> {
    let modification = modification.trim();
    if modification.is_empty() {
        return Err(AppError::Validation("Recipe and modification are required.".into()));
    }
    if let Some(problem) = recipe.problem() {
        return Err(AppError::Validation(problem.into()));
    }

    let modified = generator.modify(&recipe, modification).await?;
    if let Some(problem) = modified.problem() {
        return Err(AppError::Upstream(
            super::client::GenerationError::Parse(problem.into()),
        ));
    }
    Ok(modified)
}

pub async fn image(generator: &dyn RecipeGenerator, prompt: &str) -> Result<String, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("Prompt is required.".into()));
    }
    Ok(generator.image(prompt).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::client::GenerationError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn draft(title: &str, ingredients: &[&str]) -> RecipeDraft {
        RecipeDraft {
            title: title.into(),
            description: String::new(),
            prep_time: "5 mins".into(),
            cook_time: "5 mins".into(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: vec!["Mix".into()],
            nutrition: None,
            beverage_pairing: None,
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Option<GenerationCriteria>>,
    }

    #[async_trait]
    impl RecipeGenerator for Recording {
        async fn generate(
            &self,
            criteria: &GenerationCriteria,
        ) -> Result<Vec<RecipeDraft>, GenerationError> {
            *self.seen.lock().unwrap() = Some(criteria.clone());
            Ok(vec![draft("Good", &["egg"]), draft("", &["egg"]), draft("No food", &[])])
        }

        async fn modify(
            &self,
            recipe: &RecipeDraft,
            instruction: &str,
        ) -> Result<RecipeDraft, GenerationError> {
            let mut out = recipe.clone();
            out.title = format!("{} ({instruction})", recipe.title);
            Ok(out)
        }

        async fn image(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Overloaded)
        }
    }

    #[test]
    fn profile_fills_gaps_without_overriding() {
        let profile = TasteProfile {
            favorite_ingredients: vec!["Garlic".into(), "basil".into()],
            favorite_cuisines: vec!["Italian".into()],
            dietary_preference: Some("vegetarian".into()),
            excluded_ingredients: vec!["peanuts".into()],
        };

        let merged = apply_taste_profile(
            GenerationCriteria {
                favorite_ingredients: vec!["garlic".into()],
                ..Default::default()
            },
            &profile,
        );
        assert_eq!(merged.diet.as_deref(), Some("vegetarian"));
        assert_eq!(merged.favorite_ingredients, ["garlic", "basil"]);
        assert_eq!(merged.favorite_cuisines, ["Italian"]);
        assert_eq!(merged.excluded_ingredients, ["peanuts"]);

        let explicit = apply_taste_profile(
            GenerationCriteria {
                diet: Some("vegan".into()),
                ..Default::default()
            },
            &profile,
        );
        assert_eq!(explicit.diet.as_deref(), Some("vegan"));
    }

    #[tokio::test]
    async fn generate_applies_profile_and_drops_unusable_drafts() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        crate::planner::services::set_taste_profile(
            &store,
            user,
            TasteProfile {
                dietary_preference: Some("keto".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let generator = Recording::default();
        let drafts = generate(&store, &generator, user, GenerationCriteria::default())
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Good");

        let seen = generator.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.diet.as_deref(), Some("keto"));
    }

    #[tokio::test]
    async fn modify_and_image_require_input() {
        let generator = Recording::default();
        let err = modify(&generator, draft("Soup", &["water"]), "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let out = modify(&generator, draft("Soup", &["water"]), " make it spicy ").await.unwrap();
        assert_eq!(out.title, "Soup (make it spicy)");

        assert!(matches!(image(&generator, "").await, Err(AppError::Validation(_))));
        assert!(matches!(
            image(&generator, "a bowl of soup").await,
            Err(AppError::Upstream(GenerationError::Overloaded))
        ));
    }
}
