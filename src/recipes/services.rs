use std::cmp::Ordering;

use tracing::{error, info};
use uuid::Uuid;

use super::dto::{Recipe, RecipeDraft, SaveRecipeResponse, SortOrder};
use super::repo::RecipeRepo;
use crate::auth::Identity;
use crate::error::AppError;
use crate::ingredients::duration_minutes;
use crate::shopping::derive::SourceLabel;
use crate::shopping::dto::ShoppingListOutcome;
use crate::shopping::services::add_missing_ingredients;
use crate::store::Store;

/// Saves a generated recipe for the user, then queues whatever the pantry is
/// missing for it on the shopping list.
///
/// A recipe whose title exactly matches one the user already saved is
/// rejected as a duplicate and nothing is written.
pub async fn save_recipe<S: Store + ?Sized>(
    store: &S,
    user: &Identity,
    draft: RecipeDraft,
) -> Result<SaveRecipeResponse, AppError> {
    if let Some(problem) = draft.problem() {
        return Err(AppError::Validation(problem.into()));
    }

    if store.find_saved_by_title(user.id, &draft.title).await?.is_some() {
        return Err(AppError::Duplicate(format!(
            "\"{}\" is already in your saved recipes",
            draft.title
        )));
    }

    let recipe = store.insert_recipe(user.id, &draft).await?;
    info!(user_id = %user.id, recipe_id = %recipe.id, "recipe saved");

    // The recipe is committed at this point; a failing list update must not
    // turn the save into an error.
    let shopping_list = match add_missing_ingredients(
        store,
        user.id,
        std::slice::from_ref(&recipe),
        SourceLabel::RecipeTitle,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, user_id = %user.id, recipe_id = %recipe.id, "shopping list update failed");
            ShoppingListOutcome::Unavailable
        }
    };

    Ok(SaveRecipeResponse {
        recipe,
        shopping_list,
    })
}

pub async fn list_recipes<S: RecipeRepo + ?Sized>(
    store: &S,
    user_id: Uuid,
    order: SortOrder,
) -> Result<Vec<Recipe>, AppError> {
    let mut recipes = store.list_saved(user_id).await?;
    sort_recipes(&mut recipes, order);
    Ok(recipes)
}

pub async fn get_recipe<S: RecipeRepo + ?Sized>(
    store: &S,
    recipe_id: Uuid,
) -> Result<Recipe, AppError> {
    store
        .get_recipe(recipe_id)
        .await?
        .ok_or(AppError::NotFound("Recipe"))
}

/// Adds an existing canonical recipe (for example one shared by another user)
/// to the user's saved set.
pub async fn add_reference<S: RecipeRepo + ?Sized>(
    store: &S,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<bool, AppError> {
    if store.get_recipe(recipe_id).await?.is_none() {
        return Err(AppError::NotFound("Recipe"));
    }
    let added = store.add_reference(user_id, recipe_id).await?;
    info!(%user_id, %recipe_id, added, "recipe reference saved");
    Ok(added)
}

/// Idempotent: removing a reference that is already gone succeeds.
pub async fn delete_recipe<S: RecipeRepo + ?Sized>(
    store: &S,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<bool, AppError> {
    let removed = store.remove_reference(user_id, recipe_id).await?;
    info!(%user_id, %recipe_id, removed, "recipe reference deleted");
    Ok(removed)
}

/// Stable sort; recipes without a usable key keep their relative order at
/// the end.
pub fn sort_recipes(recipes: &mut [Recipe], order: SortOrder) {
    match order {
        SortOrder::Newest => {}
        SortOrder::Title => {
            recipes.sort_by_cached_key(|r| r.title.to_lowercase());
        }
        SortOrder::TotalTime => {
            recipes.sort_by_cached_key(|r| match total_minutes(r) {
                Some(m) => (0, m),
                None => (1, 0),
            });
        }
        SortOrder::Rating => {
            recipes.sort_by(|a, b| match (a.rating.average, b.rating.average) {
                (Some(x), Some(y)) => y
                    .partial_cmp(&x)
                    .unwrap_or(Ordering::Equal)
                    .then(b.rating.count.cmp(&a.rating.count)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
    }
}

fn total_minutes(recipe: &Recipe) -> Option<u32> {
    match (
        duration_minutes(&recipe.prep_time),
        duration_minutes(&recipe.cook_time),
    ) {
        (None, None) => None,
        (prep, cook) => Some(prep.unwrap_or(0).saturating_add(cook.unwrap_or(0))),
    }
}
