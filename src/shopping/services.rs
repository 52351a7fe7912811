use tracing::{info, warn};
use uuid::Uuid;

use super::derive::{derive, IngredientSource, SourceLabel};
use super::dto::{ShoppingListItem, ShoppingListOutcome};
use super::repo::ShoppingListRepo;
use crate::error::AppError;
use crate::pantry::repo::PantryRepo;
use crate::pantry::services::load_pantry_set;
use crate::planner::repo::PlannerRepo;
use crate::recipes::repo::RecipeRepo;
use crate::store::Store;

/// Queues every ingredient of `recipes` the user's pantry does not cover.
/// Nothing is written when there is nothing to add.
pub async fn add_missing_ingredients<S, R>(
    store: &S,
    user_id: Uuid,
    recipes: &[R],
    label: SourceLabel,
) -> Result<ShoppingListOutcome, AppError>
where
    S: PantryRepo + ShoppingListRepo + ?Sized,
    R: IngredientSource,
{
    if recipes.is_empty() {
        return Ok(ShoppingListOutcome::NoRecipes);
    }

    let pantry = load_pantry_set(store, user_id).await?;
    let items = derive(recipes, &pantry, &label);
    if items.is_empty() {
        return Ok(ShoppingListOutcome::AlreadyStocked);
    }

    let created = store.insert_items(user_id, &items).await?;
    info!(%user_id, count = created.len(), "shopping list items added");
    Ok(ShoppingListOutcome::Added {
        count: created.len(),
    })
}

/// Derives a list over every recipe on the user's meal plan, once per
/// recipe, in day order. Plan entries pointing at recipes that no longer
/// exist are skipped.
pub async fn generate_weekly<S: Store + ?Sized>(
    store: &S,
    user_id: Uuid,
) -> Result<ShoppingListOutcome, AppError> {
    let plan = store.load_meal_plan(user_id).await?;

    let mut recipes = Vec::new();
    for recipe_id in plan.recipe_ids() {
        match store.get_recipe(recipe_id).await? {
            Some(recipe) => recipes.push(recipe),
            None => warn!(%user_id, %recipe_id, "meal plan references a missing recipe"),
        }
    }

    add_missing_ingredients(store, user_id, &recipes, SourceLabel::weekly_plan()).await
}

pub async fn list_items<S: ShoppingListRepo + ?Sized>(
    store: &S,
    user_id: Uuid,
) -> Result<Vec<ShoppingListItem>, AppError> {
    Ok(store.list_items(user_id).await?)
}

pub async fn set_checked<S: ShoppingListRepo + ?Sized>(
    store: &S,
    user_id: Uuid,
    item_id: Uuid,
    checked: bool,
) -> Result<ShoppingListItem, AppError> {
    store
        .set_checked(user_id, item_id, checked)
        .await?
        .ok_or(AppError::NotFound("Shopping list item"))
}

/// Idempotent.
pub async fn delete_item<S: ShoppingListRepo + ?Sized>(
    store: &S,
    user_id: Uuid,
    item_id: Uuid,
) -> Result<bool, AppError> {
    Ok(store.delete_item(user_id, item_id).await?)
}

pub async fn clear_checked<S: ShoppingListRepo + ?Sized>(
    store: &S,
    user_id: Uuid,
) -> Result<u64, AppError> {
    let deleted = store.delete_checked(user_id).await?;
    info!(%user_id, deleted, "checked shopping list items cleared");
    Ok(deleted)
}

pub async fn clear_all<S: ShoppingListRepo + ?Sized>(
    store: &S,
    user_id: Uuid,
) -> Result<u64, AppError> {
    let deleted = store.delete_all(user_id).await?;
    info!(%user_id, deleted, "shopping list cleared");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pantry::services::add_item;
    use crate::planner::dto::{Day, MealPlan, PlannedMeal};
    use crate::recipes::dto::{Recipe, RecipeDraft};
    use crate::shopping::derive::WEEKLY_PLAN_LABEL;
    use crate::store::MemoryStore;

    fn draft(title: &str, ingredients: &[&str]) -> RecipeDraft {
        RecipeDraft {
            title: title.into(),
            description: String::new(),
            prep_time: String::new(),
            cook_time: String::new(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: vec![],
            nutrition: None,
            beverage_pairing: None,
        }
    }

    fn planned(recipe: &Recipe) -> PlannedMeal {
        PlannedMeal {
            recipe_id: recipe.id,
            recipe_title: recipe.title.clone(),
        }
    }

    #[tokio::test]
    async fn reports_no_recipes_and_already_stocked_without_writing() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        let none: [RecipeDraft; 0] = [];
        let outcome = add_missing_ingredients(&store, user, &none, SourceLabel::RecipeTitle)
            .await
            .unwrap();
        assert_eq!(outcome, ShoppingListOutcome::NoRecipes);

        add_item(&store, user, "Salt").await.unwrap();
        let outcome = add_missing_ingredients(
            &store,
            user,
            &[draft("Brine", &["salt, coarse"])],
            SourceLabel::RecipeTitle,
        )
        .await
        .unwrap();
        assert_eq!(outcome, ShoppingListOutcome::AlreadyStocked);
        assert!(list_items(&store, user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn weekly_list_covers_each_planned_recipe_once() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        let bread = store
            .insert_recipe(user, &draft("Bread", &["Flour", "Salt"]))
            .await
            .unwrap();
        let cake = store
            .insert_recipe(user, &draft("Cake", &["flour, sifted", "Pepper"]))
            .await
            .unwrap();

        let mut plan = MealPlan::default();
        plan.set(Day::Monday, planned(&bread));
        plan.set(Day::Tuesday, planned(&cake));
        plan.set(Day::Friday, planned(&bread));
        plan.set(
            Day::Sunday,
            PlannedMeal {
                recipe_id: Uuid::new_v4(),
                recipe_title: "Deleted".into(),
            },
        );
        store.store_meal_plan(user, &plan).await.unwrap();
        add_item(&store, user, "pepper").await.unwrap();

        let outcome = generate_weekly(&store, user).await.unwrap();
        assert_eq!(outcome, ShoppingListOutcome::Added { count: 2 });

        let items = list_items(&store, user).await.unwrap();
        let texts: Vec<_> = items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["Flour", "Salt"]);
        assert!(items.iter().all(|i| i.source == WEEKLY_PLAN_LABEL && !i.checked));
    }

    #[tokio::test]
    async fn weekly_list_with_empty_plan_writes_nothing() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let outcome = generate_weekly(&store, user).await.unwrap();
        assert_eq!(outcome, ShoppingListOutcome::NoRecipes);
    }

    #[tokio::test]
    async fn repeated_generation_appends_again() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let recipes = [draft("Toast", &["Bread"])];

        for _ in 0..2 {
            add_missing_ingredients(&store, user, &recipes, SourceLabel::RecipeTitle)
                .await
                .unwrap();
        }
        assert_eq!(list_items(&store, user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn toggle_and_clear() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        add_missing_ingredients(
            &store,
            user,
            &[draft("Salad", &["Lettuce", "Tomato", "Cucumber"])],
            SourceLabel::RecipeTitle,
        )
        .await
        .unwrap();

        let items = list_items(&store, user).await.unwrap();
        let toggled = set_checked(&store, user, items[1].id, true).await.unwrap();
        assert!(toggled.checked);

        let other_user = Uuid::new_v4();
        assert!(matches!(
            set_checked(&store, other_user, items[0].id, true).await,
            Err(AppError::NotFound(_))
        ));

        assert_eq!(clear_checked(&store, user).await.unwrap(), 1);
        let left: Vec<_> = list_items(&store, user)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.text)
            .collect();
        assert_eq!(left, ["Lettuce", "Cucumber"]);

        assert!(delete_item(&store, user, items[0].id).await.unwrap());
        assert!(!delete_item(&store, user, items[0].id).await.unwrap());
        assert_eq!(clear_all(&store, user).await.unwrap(), 1);
        assert!(list_items(&store, user).await.unwrap().is_empty());
    }
}
