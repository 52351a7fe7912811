//! In-process store used when no `DATABASE_URL` is configured and by tests.
//! One lock guards everything, so each trait method is atomic the way a
//! single SQL transaction is.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::StoreError;
use crate::pantry::dto::PantryItem;
use crate::pantry::repo::PantryRepo;
use crate::planner::dto::{MealPlan, TasteProfile};
use crate::planner::repo::PlannerRepo;
use crate::recipes::dto::{AggregateRating, Recipe, RecipeDraft};
use crate::recipes::repo::RecipeRepo;
use crate::reviews::dto::Review;
use crate::reviews::repo::{LedgerSnapshot, ReviewLedgerRepo};
use crate::shopping::derive::DerivedItem;
use crate::shopping::dto::ShoppingListItem;
use crate::shopping::repo::ShoppingListRepo;

struct StoredRecipe {
    recipe: Recipe,
    version: i64,
}

#[derive(Default)]
struct Inner {
    recipes: HashMap<Uuid, StoredRecipe>,
    /// Per user, oldest reference first.
    saved: HashMap<Uuid, Vec<Uuid>>,
    /// Per recipe, in commit order.
    reviews: HashMap<Uuid, Vec<Review>>,
    pantry: HashMap<Uuid, Vec<PantryItem>>,
    shopping: HashMap<Uuid, Vec<ShoppingListItem>>,
    meal_plans: HashMap<Uuid, MealPlan>,
    taste_profiles: HashMap<Uuid, TasteProfile>,
}

impl Inner {
    fn is_referenced(&self, recipe_id: Uuid) -> bool {
        self.saved.values().any(|ids| ids.contains(&recipe_id))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeRepo for MemoryStore {
    async fn find_saved_by_title(
        &self,
        user_id: Uuid,
        title: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        let inner = self.inner.read().await;
        let found = inner
            .saved
            .get(&user_id)
            .into_iter()
            .flatten()
            .copied()
            .find(|id| {
                inner
                    .recipes
                    .get(id)
                    .is_some_and(|s| s.recipe.title == title)
            });
        Ok(found)
    }

    async fn insert_recipe(
        &self,
        owner_id: Uuid,
        draft: &RecipeDraft,
    ) -> Result<Recipe, StoreError> {
        let recipe = Recipe::from_draft(
            Uuid::new_v4(),
            owner_id,
            draft.clone(),
            OffsetDateTime::now_utc(),
        );

        let mut inner = self.inner.write().await;
        inner.recipes.insert(
            recipe.id,
            StoredRecipe {
                recipe: recipe.clone(),
                version: 0,
            },
        );
        inner.saved.entry(owner_id).or_default().push(recipe.id);
        Ok(recipe)
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.recipes.get(&recipe_id).map(|s| s.recipe.clone()))
    }

    async fn list_saved(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError> {
        let inner = self.inner.read().await;
        let recipes = inner
            .saved
            .get(&user_id)
            .into_iter()
            .flatten()
            .rev()
            .filter_map(|id| inner.recipes.get(id).map(|s| s.recipe.clone()))
            .collect();
        Ok(recipes)
    }

    async fn add_reference(&self, user_id: Uuid, recipe_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.recipes.contains_key(&recipe_id) {
            return Ok(false);
        }
        let ids = inner.saved.entry(user_id).or_default();
        if ids.contains(&recipe_id) {
            return Ok(false);
        }
        ids.push(recipe_id);
        Ok(true)
    }

    async fn remove_reference(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(ids) = inner.saved.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = ids.len();
        ids.retain(|id| *id != recipe_id);
        if ids.len() == before {
            return Ok(false);
        }

        if !inner.is_referenced(recipe_id) {
            inner.recipes.remove(&recipe_id);
            inner.reviews.remove(&recipe_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl ReviewLedgerRepo for MemoryStore {
    async fn load_snapshot(&self, recipe_id: Uuid) -> Result<Option<LedgerSnapshot>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.recipes.get(&recipe_id).map(|s| LedgerSnapshot {
            rating: s.recipe.rating,
            version: s.version,
        }))
    }

    async fn commit_review(
        &self,
        review: &Review,
        expected_version: i64,
        next: AggregateRating,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        // A recipe deleted mid-submission looks like any other lost race.
        let Some(stored) = inner.recipes.get_mut(&review.recipe_id) else {
            return Err(StoreError::Conflict);
        };
        if stored.version != expected_version {
            return Err(StoreError::Conflict);
        }
        stored.recipe.rating = next;
        stored.version += 1;
        inner
            .reviews
            .entry(review.recipe_id)
            .or_default()
            .push(review.clone());
        Ok(())
    }

    async fn list_reviews(&self, recipe_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let inner = self.inner.read().await;
        let mut reviews = inner.reviews.get(&recipe_id).cloned().unwrap_or_default();
        reviews.reverse();
        Ok(reviews)
    }
}

#[async_trait]
impl PantryRepo for MemoryStore {
    async fn list_pantry(&self, user_id: Uuid) -> Result<Vec<PantryItem>, StoreError> {
        let inner = self.inner.read().await;
        let mut items = inner.pantry.get(&user_id).cloned().unwrap_or_default();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn insert_pantry_item(&self, user_id: Uuid, name: &str) -> Result<PantryItem, StoreError> {
        let item = PantryItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        let mut inner = self.inner.write().await;
        inner.pantry.entry(user_id).or_default().push(item.clone());
        Ok(item)
    }

    async fn delete_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(items) = inner.pantry.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = items.len();
        items.retain(|i| i.id != item_id);
        Ok(items.len() != before)
    }
}

#[async_trait]
impl ShoppingListRepo for MemoryStore {
    async fn list_items(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.shopping.get(&user_id).cloned().unwrap_or_default())
    }

    async fn insert_items(
        &self,
        user_id: Uuid,
        items: &[DerivedItem],
    ) -> Result<Vec<ShoppingListItem>, StoreError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let now = OffsetDateTime::now_utc();
        let created: Vec<ShoppingListItem> = items
            .iter()
            .map(|item| ShoppingListItem {
                id: Uuid::new_v4(),
                text: item.text.clone(),
                source: item.source.clone(),
                checked: false,
                created_at: now,
            })
            .collect();

        let mut inner = self.inner.write().await;
        inner
            .shopping
            .entry(user_id)
            .or_default()
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn set_checked(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        checked: bool,
    ) -> Result<Option<ShoppingListItem>, StoreError> {
        let mut inner = self.inner.write().await;
        let item = inner
            .shopping
            .get_mut(&user_id)
            .and_then(|items| items.iter_mut().find(|i| i.id == item_id));
        Ok(item.map(|i| {
            i.checked = checked;
            i.clone()
        }))
    }

    async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(items) = inner.shopping.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = items.len();
        items.retain(|i| i.id != item_id);
        Ok(items.len() != before)
    }

    async fn delete_checked(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(items) = inner.shopping.get_mut(&user_id) else {
            return Ok(0);
        };
        let before = items.len();
        items.retain(|i| !i.checked);
        Ok((before - items.len()) as u64)
    }

    async fn delete_all(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .shopping
            .remove(&user_id)
            .map(|items| items.len() as u64)
            .unwrap_or(0))
    }
}

#[async_trait]
impl PlannerRepo for MemoryStore {
    async fn load_meal_plan(&self, user_id: Uuid) -> Result<MealPlan, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.meal_plans.get(&user_id).cloned().unwrap_or_default())
    }

    async fn store_meal_plan(&self, user_id: Uuid, plan: &MealPlan) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.meal_plans.insert(user_id, plan.clone());
        Ok(())
    }

    async fn load_taste_profile(&self, user_id: Uuid) -> Result<TasteProfile, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.taste_profiles.get(&user_id).cloned().unwrap_or_default())
    }

    async fn store_taste_profile(
        &self,
        user_id: Uuid,
        profile: &TasteProfile,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.taste_profiles.insert(user_id, profile.clone());
        Ok(())
    }
}
