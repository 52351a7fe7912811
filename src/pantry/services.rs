use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use super::dto::PantryItem;
use super::repo::PantryRepo;
use crate::error::AppError;
use crate::ingredients::normalize;

/// The normalized ingredient keys a user already has at home.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PantrySet {
    keys: HashSet<String>,
}

impl PantrySet {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Entries are normalized on the way in, so raw lines and stored names mix.
impl<S: AsRef<str>> FromIterator<S> for PantrySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|s| normalize(s.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

pub async fn load_pantry_set<P: PantryRepo + ?Sized>(
    repo: &P,
    user_id: Uuid,
) -> Result<PantrySet, AppError> {
    let items = repo.list_pantry(user_id).await?;
    Ok(items.iter().map(|i| i.name.as_str()).collect())
}

pub async fn list_items<P: PantryRepo + ?Sized>(
    repo: &P,
    user_id: Uuid,
) -> Result<Vec<PantryItem>, AppError> {
    Ok(repo.list_pantry(user_id).await?)
}

/// Adds an item under its normalized name, refusing names already present.
pub async fn add_item<P: PantryRepo + ?Sized>(
    repo: &P,
    user_id: Uuid,
    raw_name: &str,
) -> Result<PantryItem, AppError> {
    let name = normalize(raw_name);
    if name.is_empty() {
        return Err(AppError::Validation("item name is required".into()));
    }

    let existing = load_pantry_set(repo, user_id).await?;
    if existing.contains(&name) {
        return Err(AppError::Duplicate(format!("\"{name}\" is already in your pantry")));
    }

    let item = repo.insert_pantry_item(user_id, &name).await?;
    info!(%user_id, item_id = %item.id, name = %item.name, "pantry item added");
    Ok(item)
}

/// Idempotent.
pub async fn remove_item<P: PantryRepo + ?Sized>(
    repo: &P,
    user_id: Uuid,
    item_id: Uuid,
) -> Result<bool, AppError> {
    Ok(repo.delete_pantry_item(user_id, item_id).await?)
}
