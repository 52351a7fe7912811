use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShoppingListItem {
    pub id: Uuid,
    /// Original ingredient wording, not normalized.
    pub text: String,
    /// Recipe title or a fixed label such as "Weekly Meal Plan".
    pub source: String,
    pub checked: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// What a derivation did to the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShoppingListOutcome {
    Added { count: usize },
    /// Every ingredient is already in the pantry.
    AlreadyStocked,
    /// There were no recipes to derive from.
    NoRecipes,
    /// The list could not be updated; the primary operation still succeeded.
    Unavailable,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub deleted_count: u64,
}
