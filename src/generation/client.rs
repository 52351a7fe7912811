//! Client for the recipe generation service.
//!
//! The service answers `POST {endpoint}/generate`, `/modify` and
//! `/generateImage` with JSON. Failures carry `{"error": "..."}`, where the
//! message may itself embed the model provider's JSON error.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::dto::{GenerationCriteria, ImageResponse};
use crate::config::GenerationConfig;
use crate::recipes::dto::RecipeDraft;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("the recipe model is overloaded, please try again in a moment")]
    Overloaded,

    #[error("the generation service rejected its API credentials")]
    InvalidCredentials,

    #[error("API Error: {0}")]
    Api(String),

    #[error("could not reach the generation service: {0}")]
    Transport(String),

    #[error("the generation service returned malformed data: {0}")]
    Parse(String),
}

#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate(&self, criteria: &GenerationCriteria)
        -> Result<Vec<RecipeDraft>, GenerationError>;

    async fn modify(
        &self,
        recipe: &RecipeDraft,
        instruction: &str,
    ) -> Result<RecipeDraft, GenerationError>;

    /// Returns an image reference, typically a `data:` URL.
    async fn image(&self, prompt: &str) -> Result<String, GenerationError>;
}

pub struct HttpGenerator {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpGenerator {
    pub fn new(cfg: &GenerationConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, GenerationError> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!(%url, "calling generation service");

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &text);
            warn!(%url, status = status.as_u16(), error = %err, "generation request failed");
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| GenerationError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RecipeGenerator for HttpGenerator {
    async fn generate(
        &self,
        criteria: &GenerationCriteria,
    ) -> Result<Vec<RecipeDraft>, GenerationError> {
        let body = json!({
            "ingredients": criteria.ingredients,
            "diet": criteria.diet.as_deref().unwrap_or_default(),
            "cuisine": criteria.cuisine.as_deref().unwrap_or_default(),
            "cookingMethod": criteria.cooking_method.as_deref().unwrap_or_default(),
            "mealType": criteria.meal_type.as_deref().unwrap_or_default(),
            "favoriteIngredients": criteria.favorite_ingredients,
            "favoriteCuisines": criteria.favorite_cuisines,
            "excludedIngredients": criteria.excluded_ingredients,
        });
        self.post("generate", &body).await
    }

    async fn modify(
        &self,
        recipe: &RecipeDraft,
        instruction: &str,
    ) -> Result<RecipeDraft, GenerationError> {
        let body = json!({
            "recipe": wire_recipe(recipe),
            "modification": instruction,
        });
        self.post("modify", &body).await
    }

    async fn image(&self, prompt: &str) -> Result<String, GenerationError> {
        let resp: ImageResponse = self.post("generateImage", &json!({ "prompt": prompt })).await?;
        Ok(resp.image_url)
    }
}

/// Recipe in the generation service's field naming.
fn wire_recipe(recipe: &RecipeDraft) -> Value {
    let mut v = json!({
        "recipeName": recipe.title,
        "description": recipe.description,
        "prepTime": recipe.prep_time,
        "cookTime": recipe.cook_time,
        "ingredients": recipe.ingredients,
        "instructions": recipe.instructions,
    });
    if let Some(n) = &recipe.nutrition {
        v["nutritionalInfo"] = json!(n);
    }
    if let Some(b) = &recipe.beverage_pairing {
        v["beveragePairing"] = json!({
            "wine": b.wine,
            "beer": b.beer,
            "nonAlcoholic": b.non_alcoholic,
        });
    }
    v
}

/// Maps a non-2xx response to a failure class.
pub fn classify_failure(status: u16, body: &str) -> GenerationError {
    let message = error_message(body);
    let lower = message.to_lowercase();

    if status == 503 || message.contains("UNAVAILABLE") || lower.contains("overloaded") {
        return GenerationError::Overloaded;
    }
    if status == 401 || message.contains("API key not valid") || lower.contains("invalid api key") {
        return GenerationError::InvalidCredentials;
    }
    if message.is_empty() {
        return GenerationError::Api(format!("request failed with status {status}"));
    }
    GenerationError::Api(message)
}

/// Digs the human-readable message out of `{"error": ...}`, which may be a
/// plain string, a provider error object, or a string holding one.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    match value.get("error") {
        Some(Value::String(s)) => nested_message(s).unwrap_or_else(|| s.clone()),
        Some(obj @ Value::Object(_)) => provider_message(obj).unwrap_or_else(|| obj.to_string()),
        _ => body.trim().to_string(),
    }
}

fn nested_message(s: &str) -> Option<String> {
    let start = s.find('{')?;
    let inner: Value = serde_json::from_str(&s[start..]).ok()?;
    provider_message(inner.get("error")?)
}

fn provider_message(err: &Value) -> Option<String> {
    let message = err.get("message")?.as_str()?;
    match err.get("status").and_then(Value::as_str) {
        Some(status) => Some(format!("{message} ({status})")),
        None => Some(message.to_string()),
    }
}
