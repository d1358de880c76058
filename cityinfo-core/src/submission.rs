use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::{
    CityError, ValidationError,
    model::Recipe,
    provider::InsightsProvider,
    store::RecipeStore,
};

pub const MIN_CONTENT_CHARS: usize = 10;
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Type and length checks for submitted content, in that order.
///
/// Length is counted in UTF-16 code units, so a character outside the Basic
/// Multilingual Plane counts as two. Both bounds are inclusive.
pub fn validate_content(content: Option<&Value>) -> Result<&str, ValidationError> {
    let content = match content {
        Some(Value::String(s)) if !s.is_empty() => s.as_str(),
        _ => return Err(ValidationError::ContentRequired),
    };

    let len = content.encode_utf16().count();
    if len < MIN_CONTENT_CHARS {
        return Err(ValidationError::ContentTooShort);
    }
    if len > MAX_CONTENT_CHARS {
        return Err(ValidationError::ContentTooLong);
    }

    Ok(content)
}

/// Validates and stores user-submitted recipes.
#[derive(Debug, Clone)]
pub struct RecipeSubmissionService {
    insights: Arc<dyn InsightsProvider>,
    recipes: Arc<RecipeStore>,
}

impl RecipeSubmissionService {
    pub fn new(insights: Arc<dyn InsightsProvider>, recipes: Arc<RecipeStore>) -> Self {
        Self { insights, recipes }
    }

    /// The city must exist before content is even looked at: an invalid
    /// submission for an unknown city is `NotFound`, not a validation error.
    pub async fn submit_recipe(
        &self,
        city_id: &str,
        content: Option<&Value>,
    ) -> Result<Recipe, CityError> {
        if !self.insights.exists(city_id).await? {
            return Err(CityError::NotFound);
        }

        let content = validate_content(content)?;
        let recipe = self.recipes.append(city_id, content);

        info!(city_id, recipe_id = recipe.id, "recipe created");
        Ok(recipe)
    }
}
