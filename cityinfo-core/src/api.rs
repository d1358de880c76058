//! HTTP surface of the gateway.
//!
//! - `GET  /cities/:city_id/infos`
//! - `POST /cities/:city_id/recipes` with body `{"content": "..."}`

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::error;

use crate::{
    CityError,
    aggregator::CityInfoAggregator,
    model::{CityInfoResponse, Recipe},
    provider::{InsightsProvider, WeatherProvider},
    store::RecipeStore,
    submission::RecipeSubmissionService,
};

/// Shared handler state. Cloning is cheap; every clone sees the same store.
#[derive(Debug, Clone)]
pub struct AppState {
    aggregator: CityInfoAggregator,
    submissions: RecipeSubmissionService,
}

impl AppState {
    pub fn new(
        insights: Arc<dyn InsightsProvider>,
        weather: Arc<dyn WeatherProvider>,
        recipes: Arc<RecipeStore>,
    ) -> Self {
        Self {
            aggregator: CityInfoAggregator::new(insights.clone(), weather, recipes.clone()),
            submissions: RecipeSubmissionService::new(insights, recipes),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/cities/:city_id/infos", get(get_city_infos))
        .route("/cities/:city_id/recipes", post(post_recipe))
        .with_state(state)
}

async fn get_city_infos(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
) -> Result<Json<CityInfoResponse>, ApiError> {
    let info = state.aggregator.get_city_info(&city_id).await?;
    Ok(Json(info))
}

/// The body is read as raw bytes so that a missing or malformed payload
/// still goes through the existence check before being rejected.
async fn post_recipe(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let payload: Option<Value> = serde_json::from_slice(&body).ok();
    let content = payload.as_ref().and_then(|p| p.get("content"));

    let recipe = state.submissions.submit_recipe(&city_id, content).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Maps [`CityError`] onto the wire contract. Only not-found and validation
/// failures carry a specific message; the rest is logged and reported as 500.
#[derive(Debug)]
pub struct ApiError(CityError);

impl From<CityError> for ApiError {
    fn from(err: CityError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CityError::NotFound => (StatusCode::NOT_FOUND, "City not found".to_string()),
            CityError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
            other => {
                error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
