use std::sync::Arc;

use tracing::debug;

use crate::{
    CityError,
    model::CityInfoResponse,
    provider::{InsightsProvider, WeatherProvider},
    store::RecipeStore,
};

/// Builds the merged read view for a city.
#[derive(Debug, Clone)]
pub struct CityInfoAggregator {
    insights: Arc<dyn InsightsProvider>,
    weather: Arc<dyn WeatherProvider>,
    recipes: Arc<RecipeStore>,
}

impl CityInfoAggregator {
    pub fn new(
        insights: Arc<dyn InsightsProvider>,
        weather: Arc<dyn WeatherProvider>,
        recipes: Arc<RecipeStore>,
    ) -> Self {
        Self { insights, weather, recipes }
    }

    /// Insights first, then weather, then recipes. An unknown city stops
    /// after the insights call; any later failure fails the whole response.
    pub async fn get_city_info(&self, city_id: &str) -> Result<CityInfoResponse, CityError> {
        let insights = self.insights.fetch_insights(city_id).await?;
        let weather_predictions = self.weather.fetch_outlook(city_id).await?;
        let recipes = self.recipes.list_for_city(city_id);

        debug!(city_id, recipes = recipes.len(), "aggregated city info");

        Ok(CityInfoResponse {
            coordinates: insights.coordinates,
            population: insights.population,
            known_for: insights.known_for,
            weather_predictions,
            recipes,
        })
    }
}
