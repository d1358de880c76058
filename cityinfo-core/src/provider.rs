use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    CityError,
    model::{CityInsights, TwoDayOutlook},
};

pub mod insights;
pub mod weather;

pub use insights::CityInsightsClient;
pub use weather::WeatherClient;

/// The two external data providers this gateway depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    Insights,
    Weather,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Insights => "insights",
            Upstream::Weather => "weather",
        }
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of city metadata and the sole authority on whether a city exists.
#[async_trait]
pub trait InsightsProvider: Send + Sync + Debug {
    /// Fetch insights for `city_id`, or [`CityError::NotFound`] if the city is unknown.
    async fn fetch_insights(&self, city_id: &str) -> Result<CityInsights, CityError>;

    /// Existence check. Transport failures are errors, not `false`.
    async fn exists(&self, city_id: &str) -> Result<bool, CityError> {
        match self.fetch_insights(city_id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Always yields exactly `[today, tomorrow]`.
    async fn fetch_outlook(&self, city_id: &str) -> Result<TwoDayOutlook, CityError>;
}

/// Missing temperatures read as zero.
pub fn or_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
