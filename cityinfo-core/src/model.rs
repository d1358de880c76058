use serde::{Deserialize, Serialize};

/// Latitude/longitude pair. Serialized as a `[latitude, longitude]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<(f64, f64)> for Coordinates {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self { latitude, longitude }
    }
}

impl From<Coordinates> for (f64, f64) {
    fn from(c: Coordinates) -> Self {
        (c.latitude, c.longitude)
    }
}

/// Descriptive data about a city, as reported by the insights upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CityInsights {
    pub coordinates: Coordinates,
    pub population: u64,
    pub known_for: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Today,
    Tomorrow,
}

/// Temperature range forecast for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherOutlook {
    pub when: Day,
    pub min: f64,
    pub max: f64,
}

/// Today and tomorrow, always in that order.
pub type TwoDayOutlook = [WeatherOutlook; 2];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityInfoResponse {
    pub coordinates: Coordinates,
    pub population: u64,
    pub known_for: Vec<String>,
    pub weather_predictions: TwoDayOutlook,
    pub recipes: Vec<Recipe>,
}
