use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    CityError,
    model::{Day, TwoDayOutlook, WeatherOutlook},
};

use super::{Upstream, WeatherProvider, or_zero, truncate_body};

/// HTTP client for `GET {base}/weather-predictions?cityIdentifier={cityId}`.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    predictions_url: Url,
    api_key: String,
    http: Client,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: String) -> Result<Self> {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(http: Client, base_url: &str, api_key: String) -> Result<Self> {
        let mut predictions_url = Url::parse(base_url)
            .with_context(|| format!("Invalid weather base URL: {base_url}"))?;
        predictions_url
            .path_segments_mut()
            .map_err(|_| anyhow!("Weather base URL cannot be a base: {base_url}"))?
            .pop_if_empty()
            .push("weather-predictions");

        Ok(Self { predictions_url, api_key, http })
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn fetch_outlook(&self, city_id: &str) -> Result<TwoDayOutlook, CityError> {
        debug!(city_id, "requesting weather predictions");

        let res = self
            .http
            .get(self.predictions_url.clone())
            .query(&[("cityIdentifier", city_id), ("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| CityError::Upstream(Upstream::Weather, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| CityError::Upstream(Upstream::Weather, e))?;

        if !status.is_success() {
            let body = truncate_body(&body);
            warn!(city_id, %status, %body, "weather predictions request failed");
            return Err(CityError::UpstreamStatus {
                upstream: Upstream::Weather,
                status: status.as_u16(),
                body,
            });
        }

        parse_outlook(&body)
    }
}

/// Only the outer array is required. Element 0 is the prediction set; a
/// null, missing or non-array `predictions` reads as empty, and positions 0
/// and 1 become today and tomorrow with absent or non-numeric temperatures
/// defaulting to zero. Later elements are never inspected.
pub(crate) fn parse_outlook(body: &str) -> Result<TwoDayOutlook, CityError> {
    let sets: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| CityError::MalformedUpstreamData(Upstream::Weather, e.to_string()))?;

    let predictions: &[Value] = sets
        .first()
        .and_then(|set| set.get("predictions"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let temperature = |index: usize, field: &str| {
        or_zero(predictions.get(index).and_then(|p| p.get(field)).and_then(Value::as_f64))
    };
    let day = |index: usize, when: Day| WeatherOutlook {
        when,
        min: temperature(index, "minTemperature"),
        max: temperature(index, "maxTemperature"),
    };

    Ok([day(0, Day::Today), day(1, Day::Tomorrow)])
}
