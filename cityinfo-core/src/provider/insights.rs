use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    CityError,
    model::{CityInsights, Coordinates},
};

use super::{InsightsProvider, Upstream, truncate_body};

/// HTTP client for `GET {base}/cities/{cityId}/insights`.
///
/// Any non-success status is reported as [`CityError::NotFound`]; the
/// upstream does not distinguish "unknown city" from its own failures.
#[derive(Debug, Clone)]
pub struct CityInsightsClient {
    base_url: Url,
    api_key: String,
    http: Client,
}

impl CityInsightsClient {
    pub fn new(base_url: &str, api_key: String) -> Result<Self> {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(http: Client, base_url: &str, api_key: String) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid insights base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Insights base URL cannot be a base: {base_url}"));
        }

        Ok(Self { base_url, api_key, http })
    }

    fn insights_url(&self, city_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Insights base URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(["cities", city_id, "insights"]);
        Ok(url)
    }

    async fn send(&self, city_id: &str) -> Result<reqwest::Response, CityError> {
        let url = self.insights_url(city_id)?;
        debug!(city_id, path = url.path(), "requesting city insights");

        self.http
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| CityError::Upstream(Upstream::Insights, e))
    }
}

#[async_trait]
impl InsightsProvider for CityInsightsClient {
    async fn fetch_insights(&self, city_id: &str) -> Result<CityInsights, CityError> {
        let res = self.send(city_id).await?;

        let status = res.status();
        if !status.is_success() {
            // The body is only for the log; failing to read it changes nothing.
            let body = res.text().await.unwrap_or_default();
            warn!(city_id, %status, body = %truncate_body(&body), "insights lookup rejected");
            return Err(CityError::NotFound);
        }

        let body = res
            .text()
            .await
            .map_err(|e| CityError::Upstream(Upstream::Insights, e))?;

        parse_insights(&body)
    }

    /// Only the status matters here; the body is never read.
    async fn exists(&self, city_id: &str) -> Result<bool, CityError> {
        let status = self.send(city_id).await?.status();
        if !status.is_success() {
            warn!(city_id, %status, "insights existence check rejected");
        }
        Ok(status.is_success())
    }
}

#[derive(Debug, Deserialize)]
struct InsightsBody {
    coordinates: Vec<CoordinateEntry>,
    population: u64,
    #[serde(rename = "knownFor")]
    known_for: Vec<KnownForEntry>,
}

#[derive(Debug, Deserialize)]
struct CoordinateEntry {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct KnownForEntry {
    content: String,
}

pub(crate) fn parse_insights(body: &str) -> Result<CityInsights, CityError> {
    let parsed: InsightsBody = serde_json::from_str(body)
        .map_err(|e| CityError::MalformedUpstreamData(Upstream::Insights, e.to_string()))?;

    let first = parsed.coordinates.first().ok_or_else(|| {
        CityError::MalformedUpstreamData(Upstream::Insights, "empty coordinate list".into())
    })?;

    Ok(CityInsights {
        coordinates: Coordinates { latitude: first.latitude, longitude: first.longitude },
        population: parsed.population,
        known_for: parsed.known_for.into_iter().map(|k| k.content).collect(),
    })
}
