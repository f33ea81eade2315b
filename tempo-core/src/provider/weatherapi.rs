use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use crate::{
    cache::{CachedResponse, ResponseCache},
    config::{ApiKey, ClientConfig},
    error::DashboardError,
    model::{City, ForecastDays},
};

use super::WeatherProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    fn as_str(self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
        }
    }
}

/// WeatherAPI.com client with a time-boxed response cache in front of it.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: ApiKey,
    http: Client,
    config: ClientConfig,
    cache: ResponseCache,
}

impl WeatherApiClient {
    pub fn new(api_key: ApiKey, config: ClientConfig) -> Result<Self, DashboardError> {
        let cache = ResponseCache::new(config.cache_ttl);
        Self::with_cache(api_key, config, cache)
    }

    /// Build a client around an existing cache, e.g. one shared between clients.
    pub fn with_cache(
        api_key: ApiKey,
        config: ClientConfig,
        cache: ResponseCache,
    ) -> Result<Self, DashboardError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { api_key, http, config, cache })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}.json", self.config.base_url.trim_end_matches('/'), endpoint.as_str())
    }

    fn base_params(&self, city: &City) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.api_key.as_str().to_string()),
            ("q", city.location_query()),
            ("lang", self.config.lang.clone()),
        ]
    }

    async fn get_json(
        &self,
        endpoint: Endpoint,
        params: Vec<(&'static str, String)>,
    ) -> Result<Arc<CachedResponse>, DashboardError> {
        let url = self.endpoint_url(endpoint);
        let key = cache_key(&url, &params);

        self.cache.get_or_fetch(key, self.request(endpoint, url, params)).await
    }

    async fn request(
        &self,
        endpoint: Endpoint,
        url: String,
        params: Vec<(&'static str, String)>,
    ) -> Result<CachedResponse, DashboardError> {
        let q = params.iter().find(|(k, _)| *k == "q").map(|(_, v)| v.as_str()).unwrap_or("");
        tracing::debug!(endpoint = endpoint.as_str(), q, "Cache miss, requesting WeatherAPI");

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(endpoint = endpoint.as_str(), %status, "WeatherAPI request failed");
            return Err(DashboardError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            DashboardError::InvalidBody(format!(
                "WeatherAPI {} body is not JSON: {e}",
                endpoint.as_str()
            ))
        })?;

        Ok(CachedResponse::new(parsed))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn fetch_current(&self, city: &City) -> Result<Arc<CachedResponse>, DashboardError> {
        let params = self.base_params(city);
        self.get_json(Endpoint::Current, params).await
    }

    async fn fetch_forecast(
        &self,
        city: &City,
        days: ForecastDays,
    ) -> Result<Arc<CachedResponse>, DashboardError> {
        let mut params = self.base_params(city);
        params.push(("days", days.get().to_string()));
        self.get_json(Endpoint::Forecast, params).await
    }
}

/// Canonical request signature: endpoint URL plus every query parameter in order.
fn cache_key(url: &str, params: &[(&'static str, String)]) -> String {
    let query = params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
    format!("{url}?{query}")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn porto() -> City {
        City { name: "Porto", latitude: 41.15, longitude: -8.61 }
    }

    #[test]
    fn cache_key_distinguishes_endpoint_and_params() {
        let a = cache_key("https://x/current.json", &[("q", "1,2".into()), ("lang", "pt".into())]);
        let b = cache_key("https://x/forecast.json", &[("q", "1,2".into()), ("lang", "pt".into())]);
        let c = cache_key("https://x/current.json", &[("q", "1,3".into()), ("lang", "pt".into())]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "https://x/current.json?q=1,2&lang=pt");
    }

    #[test]
    fn endpoint_urls_follow_base_url() {
        let cfg = ClientConfig::default().with_base_url("http://localhost:1234/v1/");
        let client = WeatherApiClient::new(ApiKey::new("k"), cfg).unwrap();
        assert_eq!(client.endpoint_url(Endpoint::Current), "http://localhost:1234/v1/current.json");
        assert_eq!(
            client.endpoint_url(Endpoint::Forecast),
            "http://localhost:1234/v1/forecast.json"
        );
    }

    #[test]
    fn base_params_carry_key_location_and_lang() {
        let client = WeatherApiClient::new(ApiKey::new("abc"), ClientConfig::default()).unwrap();
        let params = client.base_params(&porto());
        assert_eq!(
            params,
            vec![
                ("key", "abc".to_string()),
                ("q", "41.15,-8.61".to_string()),
                ("lang", "pt".to_string()),
            ]
        );
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
