use crate::chart_style::ChartStyle;
use crate::natal::{NatalChart, NatalRequest};
use crate::upstream::schema::{parse_chart_svg, parse_cities, parse_json, parse_natal};
use crate::upstream::{AstrologyApi, City, UpstreamError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use urania_config::UpstreamSettings;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Extra points requested with every natal calculation.
const EXTRA_POINTS: &[&str] = &[
    "chiron",
    "lilith",
    "true_node",
    "mean_node",
    "ascendant",
    "midheaven",
];

/// `reqwest` client for the calculation service.
pub struct HttpAstrologyApi {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpAstrologyApi {
    /// Fails with `MissingConfig` when no API key is configured.
    pub fn new(settings: &UpstreamSettings) -> Result<Self, UpstreamError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| UpstreamError::MissingConfig(urania_config::API_KEY_ENV.to_string()))?;
        Ok(Self {
            client: Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: settings.timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send with the API key and the request timeout. Non-2xx answers are
    /// `Http` errors carrying the body.
    async fn send(&self, request: RequestBuilder) -> Result<String, UpstreamError> {
        let request = request.header(API_KEY_HEADER, &self.api_key);
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = match tokio::time::timeout(self.timeout, exchange).await {
            Err(_) => {
                log::warn!("upstream request exceeded {:?}", self.timeout);
                return Err(UpstreamError::Timeout);
            }
            Ok(Err(e)) if e.is_timeout() => return Err(UpstreamError::Timeout),
            Ok(Err(e)) => return Err(UpstreamError::Network(e.to_string())),
            Ok(Ok(pair)) => pair,
        };
        if !status.is_success() {
            log::warn!("upstream answered {}", status.as_u16());
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// JSON body shared by the natal and chart endpoints.
pub fn natal_body(request: &NatalRequest) -> Value {
    json!({
        "name": request.name,
        "birth_date": request.birth_date,
        "birth_time": request.birth_time,
        "city": request.city,
        "country_code": request.country_code,
        "latitude": request.latitude,
        "longitude": request.longitude,
        "timezone": request.timezone,
        "house_system": request.house_system.as_str(),
        "zodiac_type": request.zodiac_type.as_str(),
        "include_points": EXTRA_POINTS,
        "include_interpretation": true,
        "include_dominants": true,
    })
}

#[async_trait]
impl AstrologyApi for HttpAstrologyApi {
    async fn search_cities(
        &self,
        query: &str,
        limit: usize,
        country: Option<&str>,
    ) -> Result<Vec<City>, UpstreamError> {
        let mut params: Vec<(&str, String)> =
            vec![("q", query.to_string()), ("limit", limit.to_string())];
        if let Some(country) = country {
            params.push(("country", country.to_uppercase()));
        }
        log::debug!("city search {:?} (limit {})", query, limit);
        let body = self.send(self.client.get(self.url("geo/cities")).query(&params)).await?;
        parse_cities(parse_json(&body)?)
    }

    async fn natal(&self, request: &NatalRequest) -> Result<NatalChart, UpstreamError> {
        log::info!("natal calculation for {} {}", request.birth_date, request.birth_time);
        let body = self
            .send(self.client.post(self.url("natal")).json(&natal_body(request)))
            .await?;
        parse_natal(parse_json(&body)?)
    }

    async fn chart_svg(
        &self,
        request: &NatalRequest,
        style: &ChartStyle,
    ) -> Result<String, UpstreamError> {
        let mut body = natal_body(request);
        body["style"] = style.to_json();
        let text = self
            .send(self.client.post(self.url("natal/chart")).json(&body))
            .await?;
        parse_chart_svg(&text)
    }
}
