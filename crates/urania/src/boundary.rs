//! Browser-facing request handlers. Each validates its JSON input, calls the
//! calculation service and answers a status plus a JSON body; failures become
//! `{error: {code, message, details}}`.

use crate::chart_style::ChartStyle;
use crate::error::ApiError;
use crate::natal::{NatalRequest, ValidationIssue};
use crate::upstream::city::DEFAULT_CITY_LIMIT;
use crate::upstream::{AstrologyApi, HttpAstrologyApi};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use urania_config::UpstreamSettings;

pub const MAX_CITY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        Self {
            status: err.status(),
            body: err.to_body(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityQuery {
    #[serde(alias = "q")]
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub country: Option<String>,
}

impl CityQuery {
    pub fn from_json(value: &Value) -> Result<Self, Vec<ValidationIssue>> {
        let query: CityQuery = serde_json::from_value(value.clone())
            .map_err(|e| vec![ValidationIssue::new("body", e.to_string())])?;
        let mut issues = Vec::new();
        let len = query.query.trim().chars().count();
        if !(2..=100).contains(&len) {
            issues.push(ValidationIssue::new("query", "must be 2-100 characters"));
        }
        if let Some(limit) = query.limit {
            if limit == 0 || limit > MAX_CITY_LIMIT {
                issues.push(ValidationIssue::new("limit", format!("must be 1-{}", MAX_CITY_LIMIT)));
            }
        }
        if let Some(country) = &query.country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                issues.push(ValidationIssue::new("country", "expected ISO 3166-1 alpha-2"));
            }
        }
        if issues.is_empty() {
            Ok(query)
        } else {
            Err(issues)
        }
    }
}

/// Chart style options accepted next to the birth data.
fn style_from_json(value: &Value) -> Result<ChartStyle, Vec<ValidationIssue>> {
    let Some(style) = value.get("style").filter(|s| !s.is_null()) else {
        return Ok(ChartStyle::default());
    };
    let mut chart_style = match style.get("theme").and_then(Value::as_str) {
        Some("dark") => ChartStyle::dark(),
        Some("light") | None => ChartStyle::default(),
        Some(other) => {
            return Err(vec![ValidationIssue::new(
                "style.theme",
                format!("unknown theme {:?}", other),
            )])
        }
    };
    if let Some(size) = style.get("size") {
        match size.as_u64() {
            Some(px) if (200..=2000).contains(&px) => chart_style.size = px as u32,
            _ => return Err(vec![ValidationIssue::new("style.size", "must be 200-2000")]),
        }
    }
    if let Some(minor) = style.get("show_minor_aspects").and_then(Value::as_bool) {
        chart_style.show_minor_aspects = minor;
    }
    Ok(chart_style)
}

/// Strip the non-request keys before decoding birth data.
fn request_from_json(value: &Value) -> Result<NatalRequest, ApiError> {
    let mut body = value.clone();
    if let Value::Object(map) = &mut body {
        map.remove("style");
    }
    Ok(NatalRequest::from_json(&body)?)
}

/// Request handlers over an optional upstream client. Without a client every
/// handler answers `MISSING_CONFIG`.
#[derive(Clone)]
pub struct Boundary {
    api: Option<Arc<dyn AstrologyApi>>,
}

impl Boundary {
    pub fn from_settings(settings: &UpstreamSettings) -> Self {
        match HttpAstrologyApi::new(settings) {
            Ok(api) => Self::with_api(Arc::new(api)),
            Err(e) => {
                log::warn!("upstream client unavailable: {}", e);
                Self::unconfigured()
            }
        }
    }

    pub fn with_api(api: Arc<dyn AstrologyApi>) -> Self {
        Self { api: Some(api) }
    }

    pub fn unconfigured() -> Self {
        Self { api: None }
    }

    pub fn api(&self) -> Option<Arc<dyn AstrologyApi>> {
        self.api.clone()
    }

    fn require_api(&self) -> Result<&Arc<dyn AstrologyApi>, ApiError> {
        self.api
            .as_ref()
            .ok_or_else(|| ApiError::MissingConfig(urania_config::API_KEY_ENV.to_string()))
    }

    fn respond(result: Result<Value, ApiError>, what: &str) -> ApiResponse {
        match result {
            Ok(body) => ApiResponse::ok(body),
            Err(err) => {
                log::warn!("{} failed: {:?} ({})", what, err, err.code());
                err.into()
            }
        }
    }

    pub async fn natal(&self, body: &Value) -> ApiResponse {
        Self::respond(self.natal_inner(body).await, "natal")
    }

    async fn natal_inner(&self, body: &Value) -> Result<Value, ApiError> {
        let request = request_from_json(body)?;
        let api = self.require_api()?;
        let mut chart = api.natal(&request).await?;
        chart.reconcile_summary();
        serde_json::to_value(&chart).map_err(|e| ApiError::UpstreamSchema(e.to_string()))
    }

    pub async fn chart(&self, body: &Value) -> ApiResponse {
        Self::respond(self.chart_inner(body).await, "chart")
    }

    async fn chart_inner(&self, body: &Value) -> Result<Value, ApiError> {
        let request = request_from_json(body)?;
        let style = style_from_json(body)?;
        let api = self.require_api()?;
        let svg = api.chart_svg(&request, &style).await?;
        Ok(json!({ "svg": svg }))
    }

    pub async fn cities(&self, body: &Value) -> ApiResponse {
        Self::respond(self.cities_inner(body).await, "city search")
    }

    async fn cities_inner(&self, body: &Value) -> Result<Value, ApiError> {
        let query = CityQuery::from_json(body)?;
        let api = self.require_api()?;
        let cities = api
            .search_cities(
                query.query.trim(),
                query.limit.unwrap_or(DEFAULT_CITY_LIMIT),
                query.country.as_deref(),
            )
            .await?;
        Ok(json!({ "results": cities }))
    }
}
