//! The external calculation service, treated as an opaque oracle.

pub mod city;
pub mod http;
pub mod schema;

pub use city::{City, CitySearch, SearchOutcome};
pub use http::HttpAstrologyApi;

use crate::chart_style::ChartStyle;
use crate::natal::{NatalChart, NatalRequest};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Unexpected response shape: {0}")]
    SchemaMismatch(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

/// Operations the report needs from the calculation service.
#[async_trait]
pub trait AstrologyApi: Send + Sync {
    async fn search_cities(
        &self,
        query: &str,
        limit: usize,
        country: Option<&str>,
    ) -> Result<Vec<City>, UpstreamError>;

    async fn natal(&self, request: &NatalRequest) -> Result<NatalChart, UpstreamError>;

    /// Inline SVG document for the natal wheel.
    async fn chart_svg(
        &self,
        request: &NatalRequest,
        style: &ChartStyle,
    ) -> Result<String, UpstreamError>;
}
