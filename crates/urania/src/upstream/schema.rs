//! Response shape checks. Anything the service returns is decoded and range
//! checked here before use; a failure is a contract violation upstream.

use crate::dom::Document;
use crate::natal::NatalChart;
use crate::upstream::{City, UpstreamError};
use serde_json::Value;

/// Some endpoints wrap their result in `{"data": ...}`.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() <= 2 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub fn parse_json(body: &str) -> Result<Value, UpstreamError> {
    serde_json::from_str(body)
        .map_err(|e| UpstreamError::SchemaMismatch(format!("invalid JSON: {}", e)))
}

pub fn parse_cities(value: Value) -> Result<Vec<City>, UpstreamError> {
    let list = match unwrap_data(value) {
        Value::Object(mut map) => map
            .remove("results")
            .or_else(|| map.remove("cities"))
            .ok_or_else(|| UpstreamError::SchemaMismatch("expected a list of cities".to_string()))?,
        other => other,
    };
    let cities: Vec<City> = serde_json::from_value(list)
        .map_err(|e| UpstreamError::SchemaMismatch(format!("city list: {}", e)))?;
    for city in &cities {
        city.validate().map_err(UpstreamError::SchemaMismatch)?;
    }
    Ok(cities)
}

pub fn parse_natal(value: Value) -> Result<NatalChart, UpstreamError> {
    let chart: NatalChart = serde_json::from_value(unwrap_data(value))
        .map_err(|e| UpstreamError::SchemaMismatch(format!("natal chart: {}", e)))?;
    chart.validate_shape().map_err(UpstreamError::SchemaMismatch)?;
    Ok(chart)
}

/// Accepts a raw SVG document or `{"svg": "..."}`.
pub fn parse_chart_svg(body: &str) -> Result<String, UpstreamError> {
    let trimmed = body.trim_start();
    let svg = if trimmed.starts_with('{') {
        let value = parse_json(body)?;
        match unwrap_data(value) {
            Value::Object(map) => map
                .get("svg")
                .or_else(|| map.get("chart"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| UpstreamError::SchemaMismatch("missing svg field".to_string()))?,
            Value::String(s) => s,
            _ => return Err(UpstreamError::SchemaMismatch("expected an SVG document".to_string())),
        }
    } else {
        body.to_string()
    };

    let doc = Document::parse(&svg).map_err(|e| UpstreamError::SchemaMismatch(e.to_string()))?;
    if doc.name(doc.root()) != Some("svg") {
        return Err(UpstreamError::SchemaMismatch(format!(
            "expected <svg> root, got <{}>",
            doc.name(doc.root()).unwrap_or("")
        )));
    }
    Ok(svg)
}
