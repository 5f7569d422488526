//! Styling options forwarded to the chart image endpoint.

use crate::primitives::Color;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartTheme {
    Light,
    Dark,
}

/// Visual styling of the server-rendered wheel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    pub theme: ChartTheme,
    /// Pixel width of the square image.
    pub size: u32,
    #[serde(serialize_with = "hex")]
    pub background_color: Color,
    #[serde(serialize_with = "hex")]
    pub stroke_color: Color,
    #[serde(serialize_with = "hex_map")]
    pub aspect_colors: BTreeMap<String, Color>,
    /// Whether to draw minor aspect lines.
    pub show_minor_aspects: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        let mut aspect_colors = BTreeMap::new();
        for (kind, hex) in [
            ("conjunction", "#DC143C"),
            ("opposition", "#4169E1"),
            ("trine", "#228B22"),
            ("square", "#FF0000"),
            ("sextile", "#FFA500"),
        ] {
            aspect_colors.insert(kind.to_string(), Color::from_hex(hex).unwrap_or(Color::BLACK));
        }

        Self {
            theme: ChartTheme::Light,
            size: 640,
            background_color: Color::WHITE,
            stroke_color: Color::from_hex("#d4af37").unwrap_or(Color::BLACK), // Gold
            aspect_colors,
            show_minor_aspects: false,
        }
    }
}

impl ChartStyle {
    pub fn dark() -> Self {
        Self {
            theme: ChartTheme::Dark,
            background_color: Color::BLACK,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn hex<S: Serializer>(color: &Color, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&color.to_hex())
}

fn hex_map<S: Serializer>(colors: &BTreeMap<String, Color>, s: S) -> Result<S::Ok, S::Error> {
    let as_hex: BTreeMap<&str, String> =
        colors.iter().map(|(k, c)| (k.as_str(), c.to_hex())).collect();
    as_hex.serialize(s)
}
