//! Zodiac sign table and longitude helpers.

use crate::geometry::normalize_360;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl Element {
    pub const ALL: [Element; 4] = [Element::Fire, Element::Earth, Element::Air, Element::Water];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Water => "water",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignMeta {
    pub name: String,
    pub abbreviation: String,
    pub element: Element,
}

fn sign(name: &str, abbreviation: &str, element: Element) -> SignMeta {
    SignMeta {
        name: name.to_string(),
        abbreviation: abbreviation.to_string(),
        element,
    }
}

lazy_static::lazy_static! {
    static ref SIGNS: Vec<SignMeta> = vec![
        sign("Aries", "Ari", Element::Fire),
        sign("Taurus", "Tau", Element::Earth),
        sign("Gemini", "Gem", Element::Air),
        sign("Cancer", "Can", Element::Water),
        sign("Leo", "Leo", Element::Fire),
        sign("Virgo", "Vir", Element::Earth),
        sign("Libra", "Lib", Element::Air),
        sign("Scorpio", "Sco", Element::Water),
        sign("Sagittarius", "Sag", Element::Fire),
        sign("Capricorn", "Cap", Element::Earth),
        sign("Aquarius", "Aqu", Element::Air),
        sign("Pisces", "Pis", Element::Water),
    ];
}

/// Sign index (0-11) from absolute longitude.
pub fn sign_index(longitude: f64) -> usize {
    ((normalize_360(longitude) / 30.0) as usize) % 12
}

pub fn sign_meta(index: usize) -> &'static SignMeta {
    &SIGNS[index % 12]
}

/// Look up a sign by full name or the three-letter form upstream payloads use.
pub fn find_sign(name: &str) -> Option<(usize, &'static SignMeta)> {
    let lower = name.trim().to_lowercase();
    SIGNS
        .iter()
        .enumerate()
        .find(|(_, s)| s.name.to_lowercase() == lower || s.abbreviation.to_lowercase() == lower)
}

/// Degrees within the sign, [0, 30).
pub fn degree_in_sign(longitude: f64) -> f64 {
    let lon = normalize_360(longitude);
    lon - (sign_index(lon) as f64 * 30.0)
}

/// `12°34'` style rendering of a degree value within a sign.
pub fn format_degree(pos: f64) -> String {
    let total_minutes = (pos.abs() * 60.0 + 1e-9).floor() as i64;
    let degrees = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!("{}°{:02}'", degrees, minutes)
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
