//! Elemental distribution ("dominants") of a chart.

use crate::natal::types::Planet;
use crate::points::{point_meta, PointKind};
use crate::zodiac::{sign_index, sign_meta, Element};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantsSource {
    Upstream,
    Computed,
}

/// Percentages per element, summing to ~100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dominants {
    pub fire: f64,
    pub earth: f64,
    pub air: f64,
    pub water: f64,
    pub source: DominantsSource,
}

impl Dominants {
    pub fn get(&self, element: Element) -> f64 {
        match element {
            Element::Fire => self.fire,
            Element::Earth => self.earth,
            Element::Air => self.air,
            Element::Water => self.water,
        }
    }

    /// Element with the largest share; ties resolve in fire/earth/air/water order.
    pub fn leading(&self) -> Element {
        let mut best = Element::Fire;
        for element in Element::ALL {
            if self.get(element) > self.get(best) {
                best = element;
            }
        }
        best
    }

    /// Read the upstream payload, falling back to the planets' signs.
    pub fn resolve(payload: &Value, planets: &[Planet]) -> Self {
        match Self::from_payload(payload) {
            Some(d) => d,
            None => {
                if !payload.is_null() {
                    log::debug!("dominants payload unusable, computing from planet signs");
                }
                Self::from_planets(planets)
            }
        }
    }

    /// Accepts `{fire, earth, air, water}`, the same nested under `elements`,
    /// or a list of `{element, percentage|value}` entries.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let source = match payload.get("elements") {
            Some(inner) => inner,
            None => payload,
        };

        let mut values = [None; 4];
        match source {
            Value::Object(map) => {
                for (i, element) in Element::ALL.iter().enumerate() {
                    values[i] = map.get(element.as_str()).and_then(number);
                }
            }
            Value::Array(items) => {
                for item in items {
                    let name = item.get("element").and_then(Value::as_str);
                    let value = item
                        .get("percentage")
                        .or_else(|| item.get("value"))
                        .and_then(number);
                    if let (Some(name), Some(value)) = (name, value) {
                        if let Some(i) = Element::ALL
                            .iter()
                            .position(|e| e.as_str().eq_ignore_ascii_case(name))
                        {
                            values[i] = Some(value);
                        }
                    }
                }
            }
            _ => return None,
        }

        let [Some(fire), Some(earth), Some(air), Some(water)] = values else {
            return None;
        };
        let total = fire + earth + air + water;
        if total <= 0.0 || [fire, earth, air, water].iter().any(|v| *v < 0.0) {
            return None;
        }
        // Some payloads send fractions, some percentages.
        let scale = if total <= 1.0 + 1e-6 { 100.0 } else { 100.0 / total };
        Some(Self {
            fire: round1(fire * scale),
            earth: round1(earth * scale),
            air: round1(air * scale),
            water: round1(water * scale),
            source: DominantsSource::Upstream,
        })
    }

    /// Count the classical planets per element of their sign.
    pub fn from_planets(planets: &[Planet]) -> Self {
        let mut counts = [0usize; 4];
        for planet in planets {
            let is_planet =
                matches!(point_meta(&planet.id), Some(m) if m.kind == PointKind::Planet);
            if !is_planet {
                continue;
            }
            let element = sign_meta(sign_index(planet.abs_pos)).element;
            if let Some(i) = Element::ALL.iter().position(|e| *e == element) {
                counts[i] += 1;
            }
        }
        let total: usize = counts.iter().sum();
        let pct = |n: usize| {
            if total == 0 {
                0.0
            } else {
                round1(n as f64 * 100.0 / total as f64)
            }
        };
        Self {
            fire: pct(counts[0]),
            earth: pct(counts[1]),
            air: pct(counts[2]),
            water: pct(counts[3]),
            source: DominantsSource::Computed,
        }
    }
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
