use crate::geometry::normalize_360;
use crate::points::canonical_point;
use crate::zodiac::{degree_in_sign, find_sign, sign_index};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A body as reported by the calculation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: String,
    pub name: String,
    /// Sign name or three-letter abbreviation, as sent upstream.
    pub sign: String,
    /// Longitude within the sign (0-30)
    pub pos: f64,
    /// Absolute ecliptic longitude (0-360)
    #[serde(alias = "absPos", alias = "abs_longitude")]
    pub abs_pos: f64,
    pub house: u8,
    #[serde(default)]
    pub retrograde: bool,
    /// Signed daily motion in degrees/day, when the service provides it.
    #[serde(default)]
    pub speed: Option<f64>,
    /// `true` / `mean` for node variants.
    #[serde(default)]
    pub variant: Option<String>,
}

impl Planet {
    pub fn token(&self) -> String {
        canonical_point(&self.id)
    }

    /// Daily motion with the retrograde flag folded into its sign.
    pub fn effective_speed(&self) -> Option<f64> {
        self.speed.map(|s| {
            if self.retrograde && s > 0.0 {
                -s
            } else {
                s
            }
        })
    }

    /// `abs_pos = sign_offset * 30 + pos (mod 360)`, within 0.01°.
    pub fn is_consistent(&self) -> bool {
        match find_sign(&self.sign) {
            Some((index, _)) => {
                let expected = normalize_360(index as f64 * 30.0 + self.pos);
                crate::geometry::circular_distance(expected, self.abs_pos) < 0.01
            }
            None => false,
        }
    }
}

/// House cusp record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    pub house: u8,
    #[serde(default)]
    pub sign: Option<String>,
    #[serde(alias = "absPos")]
    pub abs_pos: f64,
}

/// Angle longitudes keyed the way the service returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Angles {
    pub asc: f64,
    pub mc: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ic: Option<f64>,
}

/// A chart angle resolved into sign terms. Stationary for phase purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAngle {
    pub token: String,
    pub sign: String,
    pub pos: f64,
    pub abs_pos: f64,
    pub house: u8,
}

impl ChartAngle {
    pub fn from_longitude(token: &str, longitude: f64, house: u8) -> Self {
        let abs_pos = normalize_360(longitude);
        let sign = crate::zodiac::sign_meta(sign_index(abs_pos)).name.clone();
        Self {
            token: token.to_string(),
            sign,
            pos: degree_in_sign(abs_pos),
            abs_pos,
            house,
        }
    }
}

impl Angles {
    /// ASC, MC and, when present, DSC and IC as resolved chart angles.
    pub fn resolved(&self) -> Vec<ChartAngle> {
        let mut out = vec![
            ChartAngle::from_longitude("ascendant", self.asc, 1),
            ChartAngle::from_longitude("midheaven", self.mc, 10),
        ];
        if let Some(dsc) = self.dsc {
            out.push(ChartAngle::from_longitude("descendant", dsc, 7));
        }
        if let Some(ic) = self.ic {
            out.push(ChartAngle::from_longitude("imum_coeli", ic, 4));
        }
        out
    }
}

/// Aspect record as the service emits it, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamAspect {
    #[serde(alias = "from", alias = "planet1")]
    pub p1: String,
    #[serde(alias = "to", alias = "planet2")]
    pub p2: String,
    #[serde(rename = "type", alias = "aspect")]
    pub aspect_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deg: Option<f64>,
    pub orb: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AspectsSummary {
    pub total: usize,
    #[serde(default)]
    pub major: usize,
    #[serde(default)]
    pub minor: usize,
    #[serde(default)]
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_time: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Complete natal calculation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalChart {
    #[serde(default)]
    pub subject: Option<SubjectInfo>,
    pub planets: Vec<Planet>,
    #[serde(default)]
    pub houses: Vec<HouseCusp>,
    pub angles: Angles,
    #[serde(default)]
    pub aspects: Vec<UpstreamAspect>,
    #[serde(default)]
    pub aspects_summary: AspectsSummary,
    /// Free-form interpretation payload; shape is not guaranteed.
    #[serde(default)]
    pub interpretation: serde_json::Value,
    #[serde(default)]
    pub dominants: serde_json::Value,
}

impl NatalChart {
    /// Range checks that serde cannot express. Any failure is a contract violation.
    pub fn validate_shape(&self) -> Result<(), String> {
        for angle in [("asc", self.angles.asc), ("mc", self.angles.mc)] {
            if !angle.1.is_finite() || angle.1 < 0.0 || angle.1 >= 360.0 {
                return Err(format!("angles.{} out of range: {}", angle.0, angle.1));
            }
        }
        for planet in &self.planets {
            if planet.id.trim().is_empty() {
                return Err("planet with empty id".to_string());
            }
            if !planet.abs_pos.is_finite() || planet.abs_pos < 0.0 || planet.abs_pos >= 360.0 {
                return Err(format!("{}.abs_pos out of range: {}", planet.id, planet.abs_pos));
            }
            if !(0.0..=30.0).contains(&planet.pos) {
                return Err(format!("{}.pos out of range: {}", planet.id, planet.pos));
            }
            if !(1..=12).contains(&planet.house) {
                return Err(format!("{}.house out of range: {}", planet.id, planet.house));
            }
            if !planet.is_consistent() {
                log::warn!(
                    "planet {} sign/pos ({} {}) disagrees with abs_pos {}",
                    planet.id,
                    planet.sign,
                    planet.pos,
                    planet.abs_pos
                );
            }
        }
        for cusp in &self.houses {
            if !(1..=12).contains(&cusp.house) {
                return Err(format!("house cusp number out of range: {}", cusp.house));
            }
        }
        for aspect in &self.aspects {
            if !aspect.orb.is_finite() {
                return Err(format!("aspect {}-{} has a non-finite orb", aspect.p1, aspect.p2));
            }
        }
        Ok(())
    }

    /// Recompute `aspects_summary` from the aspect list when the two disagree.
    pub fn reconcile_summary(&mut self) {
        let summary = crate::aspects::summarize_upstream(&self.aspects);
        if summary.total != self.aspects_summary.total {
            log::warn!(
                "aspects_summary.total {} != aspects.len() {}; recomputing",
                self.aspects_summary.total,
                self.aspects.len()
            );
            self.aspects_summary = summary;
        } else if self.aspects_summary.by_type.is_empty() {
            self.aspects_summary.by_type = summary.by_type;
        }
    }

    pub fn planet(&self, token: &str) -> Option<&Planet> {
        let wanted = canonical_point(token);
        self.planets.iter().find(|p| p.token() == wanted)
    }
}
