use crate::aspects::classify::{aspect_phase, AspectPhase, Motion};
use crate::aspects::dedup::dedupe_aspects;
use crate::aspects::deriver::{derive_angle_aspects, references_angle, sort_by_orb};
use crate::aspects::types::{Aspect, AspectKind, AspectSource};
use crate::natal::types::{AspectsSummary, NatalChart, UpstreamAspect};
use crate::points::canonical_point;
use std::collections::{BTreeMap, HashMap};

/// Angles whose aspects are derived locally when the service omits them.
const DERIVED_ANGLES: &[&str] = &["ascendant", "midheaven"];

/// Builds the aspect list every view of a chart uses.
pub struct AspectCalculator {
    derive_angles: bool,
}

impl Default for AspectCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl AspectCalculator {
    pub fn new() -> Self {
        Self {
            derive_angles: true,
        }
    }

    /// Upstream aspects only, no ASC/MC derivation.
    pub fn upstream_only() -> Self {
        Self {
            derive_angles: false,
        }
    }

    /// Parse, derive, dedupe and sort.
    pub fn normalize(&self, chart: &NatalChart) -> Vec<Aspect> {
        let mut aspects: Vec<Aspect> = chart.aspects.iter().filter_map(from_upstream).collect();

        if self.derive_angles {
            let planets: Vec<(String, f64)> = chart
                .planets
                .iter()
                .map(|p| (p.token(), p.abs_pos))
                .collect();
            let endpoints: Vec<(&str, &str)> = chart
                .aspects
                .iter()
                .map(|a| (a.p1.as_str(), a.p2.as_str()))
                .collect();

            for angle in DERIVED_ANGLES {
                if references_angle(endpoints.iter().copied(), angle) {
                    log::debug!("upstream already reports {} aspects; not deriving", angle);
                    continue;
                }
                let lon = match *angle {
                    "ascendant" => chart.angles.asc,
                    _ => chart.angles.mc,
                };
                aspects.extend(derive_angle_aspects(
                    angle,
                    lon,
                    planets.iter().map(|(t, l)| (t.as_str(), *l)),
                ));
            }
        }

        let mut aspects = dedupe_aspects(aspects);
        sort_by_orb(&mut aspects);
        aspects
    }
}

pub fn normalize_chart_aspects(chart: &NatalChart) -> Vec<Aspect> {
    AspectCalculator::new().normalize(chart)
}

/// Map one upstream record through the kind table. Unknown kinds are dropped.
pub fn from_upstream(raw: &UpstreamAspect) -> Option<Aspect> {
    let Some(kind) = AspectKind::from_name(&raw.aspect_type) else {
        log::debug!(
            "dropping aspect {}-{} with unknown type {:?}",
            raw.p1,
            raw.p2,
            raw.aspect_type
        );
        return None;
    };
    if !raw.orb.is_finite() {
        return None;
    }
    Some(Aspect {
        p1: canonical_point(&raw.p1),
        p2: canonical_point(&raw.p2),
        kind,
        orb: raw.orb.abs(),
        major: raw.major.unwrap_or_else(|| kind.is_major()),
        source: AspectSource::Upstream,
    })
}

pub fn summarize(aspects: &[Aspect]) -> AspectsSummary {
    let mut by_type = BTreeMap::new();
    let mut major = 0;
    for aspect in aspects {
        if aspect.major {
            major += 1;
        }
        *by_type.entry(aspect.kind.as_str().to_string()).or_insert(0) += 1;
    }
    AspectsSummary {
        total: aspects.len(),
        major,
        minor: aspects.len() - major,
        by_type,
    }
}

/// Summary over the raw upstream list; unknown kinds are counted under their
/// reported name so `total` always equals the list length.
pub fn summarize_upstream(aspects: &[UpstreamAspect]) -> AspectsSummary {
    let mut by_type = BTreeMap::new();
    let mut major = 0;
    for raw in aspects {
        let kind = AspectKind::from_name(&raw.aspect_type);
        let is_major = raw
            .major
            .unwrap_or_else(|| kind.map(|k| k.is_major()).unwrap_or(false));
        if is_major {
            major += 1;
        }
        let name = match kind {
            Some(k) => k.as_str().to_string(),
            None => raw.aspect_type.trim().to_lowercase(),
        };
        *by_type.entry(name).or_insert(0) += 1;
    }
    AspectsSummary {
        total: aspects.len(),
        major,
        minor: aspects.len() - major,
        by_type,
    }
}

/// Longitudes and motions of every charted point, keyed by canonical token.
#[derive(Debug, Clone, Default)]
pub struct MotionTable {
    points: HashMap<String, Motion>,
}

impl MotionTable {
    pub fn from_chart(chart: &NatalChart) -> Self {
        let mut points = HashMap::new();
        for angle in chart.angles.resolved() {
            points.insert(angle.token.clone(), Motion::stationary(angle.abs_pos));
        }
        for planet in &chart.planets {
            points.insert(
                planet.token(),
                Motion::new(planet.abs_pos, planet.effective_speed()),
            );
        }
        Self { points }
    }

    pub fn get(&self, token: &str) -> Option<Motion> {
        self.points.get(&canonical_point(token)).copied()
    }

    pub fn phase(&self, aspect: &Aspect) -> AspectPhase {
        match (self.get(&aspect.p1), self.get(&aspect.p2)) {
            (Some(a), Some(b)) => aspect_phase(a, b, aspect.exact_degree()),
            _ => AspectPhase::Unknown,
        }
    }
}
