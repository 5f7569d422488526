use crate::aspects::types::{Aspect, AspectSource, ANGLE_ASPECTS};
use crate::geometry::{circular_distance, round2};
use crate::points::canonical_point;

/// Aspects between one chart angle and a set of planets.
///
/// Every canonical aspect whose tolerance is met is emitted, so one pair can
/// yield more than one record. Output is ordered tightest orb first.
pub fn derive_angle_aspects<'a, I>(angle_token: &str, angle_lon: f64, planets: I) -> Vec<Aspect>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let angle_token = canonical_point(angle_token);
    let mut aspects = Vec::new();

    for (planet_token, planet_lon) in planets {
        if canonical_point(planet_token) == angle_token {
            continue;
        }
        let distance = circular_distance(angle_lon, planet_lon);
        for def in &ANGLE_ASPECTS {
            let deviation = (distance - def.exact_degree).abs();
            if deviation <= def.max_orb {
                aspects.push(Aspect {
                    p1: angle_token.clone(),
                    p2: planet_token.to_string(),
                    kind: def.kind,
                    orb: round2(deviation),
                    major: true,
                    source: AspectSource::Derived,
                });
            }
        }
    }

    sort_by_orb(&mut aspects);
    aspects
}

/// Tightest first; stable so equal orbs keep their input order.
pub fn sort_by_orb(aspects: &mut [Aspect]) {
    aspects.sort_by(|a, b| a.orb.total_cmp(&b.orb));
}

/// Whether any reported aspect already names this angle (under any alias).
pub fn references_angle<'a, I>(endpoints: I, angle_token: &str) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let wanted = canonical_point(angle_token);
    endpoints
        .into_iter()
        .any(|(p1, p2)| canonical_point(p1) == wanted || canonical_point(p2) == wanted)
}
