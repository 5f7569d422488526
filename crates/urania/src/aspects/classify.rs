use crate::geometry::{orb_from_delta, project_longitude};
use serde::{Deserialize, Serialize};

/// Projection step for phase classification: one hour.
pub const PHASE_STEP_DAYS: f64 = 1.0 / 24.0;
/// Orb changes smaller than this are treated as no motion.
pub const PHASE_TOLERANCE: f64 = 0.0005;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AspectStrength {
    /// 5..=100
    pub score: u8,
    pub label: &'static str,
}

impl AspectStrength {
    pub fn from_orb(orb: f64) -> Self {
        let orb = orb.abs();
        let score = (100.0 - orb * 10.0).round().clamp(5.0, 100.0) as u8;
        let label = if orb <= 1.5 {
            "Very strong"
        } else if orb <= 3.0 {
            "Strong"
        } else if orb <= 5.0 {
            "Moderate"
        } else if orb <= 7.0 {
            "Subtle"
        } else {
            "Faint"
        };
        Self { score, label }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectPhase {
    Applying,
    Separating,
    Unknown,
}

impl AspectPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectPhase::Applying => "Applying",
            AspectPhase::Separating => "Separating",
            AspectPhase::Unknown => "Unknown",
        }
    }
}

/// A charted point's longitude and signed daily motion (retrograde is negative).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub longitude: f64,
    pub speed: Option<f64>,
}

impl Motion {
    pub fn new(longitude: f64, speed: Option<f64>) -> Self {
        Self { longitude, speed }
    }

    pub fn stationary(longitude: f64) -> Self {
        Self {
            longitude,
            speed: Some(0.0),
        }
    }
}

/// Applying when the orb shrinks over the next hour, separating when it grows.
pub fn aspect_phase(a: Motion, b: Motion, aspect_degree: f64) -> AspectPhase {
    let (Some(speed_a), Some(speed_b)) = (a.speed, b.speed) else {
        return AspectPhase::Unknown;
    };
    if !speed_a.is_finite() || !speed_b.is_finite() {
        return AspectPhase::Unknown;
    }

    let orb_now = orb_from_delta(b.longitude - a.longitude, aspect_degree);
    let future_a = project_longitude(a.longitude, speed_a, PHASE_STEP_DAYS);
    let future_b = project_longitude(b.longitude, speed_b, PHASE_STEP_DAYS);
    let orb_next = orb_from_delta(future_b - future_a, aspect_degree);

    let change = orb_next - orb_now;
    if change.abs() < PHASE_TOLERANCE {
        AspectPhase::Unknown
    } else if change < 0.0 {
        AspectPhase::Applying
    } else {
        AspectPhase::Separating
    }
}
