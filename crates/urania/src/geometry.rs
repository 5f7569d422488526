//! Angle arithmetic on the ecliptic circle.
//!
//! Every orb or delta comparison goes through [`normalize_signed_180`] first so
//! that pairs straddling 0°/360° compare correctly.

/// Reduce any angle to the half-open range (-180, 180].
pub fn normalize_signed_180(x: f64) -> f64 {
    let mut a = x % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Reduce any angle to [0, 360).
pub fn normalize_360(x: f64) -> f64 {
    let a = x % 360.0;
    if a < 0.0 {
        // -1e-15 % 360 + 360 rounds to 360.0
        let wrapped = a + 360.0;
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    } else {
        a
    }
}

/// Unsigned shortest distance between two absolute longitudes, in [0, 180].
pub fn circular_distance(a: f64, b: f64) -> f64 {
    normalize_signed_180(b - a).abs()
}

/// Orb of an observed separation `delta` against an aspect's exact degree.
///
/// For the conjunction the orb is the plain normalized delta; every other aspect
/// is checked in both rotation directions around the axis.
pub fn orb_from_delta(delta: f64, aspect_degree: f64) -> f64 {
    if aspect_degree == 0.0 {
        return normalize_signed_180(delta).abs();
    }
    let forward = normalize_signed_180(delta - aspect_degree).abs();
    let backward = normalize_signed_180(delta + aspect_degree).abs();
    forward.min(backward)
}

/// Longitude after `days` of motion at `speed` degrees/day.
pub fn project_longitude(lon: f64, speed: f64, days: f64) -> f64 {
    normalize_360(lon + speed * days)
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_signed_180_edges() {
        assert_eq!(normalize_signed_180(180.0), 180.0);
        assert_eq!(normalize_signed_180(-180.0), 180.0);
        assert_eq!(normalize_signed_180(540.0), 180.0);
        assert_eq!(normalize_signed_180(190.0), -170.0);
        assert_eq!(normalize_signed_180(-190.0), 170.0);
        assert_eq!(normalize_signed_180(0.0), 0.0);
    }

    #[test]
    fn test_normalize_360() {
        assert_eq!(normalize_360(370.0), 10.0);
        assert_eq!(normalize_360(-10.0), 350.0);
        assert_eq!(normalize_360(720.0), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(5.900000000000006), 5.9);
        assert_eq!(round2(1.005), 1.0);
    }
}
