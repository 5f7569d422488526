use serde::{Deserialize, Serialize};

/// Aspect type. The exact degree of each kind is fixed by [`AspectKind::degree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
    SemiSextile,
    SemiSquare,
    Quintile,
    BiQuintile,
    Sesquiquadrate,
    Quincunx,
}

/// (kind, canonical name, exact degree, major)
const ASPECT_TABLE: &[(AspectKind, &str, f64, bool)] = &[
    (AspectKind::Conjunction, "conjunction", 0.0, true),
    (AspectKind::Sextile, "sextile", 60.0, true),
    (AspectKind::Square, "square", 90.0, true),
    (AspectKind::Trine, "trine", 120.0, true),
    (AspectKind::Opposition, "opposition", 180.0, true),
    (AspectKind::SemiSextile, "semi_sextile", 30.0, false),
    (AspectKind::SemiSquare, "semi_square", 45.0, false),
    (AspectKind::Quintile, "quintile", 72.0, false),
    (AspectKind::BiQuintile, "bi_quintile", 144.0, false),
    (AspectKind::Sesquiquadrate, "sesquiquadrate", 135.0, false),
    (AspectKind::Quincunx, "quincunx", 150.0, false),
];

impl AspectKind {
    fn row(&self) -> &'static (AspectKind, &'static str, f64, bool) {
        ASPECT_TABLE
            .iter()
            .find(|(k, ..)| k == self)
            .unwrap_or(&ASPECT_TABLE[0])
    }

    pub fn degree(&self) -> f64 {
        self.row().2
    }

    pub fn is_major(&self) -> bool {
        self.row().3
    }

    pub fn as_str(&self) -> &'static str {
        self.row().1
    }

    /// Human label: "Semi-sextile", "Trine"...
    pub fn label(&self) -> String {
        crate::zodiac::capitalize_first(&self.as_str().replace('_', "-"))
    }

    /// Parse the many spellings upstream payloads use.
    pub fn from_name(name: &str) -> Option<Self> {
        let flat: String = name
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        let kind = match flat.as_str() {
            "conjunction" | "conjunct" => AspectKind::Conjunction,
            "sextile" => AspectKind::Sextile,
            "square" | "quadrature" => AspectKind::Square,
            "trine" => AspectKind::Trine,
            "opposition" | "opposite" => AspectKind::Opposition,
            "semisextile" => AspectKind::SemiSextile,
            "semisquare" | "octile" => AspectKind::SemiSquare,
            "quintile" => AspectKind::Quintile,
            "biquintile" => AspectKind::BiQuintile,
            "sesquiquadrate" | "sesquisquare" | "sesquiquadrature" => AspectKind::Sesquiquadrate,
            "quincunx" | "inconjunct" => AspectKind::Quincunx,
            _ => return None,
        };
        Some(kind)
    }

    pub fn all() -> impl Iterator<Item = AspectKind> {
        ASPECT_TABLE.iter().map(|(k, ..)| *k)
    }
}

/// Canonical aspect with the tolerance used when deriving it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectDefinition {
    pub kind: AspectKind,
    pub exact_degree: f64,
    pub max_orb: f64,
}

impl AspectDefinition {
    pub const fn new(kind: AspectKind, exact_degree: f64, max_orb: f64) -> Self {
        Self {
            kind,
            exact_degree,
            max_orb,
        }
    }
}

/// Aspects checked between chart angles and planets.
pub const ANGLE_ASPECTS: [AspectDefinition; 5] = [
    AspectDefinition::new(AspectKind::Conjunction, 0.0, 6.0),
    AspectDefinition::new(AspectKind::Sextile, 60.0, 4.5),
    AspectDefinition::new(AspectKind::Square, 90.0, 6.0),
    AspectDefinition::new(AspectKind::Trine, 120.0, 6.0),
    AspectDefinition::new(AspectKind::Opposition, 180.0, 6.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectSource {
    Upstream,
    Derived,
}

/// A normalized aspect between two charted points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    /// Endpoint tokens, in the order they were reported.
    pub p1: String,
    pub p2: String,
    pub kind: AspectKind,
    /// Absolute deviation from the exact degree; never negative.
    pub orb: f64,
    pub major: bool,
    pub source: AspectSource,
}

impl Aspect {
    pub fn exact_degree(&self) -> f64 {
        self.kind.degree()
    }

    pub fn involves(&self, token: &str) -> bool {
        let wanted = crate::points::canonical_point(token);
        crate::points::canonical_point(&self.p1) == wanted
            || crate::points::canonical_point(&self.p2) == wanted
    }

    /// Endpoint opposite to `token`, if the aspect involves it.
    pub fn other_end(&self, token: &str) -> Option<&str> {
        let wanted = crate::points::canonical_point(token);
        if crate::points::canonical_point(&self.p1) == wanted {
            Some(&self.p2)
        } else if crate::points::canonical_point(&self.p2) == wanted {
            Some(&self.p1)
        } else {
            None
        }
    }

    /// Stable identity used by the aspects table and the chart overlay.
    pub fn key(&self) -> String {
        format!(
            "{}.{}.{}",
            crate::points::canonical_point(&self.p1),
            self.kind.as_str(),
            crate::points::canonical_point(&self.p2)
        )
    }
}
