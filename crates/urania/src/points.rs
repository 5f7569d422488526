//! Vocabulary of charted points and their canonical tokens.
//!
//! Upstream payloads and chart markup spell the same point several ways
//! (`true_node`, `Mean_Node`, `asc`, `Ascendant`...). Everything that compares
//! endpoints goes through [`canonical_point`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Planet,
    Node,
    Angle,
    Other,
}

#[derive(Debug, Clone)]
pub struct PointMeta {
    pub token: &'static str,
    pub name: &'static str,
    pub kind: PointKind,
}

lazy_static::lazy_static! {
    static ref POINTS: Vec<PointMeta> = vec![
        PointMeta { token: "sun", name: "Sun", kind: PointKind::Planet },
        PointMeta { token: "moon", name: "Moon", kind: PointKind::Planet },
        PointMeta { token: "mercury", name: "Mercury", kind: PointKind::Planet },
        PointMeta { token: "venus", name: "Venus", kind: PointKind::Planet },
        PointMeta { token: "mars", name: "Mars", kind: PointKind::Planet },
        PointMeta { token: "jupiter", name: "Jupiter", kind: PointKind::Planet },
        PointMeta { token: "saturn", name: "Saturn", kind: PointKind::Planet },
        PointMeta { token: "uranus", name: "Uranus", kind: PointKind::Planet },
        PointMeta { token: "neptune", name: "Neptune", kind: PointKind::Planet },
        PointMeta { token: "pluto", name: "Pluto", kind: PointKind::Planet },
        PointMeta { token: "chiron", name: "Chiron", kind: PointKind::Other },
        PointMeta { token: "lilith", name: "Lilith", kind: PointKind::Other },
        PointMeta { token: "north_node", name: "North Node", kind: PointKind::Node },
        PointMeta { token: "south_node", name: "South Node", kind: PointKind::Node },
        PointMeta { token: "ascendant", name: "Ascendant", kind: PointKind::Angle },
        PointMeta { token: "midheaven", name: "Midheaven", kind: PointKind::Angle },
        PointMeta { token: "descendant", name: "Descendant", kind: PointKind::Angle },
        PointMeta { token: "imum_coeli", name: "Imum Coeli", kind: PointKind::Angle },
    ];

    /// Substring needles for markup probing, longest first so `black_moon`
    /// wins over `moon` and `north_node` over `node`.
    static ref VOCABULARY: Vec<(&'static str, &'static str)> = {
        let mut v = vec![
            ("sun", "sun"),
            ("moon", "moon"),
            ("mercury", "mercury"),
            ("venus", "venus"),
            ("mars", "mars"),
            ("jupiter", "jupiter"),
            ("saturn", "saturn"),
            ("uranus", "uranus"),
            ("neptune", "neptune"),
            ("pluto", "pluto"),
            ("chiron", "chiron"),
            ("lilith", "lilith"),
            ("black_moon", "lilith"),
            ("true_node", "north_node"),
            ("mean_node", "north_node"),
            ("north_node", "north_node"),
            ("south_node", "south_node"),
            ("ascendant", "ascendant"),
            ("midheaven", "midheaven"),
            ("descendant", "descendant"),
            ("imum_coeli", "imum_coeli"),
        ];
        v.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        v
    };
}

fn flatten(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Canonical lowercase token for a point identifier.
///
/// Node variants collapse to `north_node`/`south_node`, angle aliases to their
/// full names. Unknown identifiers are returned flattened but otherwise intact.
pub fn canonical_point(raw: &str) -> String {
    let flat = flatten(raw);
    let canonical = match flat.as_str() {
        "true_node" | "mean_node" | "true_north_node" | "mean_north_node" | "node"
        | "nnode" | "north_lunar_node" => "north_node",
        "true_south_node" | "mean_south_node" | "snode" | "south_lunar_node" => "south_node",
        "asc" | "ac" => "ascendant",
        "mc" | "medium_coeli" => "midheaven",
        "dsc" | "dc" | "desc" => "descendant",
        "ic" => "imum_coeli",
        "black_moon" | "black_moon_lilith" | "mean_lilith" | "true_lilith" => "lilith",
        other => return other.to_string(),
    };
    canonical.to_string()
}

pub fn point_meta(token: &str) -> Option<&'static PointMeta> {
    let canonical = canonical_point(token);
    POINTS.iter().find(|p| p.token == canonical)
}

pub fn is_known_point(token: &str) -> bool {
    point_meta(token).is_some()
}

/// Human name for a token; unknown tokens are title-cased.
pub fn display_name(token: &str) -> String {
    match point_meta(token) {
        Some(p) => p.name.to_string(),
        None => canonical_point(token)
            .split('_')
            .map(crate::zodiac::capitalize_first)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Find the longest vocabulary entry contained in `haystack`.
pub fn vocabulary_match(haystack: &str) -> Option<&'static str> {
    let flat = flatten(haystack);
    VOCABULARY
        .iter()
        .find(|(needle, _)| flat.contains(needle))
        .map(|(_, token)| *token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_point_collapses_nodes_and_angles() {
        assert_eq!(canonical_point("True_Node"), "north_node");
        assert_eq!(canonical_point("mean node"), "north_node");
        assert_eq!(canonical_point("ASC"), "ascendant");
        assert_eq!(canonical_point("mc"), "midheaven");
        assert_eq!(canonical_point("Sun"), "sun");
        assert_eq!(canonical_point("Vesta"), "vesta");
    }

    #[test]
    fn test_vocabulary_match_prefers_longest() {
        assert_eq!(vocabulary_match("glyph-black_moon"), Some("lilith"));
        assert_eq!(vocabulary_match("chart-moon"), Some("moon"));
        assert_eq!(vocabulary_match("Mean-Node-symbol"), Some("north_node"));
        assert_eq!(vocabulary_match("background"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("true_node"), "North Node");
        assert_eq!(display_name("vesta"), "Vesta");
    }
}
