use crate::aspects::AspectKind;
use crate::dom::{Document, NodeId};
use crate::overlay::tokens::{resolve_element, ChartToken};
use crate::points::canonical_point;
use crate::primitives::Point;

/// A body glyph in the chart and its center in document space.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyMarker {
    pub token: String,
    pub node: NodeId,
    pub center: Point,
}

/// An aspect line primitive found in the chart markup.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectLine {
    pub node: NodeId,
    /// Stable identity across re-renders of the same markup.
    pub key: String,
    pub endpoints: Option<(String, String)>,
    pub kind: Option<AspectKind>,
}

impl AspectLine {
    pub fn connects(&self, a: &str, b: &str) -> bool {
        let (a, b) = (canonical_point(a), canonical_point(b));
        match &self.endpoints {
            Some((x, y)) => (*x == a && *y == b) || (*x == b && *y == a),
            None => false,
        }
    }
}

fn marks_aspect(doc: &Document, node: NodeId) -> bool {
    let Some(element) = doc.element(node) else {
        return false;
    };
    element.attr("data-aspect").is_some()
        || element
            .classes()
            .any(|c| c == "aspect" || c.starts_with("aspect-") || c.starts_with("aspect_"))
        || element
            .attr("id")
            .map(|id| id.to_lowercase().starts_with("aspect"))
            .unwrap_or(false)
}

/// Whether `node` or one of its ancestors (below `root`) is an aspect line.
pub fn within_aspect_line(doc: &Document, node: NodeId, root: NodeId) -> bool {
    if marks_aspect(doc, node) {
        return true;
    }
    for ancestor in doc.ancestors(node) {
        if ancestor == root {
            break;
        }
        if marks_aspect(doc, ancestor) {
            return true;
        }
    }
    false
}

/// The outermost aspect-line element containing `node`, if any.
pub fn enclosing_aspect_line(doc: &Document, node: NodeId, root: NodeId) -> Option<NodeId> {
    let mut found = marks_aspect(doc, node).then_some(node);
    for ancestor in doc.ancestors(node) {
        if ancestor == root {
            break;
        }
        if marks_aspect(doc, ancestor) {
            found = Some(ancestor);
        }
    }
    found
}

fn round_coord(v: f64) -> i64 {
    v.round() as i64
}

pub fn line_key(doc: &Document, node: NodeId) -> String {
    if let Some(key) = doc.attr(node, "data-aspect-key").filter(|k| !k.is_empty()) {
        return key.to_string();
    }
    if let Some(id) = doc.attr(node, "id").filter(|k| !k.is_empty()) {
        return id.to_string();
    }
    if let Some((a, b)) = doc.line_endpoints(node) {
        return format!(
            "line:{},{},{},{}",
            round_coord(a.x),
            round_coord(a.y),
            round_coord(b.x),
            round_coord(b.y)
        );
    }
    match doc.bbox(node) {
        Some(r) => format!(
            "box:{},{},{},{}",
            round_coord(r.x),
            round_coord(r.y),
            round_coord(r.width),
            round_coord(r.height)
        ),
        None => format!("node:{}", node.index()),
    }
}

/// Split `aspect-<a>-<type>-<b>` ids into endpoints and kind. Hyphen and
/// underscore separators are both tried; multi-word kinds like `semi-sextile`
/// are matched before single words.
pub fn parse_aspect_id(id: &str) -> Option<(String, AspectKind, String)> {
    let lower = id.trim().to_lowercase();
    for sep in ['-', '_'] {
        let parts: Vec<&str> = lower.split(sep).collect();
        if parts.len() < 4 || !parts[0].starts_with("aspect") {
            continue;
        }
        for i in 2..parts.len() - 1 {
            for span in [2usize, 1] {
                if i + span >= parts.len() {
                    continue;
                }
                let Some(kind) = AspectKind::from_name(&parts[i..i + span].concat()) else {
                    continue;
                };
                let left = parts[1..i].join("_");
                let right = parts[i + span..].join("_");
                if !left.is_empty() && !right.is_empty() {
                    return Some((canonical_point(&left), kind, canonical_point(&right)));
                }
            }
        }
    }
    None
}

fn nearest_marker<'a>(markers: &'a [BodyMarker], p: Point) -> Option<&'a BodyMarker> {
    markers
        .iter()
        .min_by(|a, b| a.center.distance(p).total_cmp(&b.center.distance(p)))
}

type Endpoints = Option<(String, String)>;

fn endpoints_of(
    doc: &Document,
    node: NodeId,
    markers: &[BodyMarker],
) -> (Endpoints, Option<AspectKind>) {
    let element_kind = doc
        .attr(node, "data-aspect")
        .and_then(AspectKind::from_name)
        .or_else(|| {
            doc.element(node).and_then(|e| {
                e.classes()
                    .find_map(|c| AspectKind::from_name(c.trim_start_matches("aspect-")))
            })
        });

    let explicit = match (doc.attr(node, "data-from"), doc.attr(node, "data-to")) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => match (doc.attr(node, "data-p1"), doc.attr(node, "data-p2")) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        },
    };
    if let Some((a, b)) = explicit {
        return (Some((canonical_point(a), canonical_point(b))), element_kind);
    }

    if let Some((a, kind, b)) = doc.attr(node, "id").and_then(parse_aspect_id) {
        return (Some((a, b)), element_kind.or(Some(kind)));
    }

    let ends = doc.line_endpoints(node).or_else(|| {
        let line = doc
            .descendants(node)
            .into_iter()
            .find(|n| doc.name(*n) == Some("line"))?;
        doc.line_endpoints(line)
    });
    if let Some((from, to)) = ends {
        if let (Some(a), Some(b)) = (nearest_marker(markers, from), nearest_marker(markers, to)) {
            if a.token != b.token {
                return (Some((a.token.clone(), b.token.clone())), element_kind);
            }
        }
    }
    (None, element_kind)
}

/// Body glyphs under `root`: the outermost element naming each body.
pub fn collect_body_markers(doc: &Document, root: NodeId) -> Vec<BodyMarker> {
    let mut markers = Vec::new();
    let mut claimed: Vec<NodeId> = Vec::new();
    for node in doc.descendants(root) {
        if node == root || !doc.is_element(node) || doc.is_hidden(node) {
            continue;
        }
        if claimed.iter().any(|c| doc.ancestors(node).contains(c)) {
            continue;
        }
        if within_aspect_line(doc, node, root) {
            continue;
        }
        let Some(resolution) = resolve_element(doc, node) else {
            continue;
        };
        let ChartToken::Body(token) = resolution.token else {
            continue;
        };
        let Some(bbox) = doc.bbox(node) else {
            continue;
        };
        claimed.push(node);
        markers.push(BodyMarker {
            token,
            node,
            center: bbox.center(),
        });
    }
    markers
}

/// Outermost aspect-line elements under `root`.
pub fn collect_aspect_lines(
    doc: &Document,
    root: NodeId,
    markers: &[BodyMarker],
) -> Vec<AspectLine> {
    let mut lines: Vec<AspectLine> = Vec::new();
    for node in doc.descendants(root) {
        if node == root || !marks_aspect(doc, node) {
            continue;
        }
        if enclosing_aspect_line(doc, node, root) != Some(node) {
            continue;
        }
        let (endpoints, kind) = endpoints_of(doc, node, markers);
        if endpoints.is_none() {
            log::debug!("aspect line {:?} has no resolvable endpoints", doc.attr(node, "id"));
        }
        lines.push(AspectLine {
            node,
            key: line_key(doc, node),
            endpoints,
            kind,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aspect_id() {
        assert_eq!(
            parse_aspect_id("aspect-sun-trine-moon"),
            Some(("sun".into(), AspectKind::Trine, "moon".into()))
        );
        assert_eq!(
            parse_aspect_id("aspect-true-node-semi-sextile-mars"),
            Some(("north_node".into(), AspectKind::SemiSextile, "mars".into()))
        );
        assert_eq!(
            parse_aspect_id("aspect_venus_square_asc"),
            Some(("venus".into(), AspectKind::Square, "ascendant".into()))
        );
        assert_eq!(parse_aspect_id("aspects-layer"), None);
    }
}
