//! Bounding boxes, transforms and hit testing over the document arena.

use crate::dom::{Document, NodeId};
use crate::primitives::{Point, Rect};

/// Minimum hit distance for thin lines, in user units.
pub const MIN_LINE_HIT: f64 = 3.0;

/// Longest chain of `<use>` references followed when sizing an element.
const MAX_USE_HOPS: usize = 8;

/// Elements that draw something and can be hit.
const DRAWABLE: &[&str] = &[
    "circle", "ellipse", "rect", "line", "text", "use", "image", "polygon", "polyline", "path",
];

/// Containers whose contents are never rendered directly.
const NON_RENDERED: &[&str] = &[
    "defs", "symbol", "clipPath", "mask", "marker", "pattern", "linearGradient",
    "radialGradient", "style", "script", "title", "desc", "metadata",
];

/// 2D affine transform `[a c e; b d f; 0 0 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self * other`: `other` is applied first.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn apply_rect(&self, r: &Rect) -> Option<Rect> {
        Rect::from_points(r.corners().iter().map(|p| self.apply(*p)))
    }

    /// Mean scale factor, used to size stroke widths in document space.
    pub fn mean_scale(&self) -> f64 {
        ((self.a * self.d - self.b * self.c).abs()).sqrt()
    }

    /// Parse an SVG `transform` list. Unknown functions are skipped.
    pub fn parse(value: &str) -> Transform {
        let mut result = Transform::IDENTITY;
        let mut rest = value;
        while let Some(open) = rest.find('(') {
            let name = rest[..open].trim().trim_start_matches(',').trim();
            let Some(close) = rest[open..].find(')') else {
                break;
            };
            let args = parse_numbers(&rest[open + 1..open + close]);
            let step = match (name, args.as_slice()) {
                ("translate", [tx]) => Some(Transform::translate(*tx, 0.0)),
                ("translate", [tx, ty]) => Some(Transform::translate(*tx, *ty)),
                ("scale", [s]) => Some(Transform::scale(*s, *s)),
                ("scale", [sx, sy]) => Some(Transform::scale(*sx, *sy)),
                ("rotate", [deg]) => Some(Transform::rotate(*deg)),
                ("rotate", [deg, cx, cy]) => Some(
                    Transform::translate(*cx, *cy)
                        .then(&Transform::rotate(*deg))
                        .then(&Transform::translate(-cx, -cy)),
                ),
                ("matrix", [a, b, c, d, e, f]) => Some(Transform {
                    a: *a,
                    b: *b,
                    c: *c,
                    d: *d,
                    e: *e,
                    f: *f,
                }),
                _ => {
                    log::debug!("ignoring transform function {:?}", name);
                    None
                }
            };
            if let Some(step) = step {
                result = result.then(&step);
            }
            rest = &rest[open + close + 1..];
        }
        result
    }
}

/// All numbers in a list separated by whitespace and/or commas.
pub fn parse_numbers(s: &str) -> Vec<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut out = Vec::new();
    while let Some(n) = next_number(s, bytes, &mut i) {
        out.push(n);
    }
    out
}

fn skip_sep(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && matches!(bytes[*i], b' ' | b'\n' | b'\r' | b'\t' | b',') {
        *i += 1;
    }
}

fn next_number(s: &str, bytes: &[u8], i: &mut usize) -> Option<f64> {
    skip_sep(bytes, i);
    let start = *i;
    if *i < bytes.len() && matches!(bytes[*i], b'+' | b'-') {
        *i += 1;
    }
    while *i < bytes.len() && bytes[*i].is_ascii_digit() {
        *i += 1;
    }
    if *i < bytes.len() && bytes[*i] == b'.' {
        *i += 1;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
    }
    if *i < bytes.len() && matches!(bytes[*i], b'e' | b'E') {
        *i += 1;
        if *i < bytes.len() && matches!(bytes[*i], b'+' | b'-') {
            *i += 1;
        }
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
    }
    if *i == start {
        return None;
    }
    s[start..*i].parse().ok()
}

/// Bounds of a path made of absolute commands. Relative commands are not
/// resolved and make the path unmeasurable.
pub fn path_bounds(d: &str) -> Option<Rect> {
    let bytes = d.as_bytes();
    let mut i = 0;
    let mut points = Vec::new();
    let mut current = Point::default();
    let mut command = b'M';

    loop {
        skip_sep(bytes, &mut i);
        if i >= bytes.len() {
            break;
        }
        if bytes[i].is_ascii_alphabetic() {
            command = bytes[i];
            i += 1;
            if command == b'Z' || command == b'z' {
                continue;
            }
            if command.is_ascii_lowercase() {
                return None;
            }
        }
        let arity = match command {
            b'M' | b'L' | b'T' => 2,
            b'H' | b'V' => 1,
            b'Q' | b'S' => 4,
            b'C' => 6,
            b'A' => 7,
            _ => return None,
        };
        let mut args = Vec::with_capacity(arity);
        for _ in 0..arity {
            args.push(next_number(d, bytes, &mut i)?);
        }
        match command {
            b'H' => current = Point::new(args[0], current.y),
            b'V' => current = Point::new(current.x, args[0]),
            b'A' => current = Point::new(args[5], args[6]),
            _ => {
                for pair in args.chunks(2) {
                    points.push(Point::new(pair[0], pair[1]));
                }
                current = Point::new(args[arity - 2], args[arity - 1]);
            }
        }
        points.push(current);
    }

    Rect::from_points(points)
}

fn length(doc: &Document, id: NodeId, name: &str) -> Option<f64> {
    let raw = doc.attr(id, name)?.trim();
    if raw.ends_with('%') {
        return None;
    }
    raw.trim_end_matches("px").trim().parse().ok()
}

fn length_or_zero(doc: &Document, id: NodeId, name: &str) -> f64 {
    length(doc, id, name).unwrap_or(0.0)
}

impl Document {
    /// The element's own `transform` attribute.
    pub fn own_transform(&self, id: NodeId) -> Transform {
        self.attr(id, "transform")
            .map(Transform::parse)
            .unwrap_or_default()
    }

    /// Transform from the element's local space to document space, including
    /// its own `transform`.
    pub fn ctm(&self, id: NodeId) -> Transform {
        let mut chain: Vec<NodeId> = self.ancestors(id);
        chain.reverse();
        chain.push(id);
        chain
            .into_iter()
            .fold(Transform::IDENTITY, |acc, n| acc.then(&self.own_transform(n)))
    }

    /// Bounds in the element's own coordinate system, before its `transform`.
    pub fn local_bbox(&self, id: NodeId) -> Option<Rect> {
        self.local_bbox_within(id, 0)
    }

    // `hops` counts `<use>` indirections taken so far; reference cycles end at the cap.
    fn local_bbox_within(&self, id: NodeId, hops: usize) -> Option<Rect> {
        let name = self.name(id)?;
        match name {
            "circle" => {
                let r = length(self, id, "r")?;
                let (cx, cy) = (length_or_zero(self, id, "cx"), length_or_zero(self, id, "cy"));
                Some(Rect::new(cx - r, cy - r, r * 2.0, r * 2.0))
            }
            "ellipse" => {
                let rx = length(self, id, "rx")?;
                let ry = length(self, id, "ry")?;
                let (cx, cy) = (length_or_zero(self, id, "cx"), length_or_zero(self, id, "cy"));
                Some(Rect::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0))
            }
            "rect" | "image" => Some(Rect::new(
                length_or_zero(self, id, "x"),
                length_or_zero(self, id, "y"),
                length(self, id, "width")?,
                length(self, id, "height")?,
            )),
            "use" => {
                let (x, y) = (length_or_zero(self, id, "x"), length_or_zero(self, id, "y"));
                match (length(self, id, "width"), length(self, id, "height")) {
                    (Some(w), Some(h)) => Some(Rect::new(x, y, w, h)),
                    _ => {
                        if hops >= MAX_USE_HOPS {
                            log::debug!("use reference chain too deep, no bounds");
                            return None;
                        }
                        let target = self.attr(id, "href")?.trim_start_matches('#');
                        let referenced = self.get_by_id(target)?;
                        let inner = self.local_bbox_within(referenced, hops + 1)?;
                        Some(Rect::new(inner.x + x, inner.y + y, inner.width, inner.height))
                    }
                }
            }
            "line" => Rect::from_points([
                Point::new(length_or_zero(self, id, "x1"), length_or_zero(self, id, "y1")),
                Point::new(length_or_zero(self, id, "x2"), length_or_zero(self, id, "y2")),
            ]),
            "polygon" | "polyline" => {
                let numbers = parse_numbers(self.attr(id, "points")?);
                Rect::from_points(numbers.chunks_exact(2).map(|p| Point::new(p[0], p[1])))
            }
            "path" => path_bounds(self.attr(id, "d")?),
            "text" => {
                let text = self.text_content(id);
                let chars = text.trim().chars().count();
                if chars == 0 {
                    return None;
                }
                let size = length(self, id, "font-size").unwrap_or(16.0);
                let width = chars as f64 * size * 0.6;
                let x = length_or_zero(self, id, "x");
                let y = length_or_zero(self, id, "y");
                let left = match self.attr(id, "text-anchor") {
                    Some("middle") => x - width / 2.0,
                    Some("end") => x - width,
                    _ => x,
                };
                Some(Rect::new(left, y - size, width, size))
            }
            "g" | "svg" | "a" | "switch" => {
                let mut bounds: Option<Rect> = None;
                for child in self.children(id) {
                    if !self.is_element(*child) || self.is_non_rendered(*child) {
                        continue;
                    }
                    let Some(child_box) = self.local_bbox_within(*child, hops) else {
                        continue;
                    };
                    let Some(mapped) = self.own_transform(*child).apply_rect(&child_box) else {
                        continue;
                    };
                    bounds = Some(match bounds {
                        Some(b) => b.union(&mapped),
                        None => mapped,
                    });
                }
                bounds
            }
            _ => None,
        }
    }

    /// Bounds in document space.
    pub fn bbox(&self, id: NodeId) -> Option<Rect> {
        let local = self.local_bbox(id)?;
        self.ctm(id).apply_rect(&local)
    }

    fn is_non_rendered(&self, id: NodeId) -> bool {
        match self.name(id) {
            Some(name) => NON_RENDERED.contains(&name) || self.attr(id, "display") == Some("none"),
            None => false,
        }
    }

    /// Whether anything on the path from the root hides this element.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.is_non_rendered(id) || self.ancestors(id).iter().any(|a| self.is_non_rendered(*a))
    }

    pub fn is_drawable(&self, id: NodeId) -> bool {
        matches!(self.name(id), Some(name) if DRAWABLE.contains(&name))
    }

    /// Line endpoints in document space.
    pub fn line_endpoints(&self, id: NodeId) -> Option<(Point, Point)> {
        if self.name(id)? != "line" {
            return None;
        }
        let ctm = self.ctm(id);
        Some((
            ctm.apply(Point::new(length_or_zero(self, id, "x1"), length_or_zero(self, id, "y1"))),
            ctm.apply(Point::new(length_or_zero(self, id, "x2"), length_or_zero(self, id, "y2"))),
        ))
    }

    fn hits(&self, id: NodeId, point: Point) -> bool {
        if let Some((from, to)) = self.line_endpoints(id) {
            let width = length(self, id, "stroke-width").unwrap_or(1.0) * self.ctm(id).mean_scale();
            let tolerance = (width / 2.0).max(MIN_LINE_HIT);
            return distance_to_segment(point, from, to) <= tolerance;
        }
        matches!(self.bbox(id), Some(b) if b.contains(point))
    }

    /// Drawable elements under `point` in `subtree`, topmost first.
    pub fn elements_at_in(&self, subtree: NodeId, point: Point) -> Vec<NodeId> {
        let mut hits: Vec<NodeId> = self
            .descendants(subtree)
            .into_iter()
            .filter(|n| self.is_drawable(*n) && !self.is_hidden(*n) && self.hits(*n, point))
            .collect();
        hits.reverse();
        hits
    }

    pub fn elements_at(&self, point: Point) -> Vec<NodeId> {
        self.elements_at_in(self.root(), point)
    }
}

pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_parse_and_compose() {
        let t = Transform::parse("translate(10, 20) scale(2)");
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 22.0));
        let m = Transform::parse("matrix(1 0 0 1 5 6) skewX(10)");
        assert_eq!(m.apply(Point::new(0.0, 0.0)), Point::new(5.0, 6.0));
    }

    #[test]
    fn test_path_bounds_absolute_only() {
        assert_eq!(
            path_bounds("M10 10 L20 5 H30 V40 Z"),
            Some(Rect::new(10.0, 5.0, 20.0, 35.0))
        );
        assert_eq!(path_bounds("m10 10 l5 5"), None);
    }

    #[test]
    fn test_use_follows_reference() {
        let doc = Document::parse(
            r##"<svg><defs><circle id="dot" cx="5" cy="5" r="2"/></defs><use id="u" href="#dot" x="10"/></svg>"##,
        )
        .unwrap();
        let u = doc.get_by_id("u").unwrap();
        assert_eq!(doc.local_bbox(u), Some(Rect::new(13.0, 3.0, 4.0, 4.0)));
    }

    #[test]
    fn test_use_reference_cycles_have_no_bounds() {
        let doc = Document::parse(
            r##"<svg>
                <use id="planet-sun" href="#planet-sun"/>
                <use id="a" href="#b"/><use id="b" href="#a"/>
                <g id="wrap"><use id="inner" href="#wrap"/></g>
            </svg>"##,
        )
        .unwrap();
        for id in ["planet-sun", "a", "b", "inner", "wrap"] {
            let node = doc.get_by_id(id).unwrap();
            assert_eq!(doc.bbox(node), None, "{id}");
        }
        assert!(doc.elements_at(Point::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_parse_numbers_handles_exponents_and_signs() {
        assert_eq!(parse_numbers("1,-2 3.5e1 -.5"), vec![1.0, -2.0, 35.0, -0.5]);
    }
}
