use crate::aspects::AspectKind;
use crate::dom::{Document, NodeId};
use crate::overlay::lines::{
    collect_aspect_lines, collect_body_markers, enclosing_aspect_line, within_aspect_line,
    AspectLine, BodyMarker,
};
use crate::overlay::snapshot::SnapshotStore;
use crate::overlay::tokens::{resolve_with_ancestors, ChartToken};
use crate::overlay::tooltip::{place_tooltip, TooltipSize, Viewport};
use crate::points::canonical_point;
use crate::primitives::{Point, Rect};
use std::collections::BTreeMap;

/// Probe ring radius around the pointer.
pub const PROBE_OFFSET: f64 = 8.0;
/// Nearest-marker fallback radius.
pub const NEAREST_MARKER_RADIUS: f64 = 22.0;
/// Opacity applied to aspect lines that are not selected.
pub const DIMMED_OPACITY: &str = "0.04";
/// Scale applied to the selected aspect's endpoint glyphs.
pub const EMPHASIS_SCALE: f64 = 1.35;

#[derive(Debug, Clone, PartialEq)]
pub struct Hover {
    pub token: ChartToken,
    pub at: Point,
    pub tooltip: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub key: String,
    pub line: NodeId,
    pub endpoints: Option<(String, String)>,
    pub hover: Option<Hover>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    Idle,
    HoverActive(Hover),
    SelectionActive(Selection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    PointerMoved(Point),
    PointerLeft,
    Clicked(Point),
    /// A row of the aspects table was activated.
    AspectChosen {
        p1: String,
        kind: AspectKind,
        p2: String,
    },
    Resized(Viewport),
}

/// Attribute values the overlay wants applied, keyed by element and name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualState {
    attrs: BTreeMap<(NodeId, String), String>,
}

impl VisualState {
    fn set(&mut self, node: NodeId, attr: &str, value: String) {
        self.attrs.insert((node, attr.to_string()), value);
    }

    pub fn get(&self, node: NodeId, attr: &str) -> Option<&str> {
        self.attrs.get(&(node, attr.to_string())).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// What one event changed in the markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    pub applied: usize,
    pub reverted: usize,
}

fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        let s = format!("{:.3}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Pull a `stroke` value out of the attribute or an inline style.
fn stroke_color(original_stroke: Option<String>, style: Option<String>) -> Option<String> {
    original_stroke
        .filter(|s| !s.trim().is_empty() && s.trim() != "none")
        .or_else(|| {
            style?.split(';').find_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                (name.trim() == "stroke" && value.trim() != "none")
                    .then(|| value.trim().to_string())
            })
        })
}

/// Event-driven controller over a chart embedded in a document.
///
/// All markup mutation goes through the snapshot store; every transition
/// computes the full target visual state and diffs it against the last one.
pub struct OverlayController {
    chart_root: NodeId,
    markers: Vec<BodyMarker>,
    lines: Vec<AspectLine>,
    snapshot: SnapshotStore,
    visual: VisualState,
    state: OverlayState,
    viewport: Viewport,
    tooltip_size: TooltipSize,
}

impl OverlayController {
    /// Index the chart under `chart_root`.
    pub fn attach(doc: &Document, chart_root: NodeId) -> Self {
        let markers = collect_body_markers(doc, chart_root);
        let lines = collect_aspect_lines(doc, chart_root, &markers);
        log::debug!(
            "overlay attached: {} body markers, {} aspect lines",
            markers.len(),
            lines.len()
        );
        Self {
            chart_root,
            markers,
            lines,
            snapshot: SnapshotStore::new(),
            visual: VisualState::default(),
            state: OverlayState::Idle,
            viewport: Viewport::default(),
            tooltip_size: TooltipSize::default(),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn markers(&self) -> &[BodyMarker] {
        &self.markers
    }

    pub fn lines(&self) -> &[AspectLine] {
        &self.lines
    }

    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    pub fn hovered(&self) -> Option<&Hover> {
        match &self.state {
            OverlayState::HoverActive(h) => Some(h),
            OverlayState::SelectionActive(s) => s.hover.as_ref(),
            OverlayState::Idle => None,
        }
    }

    pub fn selected(&self) -> Option<&Selection> {
        match &self.state {
            OverlayState::SelectionActive(s) => Some(s),
            _ => None,
        }
    }

    /// Token under the pointer.
    ///
    /// Exact body hits in the probe ring win; then an exact sign or house
    /// hit; only with no exact hit at all, the nearest body marker in range.
    pub fn resolve_hover(&self, doc: &Document, pointer: Point) -> Option<ChartToken> {
        let d = PROBE_OFFSET;
        let offsets = [
            (0.0, 0.0),
            (-d, 0.0),
            (d, 0.0),
            (0.0, -d),
            (0.0, d),
            (-d, -d),
            (d, -d),
            (-d, d),
            (d, d),
        ];
        let mut secondary: Option<ChartToken> = None;
        for (dx, dy) in offsets {
            for hit in doc.elements_at_in(self.chart_root, pointer.offset(dx, dy)) {
                if within_aspect_line(doc, hit, self.chart_root) {
                    continue;
                }
                let Some(resolution) = resolve_with_ancestors(doc, hit, self.chart_root) else {
                    continue;
                };
                if resolution.token.is_body() {
                    return Some(resolution.token);
                }
                if secondary.is_none() {
                    secondary = Some(resolution.token);
                }
            }
        }
        if secondary.is_some() {
            return secondary;
        }

        let nearest = self
            .markers
            .iter()
            .map(|m| (m, m.center.distance(pointer)))
            .filter(|(_, dist)| *dist <= NEAREST_MARKER_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        nearest.map(|(marker, _)| ChartToken::Body(marker.token.clone()))
    }

    fn line_at(&self, doc: &Document, pointer: Point) -> Option<&AspectLine> {
        doc.elements_at_in(self.chart_root, pointer)
            .into_iter()
            .find_map(|hit| {
                let line = enclosing_aspect_line(doc, hit, self.chart_root)?;
                self.lines.iter().find(|l| l.node == line)
            })
    }

    fn find_line(&self, p1: &str, kind: AspectKind, p2: &str) -> Option<&AspectLine> {
        let candidates = self.lines.iter().filter(|l| l.connects(p1, p2));
        let mut fallback = None;
        for line in candidates {
            match line.kind {
                Some(k) if k == kind => return Some(line),
                None if fallback.is_none() => fallback = Some(line),
                _ => {}
            }
        }
        fallback
    }

    fn hover_at(&self, doc: &Document, pointer: Point) -> Option<Hover> {
        self.resolve_hover(doc, pointer).map(|token| Hover {
            token,
            at: pointer,
            tooltip: place_tooltip(pointer, self.tooltip_size, self.viewport),
        })
    }

    fn toggle(&self, line: &AspectLine, hover: Option<Hover>) -> OverlayState {
        if let OverlayState::SelectionActive(current) = &self.state {
            if current.key == line.key {
                return match hover {
                    Some(h) => OverlayState::HoverActive(h),
                    None => OverlayState::Idle,
                };
            }
        }
        OverlayState::SelectionActive(Selection {
            key: line.key.clone(),
            line: line.node,
            endpoints: line.endpoints.clone(),
            hover,
        })
    }

    fn current_hover(&self) -> Option<Hover> {
        self.hovered().cloned()
    }

    fn with_hover(&self, hover: Option<Hover>) -> OverlayState {
        match &self.state {
            OverlayState::SelectionActive(s) => OverlayState::SelectionActive(Selection {
                hover,
                ..s.clone()
            }),
            _ => match hover {
                Some(h) => OverlayState::HoverActive(h),
                None => OverlayState::Idle,
            },
        }
    }

    /// Feed one event; mutates the chart markup as needed.
    pub fn handle(&mut self, doc: &mut Document, event: OverlayEvent) -> Transition {
        let next = match event {
            OverlayEvent::PointerMoved(p) => {
                let hover = self.hover_at(doc, p);
                self.with_hover(hover)
            }
            OverlayEvent::PointerLeft => self.with_hover(None),
            OverlayEvent::Clicked(p) => match self.line_at(doc, p) {
                Some(line) => self.toggle(line, self.current_hover()),
                None => self.state.clone(),
            },
            OverlayEvent::AspectChosen { p1, kind, p2 } => match self.find_line(&p1, kind, &p2) {
                Some(line) => self.toggle(line, self.current_hover()),
                None => {
                    log::debug!(
                        "no chart line for {} {} {}; nothing to emphasize",
                        canonical_point(&p1),
                        kind.as_str(),
                        canonical_point(&p2)
                    );
                    self.state.clone()
                }
            },
            OverlayEvent::Resized(viewport) => {
                self.viewport = viewport;
                let hover = self.current_hover().map(|h| Hover {
                    tooltip: place_tooltip(h.at, self.tooltip_size, viewport),
                    ..h
                });
                self.with_hover(hover)
            }
        };
        self.state = next;
        let target = self.target_visual(doc);
        self.apply(doc, target)
    }

    /// Revert every mutation and return to idle.
    pub fn reset(&mut self, doc: &mut Document) -> Transition {
        self.state = OverlayState::Idle;
        self.apply(doc, VisualState::default())
    }

    fn target_visual(&self, doc: &Document) -> VisualState {
        let mut target = VisualState::default();
        let OverlayState::SelectionActive(selection) = &self.state else {
            return target;
        };

        for line in &self.lines {
            if line.key != selection.key {
                target.set(line.node, "opacity", DIMMED_OPACITY.to_string());
            }
        }

        let Some((a, b)) = &selection.endpoints else {
            return target;
        };
        let color = stroke_color(
            self.snapshot.original(doc, selection.line, "stroke"),
            self.snapshot.original(doc, selection.line, "style"),
        );

        for marker in self.markers.iter().filter(|m| m.token == *a || m.token == *b) {
            match doc.local_bbox(marker.node) {
                Some(bbox) => {
                    let c = bbox.center();
                    let scale = format!(
                        "translate({} {}) scale({}) translate({} {})",
                        fmt_num(c.x),
                        fmt_num(c.y),
                        EMPHASIS_SCALE,
                        fmt_num(-c.x),
                        fmt_num(-c.y)
                    );
                    let transform = match self.snapshot.original(doc, marker.node, "transform") {
                        Some(orig) if !orig.trim().is_empty() => {
                            format!("{} {}", orig.trim(), scale)
                        }
                        _ => scale,
                    };
                    target.set(marker.node, "transform", transform);
                }
                None => {
                    log::debug!("no bounding box for {} glyph; leaving transform", marker.token)
                }
            }
            if let Some(color) = &color {
                target.set(marker.node, "fill", color.clone());
                target.set(marker.node, "stroke", color.clone());
            }
        }
        target
    }

    fn apply(&mut self, doc: &mut Document, target: VisualState) -> Transition {
        let mut transition = Transition::default();
        for (node, attr) in self.visual.attrs.keys() {
            if !target.attrs.contains_key(&(*node, attr.clone())) {
                self.snapshot.restore(doc, *node, attr);
                transition.reverted += 1;
            }
        }
        for ((node, attr), value) in &target.attrs {
            if self.visual.get(*node, attr) != Some(value.as_str()) {
                self.snapshot.set(doc, *node, attr, value);
                transition.applied += 1;
            }
        }
        self.visual = target;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(10.0), "10");
        assert_eq!(fmt_num(-2.5), "-2.5");
        assert_eq!(fmt_num(1.23456), "1.235");
    }

    #[test]
    fn test_stroke_color_from_style() {
        assert_eq!(stroke_color(Some("#f00".into()), None), Some("#f00".into()));
        assert_eq!(
            stroke_color(None, Some("opacity:1; stroke: #00f".into())),
            Some("#00f".into())
        );
        assert_eq!(stroke_color(Some("none".into()), None), None);
    }
}
