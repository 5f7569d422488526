//! Splice highlight markers into the report body and map DOM positions back
//! to flattened text offsets.

use crate::dom::{Document, NodeId};
use crate::highlights::range::HighlightRange;
use std::collections::HashMap;

pub const MARKER_TAG: &str = "mark";
pub const MARKER_ID_ATTR: &str = "data-highlight-id";

/// Elements whose text is never prose.
const SKIPPED: &[&str] = &["svg", "style", "script"];

/// A text node and where it sits in the flattened text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment {
    pub node: NodeId,
    pub start: usize,
    pub len: usize,
}

impl TextSegment {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Chart subtrees are excluded from offsets and marking.
pub fn is_chart(doc: &Document, node: NodeId) -> bool {
    match doc.name(node) {
        Some(name) => SKIPPED.contains(&name) || doc.attr(node, "data-chart").is_some(),
        None => false,
    }
}

fn in_chart(doc: &Document, node: NodeId, root: NodeId) -> bool {
    if is_chart(doc, node) {
        return true;
    }
    for ancestor in doc.ancestors(node) {
        if is_chart(doc, ancestor) {
            return true;
        }
        if ancestor == root {
            break;
        }
    }
    false
}

/// Text nodes under `root` in document order, chart subtrees skipped.
pub fn text_segments(doc: &Document, root: NodeId) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut offset = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if is_chart(doc, node) {
            continue;
        }
        if let Some(text) = doc.text(node) {
            let len = text.chars().count();
            segments.push(TextSegment {
                node,
                start: offset,
                len,
            });
            offset += len;
            continue;
        }
        stack.extend(doc.children(node).iter().rev().copied());
    }
    segments
}

/// The flattened prose of `root`.
pub fn flattened_text(doc: &Document, root: NodeId) -> String {
    text_segments(doc, root)
        .into_iter()
        .filter_map(|s| doc.text(s.node))
        .collect()
}

pub fn is_marker(doc: &Document, node: NodeId) -> bool {
    doc.name(node) == Some(MARKER_TAG) && doc.attr(node, MARKER_ID_ATTR).is_some()
}

/// Remove every marker under `root`, leaving the unmarked baseline.
pub fn strip_markers(doc: &mut Document, root: NodeId) -> usize {
    let markers = doc.find_all(root, is_marker);
    for marker in &markers {
        doc.unwrap(*marker);
    }
    doc.normalize(root);
    markers.len()
}

fn wrap_range(doc: &mut Document, root: NodeId, range: &HighlightRange) -> usize {
    let segments: Vec<TextSegment> = text_segments(doc, root)
        .into_iter()
        .filter(|s| s.len > 0 && s.start < range.end && range.start < s.end())
        .collect();

    let class = format!("hl {}", range.color.css_class());
    let id = range.id.to_string();
    for segment in &segments {
        let local_start = range.start.saturating_sub(segment.start);
        let local_end = (range.end - segment.start).min(segment.len);
        let mut node = segment.node;
        if local_end < segment.len {
            doc.split_text(node, local_end);
        }
        if local_start > 0 {
            node = doc.split_text(node, local_start);
        }
        let mark = doc.wrap(node, MARKER_TAG);
        doc.set_attr(mark, MARKER_ID_ATTR, &id);
        doc.set_attr(mark, "class", &class);
    }
    segments.len()
}

/// Strip all markers, then wrap each range's text in a `<mark>` per text
/// node it spans. Idempotent for the same ranges.
pub fn render_highlights(doc: &mut Document, root: NodeId, ranges: &[HighlightRange]) -> usize {
    strip_markers(doc, root);
    let mut sorted: Vec<&HighlightRange> = ranges.iter().collect();
    sorted.sort_by_key(|r| r.start);
    sorted
        .into_iter()
        .map(|range| wrap_range(doc, root, range))
        .sum()
}

/// A caret position: a character offset in a text node, or a child index in
/// an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomPosition {
    pub node: NodeId,
    pub offset: usize,
}

impl DomPosition {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

fn flatten_position(
    doc: &Document,
    root: NodeId,
    pos: DomPosition,
    segments: &[TextSegment],
) -> Option<usize> {
    if pos.node != root && !doc.ancestors(pos.node).contains(&root) {
        return None;
    }
    if in_chart(doc, pos.node, root) {
        return None;
    }
    if doc.text(pos.node).is_some() {
        let segment = segments.iter().find(|s| s.node == pos.node)?;
        return Some(segment.start + pos.offset.min(segment.len));
    }

    let order: HashMap<NodeId, usize> = doc
        .descendants(root)
        .into_iter()
        .enumerate()
        .map(|(i, n)| (n, i))
        .collect();
    let children = doc.children(pos.node);
    let boundary = match children.get(pos.offset) {
        Some(child) => *order.get(child)?,
        None => {
            let last = doc.descendants(pos.node).last().copied()?;
            *order.get(&last)? + 1
        }
    };
    Some(
        segments
            .iter()
            .filter(|s| order.get(&s.node).map(|i| *i < boundary).unwrap_or(false))
            .map(|s| s.len)
            .sum(),
    )
}

/// Map a selection to `(start, end)` offsets, whichever direction it was
/// made in. `None` for a collapsed selection or one touching the chart.
pub fn selection_offsets(
    doc: &Document,
    root: NodeId,
    anchor: DomPosition,
    focus: DomPosition,
) -> Option<(usize, usize)> {
    let segments = text_segments(doc, root);
    let a = flatten_position(doc, root, anchor, &segments)?;
    let b = flatten_position(doc, root, focus, &segments)?;
    if a == b {
        return None;
    }
    Some((a.min(b), a.max(b)))
}

/// The highlight id of the marker containing `node`, if any.
pub fn marker_at(doc: &Document, node: NodeId) -> Option<String> {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .find(|n| is_marker(doc, *n))
        .and_then(|n| doc.attr(n, MARKER_ID_ATTR))
        .map(str::to_string)
}
