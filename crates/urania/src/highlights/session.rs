use crate::dom::{Document, NodeId};
use crate::highlights::range::{HighlightColor, HighlightError, HighlightRange, HighlightSet};
use crate::highlights::render::{marker_at, render_highlights, selection_offsets, DomPosition};
use crate::highlights::store::HighlightStore;
use uuid::Uuid;

/// Highlight state for one report view: the ranges, where they persist, and
/// the body they are rendered into.
pub struct HighlightSession<'s> {
    key: String,
    set: HighlightSet,
    store: &'s mut dyn HighlightStore,
    body_root: NodeId,
}

impl<'s> HighlightSession<'s> {
    /// Load the subject's ranges and render them into the body.
    pub fn open(
        store: &'s mut dyn HighlightStore,
        key: &str,
        doc: &mut Document,
        body_root: NodeId,
    ) -> Self {
        let set = HighlightSet::from_ranges(store.load(key));
        let session = Self {
            key: key.to_string(),
            set,
            store,
            body_root,
        };
        render_highlights(doc, body_root, session.set.ranges());
        session
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ranges(&self) -> &[HighlightRange] {
        self.set.ranges()
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.key, self.set.ranges()) {
            log::warn!("failed to persist highlights for {}: {:#}", self.key, e);
        }
    }

    fn refresh(&mut self, doc: &mut Document) {
        render_highlights(doc, self.body_root, self.set.ranges());
        self.persist();
    }

    /// Create a range from explicit offsets.
    pub fn create(
        &mut self,
        doc: &mut Document,
        start: usize,
        end: usize,
        color: HighlightColor,
    ) -> Result<Uuid, HighlightError> {
        let id = self.set.create(start, end, color)?.id;
        self.refresh(doc);
        Ok(id)
    }

    /// Create a range from a user selection. `Ok(None)` when the selection
    /// is collapsed or lies in the chart.
    pub fn create_from_selection(
        &mut self,
        doc: &mut Document,
        anchor: DomPosition,
        focus: DomPosition,
        color: HighlightColor,
    ) -> Result<Option<Uuid>, HighlightError> {
        let Some((start, end)) = selection_offsets(doc, self.body_root, anchor, focus) else {
            return Ok(None);
        };
        self.create(doc, start, end, color).map(Some)
    }

    pub fn remove(&mut self, doc: &mut Document, id: Uuid) -> Option<HighlightRange> {
        let removed = self.set.remove(id)?;
        self.refresh(doc);
        Some(removed)
    }

    /// Clicking a marker deletes its range, unless text is being selected.
    pub fn click_marker(
        &mut self,
        doc: &mut Document,
        clicked: NodeId,
        selection_active: bool,
    ) -> Option<HighlightRange> {
        if selection_active {
            return None;
        }
        let id = marker_at(doc, clicked)?;
        let id = Uuid::parse_str(&id).ok()?;
        self.remove(doc, id)
    }
}
