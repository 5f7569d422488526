use crate::dom::{Document, NodeId};
use std::collections::HashMap;

/// Pre-mutation attribute values, recorded once per (element, attribute) on
/// first touch. `None` records that the attribute was absent.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    records: HashMap<NodeId, HashMap<String, Option<String>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn capture(&mut self, doc: &Document, node: NodeId, attr: &str) {
        let record = self.records.entry(node).or_default();
        if !record.contains_key(attr) {
            record.insert(attr.to_string(), doc.attr(node, attr).map(str::to_string));
        }
    }

    /// The recorded original, or the live value for untouched attributes.
    pub fn original(&self, doc: &Document, node: NodeId, attr: &str) -> Option<String> {
        match self.records.get(&node).and_then(|r| r.get(attr)) {
            Some(recorded) => recorded.clone(),
            None => doc.attr(node, attr).map(str::to_string),
        }
    }

    pub fn is_captured(&self, node: NodeId, attr: &str) -> bool {
        self.records
            .get(&node)
            .map(|r| r.contains_key(attr))
            .unwrap_or(false)
    }

    pub fn set(&mut self, doc: &mut Document, node: NodeId, attr: &str, value: &str) {
        self.capture(doc, node, attr);
        doc.set_attr(node, attr, value);
    }

    /// Put the attribute back to its recorded original. The record is kept so
    /// later mutations compose from the same baseline.
    pub fn restore(&self, doc: &mut Document, node: NodeId, attr: &str) {
        let Some(original) = self.records.get(&node).and_then(|r| r.get(attr)) else {
            return;
        };
        match original {
            Some(value) => doc.set_attr(node, attr, value),
            None => doc.remove_attr(node, attr),
        }
    }

    pub fn len(&self) -> usize {
        self.records.values().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
