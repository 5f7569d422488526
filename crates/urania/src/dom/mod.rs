//! A small arena document for chart SVG and the report body.
//!
//! Nodes are never freed; detaching removes a node from its parent's child
//! list and leaves it in the arena. `NodeId`s therefore stay valid for the
//! lifetime of the document.

pub mod geometry;

pub use geometry::Transform;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("Markup parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Empty document with a single root element.
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(Element::new(root_name)),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// Parse XML markup (SVG or XHTML). Comments and processing instructions
    /// are dropped.
    pub fn parse(markup: &str) -> Result<Self, DomError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let parsed = roxmltree::Document::parse_with_options(markup, options)
            .map_err(|e| DomError::Parse(e.to_string()))?;
        let source_root = parsed.root_element();

        let mut doc = Document::new(source_root.tag_name().name());
        let root = doc.root;
        doc.copy_attributes(root, source_root, None);
        doc.copy_children(root, source_root);
        Ok(doc)
    }

    fn copy_attributes(
        &mut self,
        target: NodeId,
        source: roxmltree::Node,
        parent_ns: Option<&str>,
    ) {
        let ns = source.tag_name().namespace();
        if let Some(ns) = ns {
            if Some(ns) != parent_ns {
                self.set_attr(target, "xmlns", ns);
            }
        }
        for attr in source.attributes() {
            // prefixes are dropped: xlink:href is read as href
            self.set_attr(target, attr.name(), attr.value());
        }
    }

    fn copy_children(&mut self, target: NodeId, source: roxmltree::Node) {
        for child in source.children() {
            if child.is_element() {
                let id = self.create_element(child.tag_name().name());
                self.copy_attributes(id, child, source.tag_name().namespace());
                self.append_child(target, id);
                self.copy_children(id, child);
            } else if child.is_text() {
                if let Some(text) = child.text() {
                    let id = self.create_text(text);
                    self.append_child(target, id);
                }
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(name)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(t) => Some(t.as_str()),
            NodeData::Element(_) => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: &str) {
        if let NodeData::Text(t) = &mut self.node_mut(id).data {
            *t = value.to_string();
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(e) = self.element_mut(id) {
            e.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(e) = self.element_mut(id) {
            e.remove_attr(name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).map(|e| e.has_class(class)).unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn get_by_id(&self, id_attr: &str) -> Option<NodeId> {
        self.find(self.root, |doc, n| doc.attr(n, "id") == Some(id_attr))
    }

    pub fn find(&self, from: NodeId, pred: impl Fn(&Document, NodeId) -> bool) -> Option<NodeId> {
        self.descendants(from).into_iter().find(|n| pred(self, *n))
    }

    pub fn find_all(&self, from: NodeId, pred: impl Fn(&Document, NodeId) -> bool) -> Vec<NodeId> {
        self.descendants(from)
            .into_iter()
            .filter(|n| pred(self, *n))
            .collect()
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Insert `child` into `parent` at `index` (clamped).
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) {
        if let Some(parent) = self.parent(sibling) {
            let index = self.child_index(sibling).map(|i| i + 1).unwrap_or(usize::MAX);
            self.insert_child(parent, index, node);
        }
    }

    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Remove a node from its parent. The node and its subtree stay usable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
            self.node_mut(id).parent = None;
        }
    }

    /// Replace an element with its children.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(index) = self.child_index(id) else {
            return;
        };
        let children: Vec<NodeId> = self.children(id).to_vec();
        self.detach(id);
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_child(parent, index + offset, child);
        }
    }

    /// Wrap `id` in a new element with the given name; returns the wrapper.
    pub fn wrap(&mut self, id: NodeId, name: &str) -> NodeId {
        let wrapper = self.create_element(name);
        if let (Some(parent), Some(index)) = (self.parent(id), self.child_index(id)) {
            self.insert_child(parent, index, wrapper);
        }
        self.append_child(wrapper, id);
        wrapper
    }

    /// Merge adjacent text nodes and drop empty ones, throughout the subtree.
    pub fn normalize(&mut self, id: NodeId) {
        for node in self.descendants(id) {
            if !self.is_element(node) {
                continue;
            }
            let children = self.children(node).to_vec();
            let mut previous_text: Option<NodeId> = None;
            for child in children {
                match self.text(child).map(str::to_string) {
                    Some(text) if text.is_empty() => self.detach(child),
                    Some(text) => match previous_text {
                        Some(prev) => {
                            let merged = format!("{}{}", self.text(prev).unwrap_or(""), text);
                            self.set_text(prev, &merged);
                            self.detach(child);
                        }
                        None => previous_text = Some(child),
                    },
                    None => previous_text = None,
                }
            }
        }
    }

    /// Split a text node at a character offset. The original keeps the head;
    /// the returned node holds the tail and follows it.
    pub fn split_text(&mut self, id: NodeId, at: usize) -> NodeId {
        let text = self.text(id).unwrap_or("").to_string();
        let byte = text
            .char_indices()
            .nth(at)
            .map(|(b, _)| b)
            .unwrap_or(text.len());
        let (head, tail) = text.split_at(byte);
        let (head, tail) = (head.to_string(), tail.to_string());
        self.set_text(id, &head);
        let tail_node = self.create_text(&tail);
        self.insert_after(id, tail_node);
        tail_node
    }

    /// Deep-copy a subtree of another document under `parent`.
    pub fn import_subtree(&mut self, other: &Document, source: NodeId, parent: NodeId) -> NodeId {
        let id = self.push(other.data(source).clone());
        self.append_child(parent, id);
        for child in other.children(source).to_vec() {
            self.import_subtree(other, child, id);
        }
        id
    }

    /// Serialize the whole document.
    pub fn to_markup(&self) -> String {
        self.serialize(self.root)
    }

    pub fn serialize(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text(t) => out.push_str(&escape_text(t)),
            NodeData::Element(e) => {
                out.push('<');
                out.push_str(&e.name);
                for (k, v) in &e.attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
                let children = self.children(id);
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in children {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(&e.name);
                out.push('>');
            }
        }
    }
}

pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let doc = Document::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"><circle r="2"/>hi &amp; bye</g></svg>"#).unwrap();
        assert_eq!(
            doc.to_markup(),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"><circle r="2"/>hi &amp; bye</g></svg>"#
        );
    }

    #[test]
    fn test_unwrap_and_normalize() {
        let mut doc = Document::parse("<p>ab<mark>cd</mark>ef</p>").unwrap();
        let mark = doc.find(doc.root(), |d, n| d.name(n) == Some("mark")).unwrap();
        doc.unwrap(mark);
        doc.normalize(doc.root());
        assert_eq!(doc.children(doc.root()).len(), 1);
        assert_eq!(doc.to_markup(), "<p>abcdef</p>");
    }

    #[test]
    fn test_split_text_counts_chars() {
        let mut doc = Document::parse("<p>Sun ☉ in Leo</p>").unwrap();
        let text = doc.children(doc.root())[0];
        let tail = doc.split_text(text, 5);
        assert_eq!(doc.text(text), Some("Sun ☉"));
        assert_eq!(doc.text(tail), Some(" in Leo"));
    }
}
