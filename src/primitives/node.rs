//! Virtual Node Model - Immutable description of one tree node.
//!
//! A virtual tree is rebuilt from scratch on every render. Nodes are never
//! mutated after construction except for their live link, which the
//! materializer and reconciler fill in so the next render can find the live
//! node to reuse.
//!
//! # Children
//!
//! Children are passed as [`Children`] values and flattened exactly one level:
//!
//! ```ignore
//! let items: Vec<VNode> = names.iter().map(|n| VNode::text(n)).collect();
//!
//! VNode::element("ul", [("class", "names")], [
//!     Children::from(VNode::text("header")),
//!     Children::from(items),          // spliced in place
//!     Children::from(None::<VNode>),  // dropped
//! ]);
//! ```
//!
//! Absent children are dropped here, at construction, so every position in a
//! child list is a real node. Positional diffing then compares exactly the
//! nodes that were materialized.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{AttrValue, NodeId};

/// Attribute map of an element. Sorted so materialization order is stable.
pub type Attributes = BTreeMap<String, AttrValue>;

// =============================================================================
// VNode
// =============================================================================

/// A virtual node: an element or a text leaf.
#[derive(Clone, Debug)]
pub enum VNode {
    Element(VElement),
    Text(VText),
}

impl VNode {
    /// Create an element node.
    pub fn element<K, V, C>(
        tag: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
        children: impl IntoIterator<Item = C>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<AttrValue>,
        C: Into<Children>,
    {
        VNode::Element(VElement::new(tag, attributes, children))
    }

    /// Create a text node from anything displayable.
    pub fn text(value: impl fmt::Display) -> Self {
        VNode::Text(VText::new(value))
    }

    /// Live node this virtual node is linked to, if materialized.
    pub fn live(&self) -> Option<NodeId> {
        match self {
            VNode::Element(el) => el.live(),
            VNode::Text(text) => text.live(),
        }
    }

    pub(crate) fn set_live(&self, id: NodeId) {
        match self {
            VNode::Element(el) => el.live.set(Some(id)),
            VNode::Text(text) => text.live.set(Some(id)),
        }
    }

    /// Tag of an element node.
    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element(el) => Some(&el.tag),
            VNode::Text(_) => None,
        }
    }

    /// Payload of a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Element(_) => None,
            VNode::Text(text) => Some(&text.text),
        }
    }

    /// Children of an element node (empty for text).
    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element(el) => &el.children,
            VNode::Text(_) => &[],
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, VNode::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, VNode::Text(_))
    }

    /// Short label for errors and logs: `<div>` or `"text"`.
    pub fn describe(&self) -> String {
        match self {
            VNode::Element(el) => format!("<{}>", el.tag),
            VNode::Text(text) => format!("{:?}", text.text),
        }
    }
}

impl From<VElement> for VNode {
    fn from(el: VElement) -> Self {
        VNode::Element(el)
    }
}

impl From<VText> for VNode {
    fn from(text: VText) -> Self {
        VNode::Text(text)
    }
}

// =============================================================================
// VElement
// =============================================================================

/// Element variant: tag, attributes, children.
#[derive(Clone, Debug)]
pub struct VElement {
    tag: String,
    attributes: Attributes,
    children: Vec<VNode>,
    live: Cell<Option<NodeId>>,
}

impl VElement {
    /// Build an element. Later duplicate attribute keys win.
    pub fn new<K, V, C>(
        tag: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
        children: impl IntoIterator<Item = C>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<AttrValue>,
        C: Into<Children>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut flat = Vec::new();
        for child in children {
            child.into().flatten_into(&mut flat);
        }

        Self {
            tag: tag.into(),
            attributes,
            children: flat,
            live: Cell::new(None),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    pub fn children(&self) -> &[VNode] {
        &self.children
    }

    pub fn live(&self) -> Option<NodeId> {
        self.live.get()
    }
}

// =============================================================================
// VText
// =============================================================================

/// Text leaf. The payload is stringified once, at construction.
#[derive(Clone, Debug)]
pub struct VText {
    text: String,
    live: Cell<Option<NodeId>>,
}

impl VText {
    pub fn new(value: impl fmt::Display) -> Self {
        Self {
            text: value.to_string(),
            live: Cell::new(None),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn live(&self) -> Option<NodeId> {
        self.live.get()
    }
}

// =============================================================================
// Children - Tagged child argument
// =============================================================================

/// A child argument: a single (possibly absent) node or a group of them.
///
/// Groups are spliced into the parent's child list; nothing nests deeper
/// than one level.
#[derive(Clone, Debug)]
pub enum Children {
    One(Option<VNode>),
    Many(Vec<Option<VNode>>),
}

impl Children {
    fn flatten_into(self, out: &mut Vec<VNode>) {
        match self {
            Children::One(node) => out.extend(node),
            Children::Many(nodes) => out.extend(nodes.into_iter().flatten()),
        }
    }
}

impl From<VNode> for Children {
    fn from(node: VNode) -> Self {
        Children::One(Some(node))
    }
}

impl From<Option<VNode>> for Children {
    fn from(node: Option<VNode>) -> Self {
        Children::One(node)
    }
}

impl From<Vec<VNode>> for Children {
    fn from(nodes: Vec<VNode>) -> Self {
        Children::Many(nodes.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<VNode>>> for Children {
    fn from(nodes: Vec<Option<VNode>>) -> Self {
        Children::Many(nodes)
    }
}

impl From<&str> for Children {
    fn from(text: &str) -> Self {
        Children::One(Some(VNode::text(text)))
    }
}

impl From<String> for Children {
    fn from(text: String) -> Self {
        Children::One(Some(VNode::text(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_attrs() -> [(&'static str, AttrValue); 0] {
        []
    }

    #[test]
    fn test_children_flatten_one_level() {
        let group = vec![VNode::text("b"), VNode::text("c")];
        let node = VNode::element(
            "ul",
            no_attrs(),
            [
                Children::from("a"),
                Children::from(group),
                Children::from("d"),
            ],
        );

        let texts: Vec<_> = node.children().iter().filter_map(VNode::as_text).collect();
        assert_eq!(texts, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_absent_children_are_dropped() {
        let node = VNode::element(
            "div",
            no_attrs(),
            [
                Children::from(None::<VNode>),
                Children::from(vec![None, Some(VNode::text("x")), None]),
            ],
        );

        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].as_text(), Some("x"));
    }

    #[test]
    fn test_text_stringifies_at_construction() {
        assert_eq!(VNode::text(42).as_text(), Some("42"));
        assert_eq!(VNode::text(1.5).as_text(), Some("1.5"));
        assert_eq!(VNode::text(true).as_text(), Some("true"));
    }

    #[test]
    fn test_duplicate_attribute_last_wins() {
        let el = VElement::new("div", [("class", "a"), ("class", "b")], Vec::<Children>::new());
        assert_eq!(el.attribute("class"), Some(&AttrValue::from("b")));
    }

    #[test]
    fn test_live_link_starts_empty() {
        let node = VNode::text("x");
        assert_eq!(node.live(), None);

        node.set_live(NodeId::new(7));
        assert_eq!(node.live(), Some(NodeId::new(7)));
    }

    #[test]
    fn test_describe() {
        assert_eq!(VNode::element("p", no_attrs(), Vec::<Children>::new()).describe(), "<p>");
        assert_eq!(VNode::text("hi").describe(), "\"hi\"");
    }
}
