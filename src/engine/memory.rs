//! MemoryTree - In-process live tree.
//!
//! A headless [`LiveTree`] backend. Nodes live in an arena indexed by
//! [`NodeId`]:
//! - Free index pool for O(1) reuse
//! - Detaching a node (remove / replace / discard) releases its whole subtree
//! - Each slot carries a generation, bumped on release, so a stale
//!   [`NodeId`] fails with [`VdomError::UnknownNode`] instead of resolving to
//!   whatever reused the index
//!
//! Every mutation bumps a counter in [`MutationCounts`], which makes the
//! tree useful for asserting exactly what a render did.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::error::{Result, VdomError};
use crate::types::{AttrValue, EventHandler, NodeId};

use super::live_tree::LiveTree;

// =============================================================================
// Live Node
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum LiveKind {
    Element(String),
    Text(String),
}

#[derive(Debug)]
struct LiveNode {
    kind: LiveKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Properties and no-value attributes (stored as `Bool(true)`).
    attributes: BTreeMap<String, AttrValue>,
    handlers: BTreeMap<String, EventHandler>,
}

impl LiveNode {
    fn new(kind: LiveKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            handlers: BTreeMap::new(),
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, LiveKind::Element(_))
    }
}

// =============================================================================
// Mutation Counts
// =============================================================================

/// Number of each kind of mutation applied since the last reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MutationCounts {
    pub created: usize,
    pub appended: usize,
    pub removed: usize,
    pub replaced: usize,
    pub property_writes: usize,
    pub flag_writes: usize,
    pub attribute_removals: usize,
    pub handler_binds: usize,
    pub handler_removals: usize,
    pub text_writes: usize,
    /// Detached subtrees dropped after a failed attach.
    pub discarded: usize,
}

impl MutationCounts {
    /// Total number of mutations.
    pub fn total(&self) -> usize {
        self.created
            + self.appended
            + self.removed
            + self.replaced
            + self.property_writes
            + self.flag_writes
            + self.attribute_removals
            + self.handler_binds
            + self.handler_removals
            + self.text_writes
            + self.discarded
    }
}

// =============================================================================
// MemoryTree
// =============================================================================

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<LiveNode>,
}

/// Arena-backed live tree.
#[derive(Debug, Default)]
pub struct MemoryTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    counts: MutationCounts,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached `div` carrying `id`, ready to serve as a mount point.
    pub fn create_root(&mut self, id: &str) -> NodeId {
        let root = self.allocate(LiveKind::Element("div".to_string()));
        if let Ok(node) = self.node_mut(root) {
            node.attributes.insert("id".to_string(), AttrValue::from(id));
        }
        root
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    fn allocate(&mut self, kind: LiveKind) -> NodeId {
        let node = LiveNode::new(kind);
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        };
        NodeId::with_generation(index, self.slots[index].generation)
    }

    /// Release a node and, recursively, its children.
    fn free_subtree(&mut self, id: NodeId) {
        let Some(slot) = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
        else {
            return;
        };
        let Some(node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);

        for child in node.children {
            self.free_subtree(child);
        }
        self.free.push(id.index());
    }

    fn node(&self, id: NodeId) -> Result<&LiveNode> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
            .ok_or(VdomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut LiveNode> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or(VdomError::UnknownNode(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut LiveNode> {
        let node = self.node_mut(id)?;
        if !node.is_element() {
            return Err(VdomError::NotAnElement(id));
        }
        Ok(node)
    }

    /// Unlink `child` from its current parent, if any. Does not release it.
    fn detach(&mut self, child: NodeId) -> Result<()> {
        if let Some(parent) = self.node(child)?.parent {
            let siblings = &mut self.node_mut(parent)?.children;
            siblings.retain(|&c| c != child);
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Result<usize> {
        self.node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(VdomError::NotAChild { parent, child })
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Mutation counters since creation or the last [`reset_counts`](Self::reset_counts).
    pub fn counts(&self) -> MutationCounts {
        self.counts
    }

    pub fn reset_counts(&mut self) {
        self.counts = MutationCounts::default();
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Number of live (unreleased) nodes.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).ok()?.kind {
            LiveKind::Element(tag) => Some(tag),
            LiveKind::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).ok()?.kind {
            LiveKind::Element(_) => None,
            LiveKind::Text(text) => Some(text),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Ok(node) => &node.children,
            Err(_) => &[],
        }
    }

    pub fn property(&self, id: NodeId, key: &str) -> Option<&AttrValue> {
        self.node(id).ok()?.attributes.get(key)
    }

    pub fn has_flag(&self, id: NodeId, key: &str) -> bool {
        self.property(id, key) == Some(&AttrValue::Bool(true))
    }

    pub fn handler_names(&self, id: NodeId) -> Vec<&str> {
        self.node(id)
            .map(|node| node.handlers.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Serialize a subtree as markup. Handlers are not rendered.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else { return };

        match &node.kind {
            LiveKind::Text(text) => out.push_str(&escape(text)),
            LiveKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in &node.attributes {
                    match value {
                        AttrValue::Bool(true) => {
                            let _ = write!(out, " {key}");
                        }
                        AttrValue::Str(_) | AttrValue::Number(_) => {
                            let _ = write!(out, " {key}=\"{}\"", escape(&value.to_string()));
                        }
                        AttrValue::Null | AttrValue::Bool(false) | AttrValue::Handler(_) => {}
                    }
                }
                out.push('>');
                for &child in &node.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// =============================================================================
// LiveTree impl
// =============================================================================

impl LiveTree for MemoryTree {
    fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        self.counts.created += 1;
        Ok(self.allocate(LiveKind::Element(tag.to_string())))
    }

    fn create_text_node(&mut self, text: &str) -> Result<NodeId> {
        self.counts.created += 1;
        Ok(self.allocate(LiveKind::Text(text.to_string())))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element_mut(parent)?;
        self.detach(child)?;

        self.element_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.counts.appended += 1;
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let position = self.position(parent, child)?;

        self.node_mut(parent)?.children.remove(position);
        self.free_subtree(child);
        self.counts.removed += 1;
        Ok(())
    }

    fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> Result<()> {
        self.node(new_child)?;
        self.detach(new_child)?;
        let position = self.position(parent, old_child)?;

        self.node_mut(parent)?.children[position] = new_child;
        self.node_mut(new_child)?.parent = Some(parent);
        self.free_subtree(old_child);
        self.counts.replaced += 1;
        Ok(())
    }

    fn set_property(&mut self, node: NodeId, key: &str, value: &AttrValue) -> Result<()> {
        self.element_mut(node)?
            .attributes
            .insert(key.to_string(), value.clone());
        self.counts.property_writes += 1;
        Ok(())
    }

    fn set_flag(&mut self, node: NodeId, key: &str) -> Result<()> {
        self.element_mut(node)?
            .attributes
            .insert(key.to_string(), AttrValue::Bool(true));
        self.counts.flag_writes += 1;
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, key: &str) -> Result<()> {
        self.element_mut(node)?.attributes.remove(key);
        self.counts.attribute_removals += 1;
        Ok(())
    }

    fn set_event_handler(&mut self, node: NodeId, event: &str, handler: EventHandler) -> Result<()> {
        self.element_mut(node)?
            .handlers
            .insert(event.to_string(), handler);
        self.counts.handler_binds += 1;
        Ok(())
    }

    fn remove_event_handler(&mut self, node: NodeId, event: &str) -> Result<()> {
        self.element_mut(node)?.handlers.remove(event);
        self.counts.handler_removals += 1;
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        match &mut self.node_mut(node)?.kind {
            LiveKind::Text(value) => {
                *value = text.to_string();
            }
            LiveKind::Element(_) => {
                return Err(VdomError::Backend(format!("live node {node} is not a text node")));
            }
        }
        self.counts.text_writes += 1;
        Ok(())
    }

    fn discard(&mut self, node: NodeId) -> Result<()> {
        self.detach(node)?;
        self.free_subtree(node);
        self.counts.discarded += 1;
        Ok(())
    }

    fn event_handler(&self, node: NodeId, event: &str) -> Option<EventHandler> {
        self.node(node).ok()?.handlers.get(event).cloned()
    }

    /// Only roots are searched: mount points are parentless here, and a
    /// rendered element carrying the same `id` must not shadow them.
    fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let node = slot.node.as_ref()?;
            let matches = node.parent.is_none()
                && node.is_element()
                && node.attributes.get("id").and_then(AttrValue::as_str) == Some(id);
            matches.then(|| NodeId::with_generation(index, slot.generation))
        })
    }
}
