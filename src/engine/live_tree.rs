//! LiveTree - The backend boundary.
//!
//! The reconciler decides *which* mutations to issue and in what order; a
//! `LiveTree` carries them out. Backends own their nodes and hand out
//! [`NodeId`] handles.

use crate::error::Result;
use crate::types::{AttrValue, EventHandler, NodeId};

/// A mutable presentation tree the reconciler can drive.
pub trait LiveTree {
    /// Create a detached element node.
    fn create_element(&mut self, tag: &str) -> Result<NodeId>;

    /// Create a detached text node.
    fn create_text_node(&mut self, text: &str) -> Result<NodeId>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Put `new_child` where `old_child` is and detach `old_child`.
    fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> Result<()>;

    /// Drop a node that never got attached, with its subtree.
    ///
    /// The reconciler calls this when attaching a freshly materialized
    /// subtree fails, so the failed render leaves no orphans behind.
    fn discard(&mut self, node: NodeId) -> Result<()>;

    /// Assign a named property.
    fn set_property(&mut self, node: NodeId, key: &str, value: &AttrValue) -> Result<()>;

    /// Mark a no-value attribute as present.
    fn set_flag(&mut self, node: NodeId, key: &str) -> Result<()>;

    /// Clear a property or no-value attribute.
    fn remove_attribute(&mut self, node: NodeId, key: &str) -> Result<()>;

    /// Attach or replace the callback for `event` (lower-cased, prefixed: `onclick`).
    fn set_event_handler(&mut self, node: NodeId, event: &str, handler: EventHandler) -> Result<()>;

    /// Detach the callback for `event`.
    fn remove_event_handler(&mut self, node: NodeId, event: &str) -> Result<()>;

    /// Replace the value of a text node.
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()>;

    /// Callback currently attached for `event`, used for dispatch.
    fn event_handler(&self, node: NodeId, event: &str) -> Option<EventHandler>;

    /// Find an element by its `id` property. Resolves the default mount point.
    fn find_by_id(&self, id: &str) -> Option<NodeId>;
}
