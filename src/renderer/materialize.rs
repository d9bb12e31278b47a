//! Materializer - Create live nodes for a virtual subtree.
//!
//! Used for first paint, for children that did not exist in the previous
//! tree, and for any slot whose node identity changed.
//!
//! # Attribute rules
//!
//! | key / value                 | live write                        |
//! |-----------------------------|-----------------------------------|
//! | `on*` + handler             | bind handler under lower-cased key|
//! | `true`                      | no-value attribute                |
//! | `false` / `Null`            | nothing (cleared when patching)   |
//! | anything else               | property                          |

use log::{trace, warn};

use crate::engine::LiveTree;
use crate::error::Result;
use crate::primitives::{VElement, VNode};
use crate::types::{is_event_name, AttrValue, NodeId};

use super::diff::Reconciler;

impl<T: LiveTree + ?Sized> Reconciler<'_, T> {
    /// Create live nodes for `node` and its descendants, recording live links.
    ///
    /// Returns the detached live root; the caller attaches it.
    pub fn materialize(&mut self, node: &VNode) -> Result<NodeId> {
        let id = match node {
            VNode::Text(text) => self.tree.create_text_node(text.text())?,
            VNode::Element(el) => {
                let id = self.tree.create_element(el.tag())?;
                if let Err(err) = self.fill_element(id, el) {
                    self.discard(id);
                    return Err(err);
                }
                id
            }
        };

        self.stats.created += 1;
        node.set_live(id);
        Ok(id)
    }

    /// Materialize `node` and append it as the last child of `parent`.
    ///
    /// If the append fails the new subtree is discarded before the error
    /// is returned.
    pub fn materialize_into(&mut self, parent: NodeId, node: &VNode) -> Result<NodeId> {
        let id = self.materialize(node)?;
        if let Err(err) = self.tree.append_child(parent, id) {
            self.discard(id);
            return Err(err);
        }
        Ok(id)
    }

    fn fill_element(&mut self, id: NodeId, el: &VElement) -> Result<()> {
        for (key, value) in el.attributes() {
            self.write_attribute(id, key, value, true)?;
        }

        for child in el.children() {
            self.materialize_into(id, child)?;
        }

        Ok(())
    }

    /// Drop a detached subtree after a failed attach. The attach error is
    /// what the caller reports, so a failure here is only logged.
    pub(super) fn discard(&mut self, id: NodeId) {
        trace!("discard {id}");
        if let Err(err) = self.tree.discard(id) {
            warn!("could not discard {id}: {err}");
        }
    }

    /// Apply one attribute entry to a live node.
    ///
    /// On creation absent values are skipped; on update they clear whatever
    /// the previous render left behind.
    pub(super) fn write_attribute(
        &mut self,
        node: NodeId,
        key: &str,
        value: &AttrValue,
        creating: bool,
    ) -> Result<()> {
        if let (true, AttrValue::Handler(handler)) = (is_event_name(key), value) {
            trace!("bind {key} on {node}");
            self.tree
                .set_event_handler(node, &key.to_lowercase(), handler.clone())?;
            self.stats.handler_writes += 1;
            return Ok(());
        }

        match value {
            AttrValue::Bool(true) => {
                trace!("flag {key} on {node}");
                self.tree.set_flag(node, key)?;
            }
            AttrValue::Bool(false) | AttrValue::Null => {
                if creating {
                    return Ok(());
                }
                trace!("clear {key} on {node}");
                self.tree.remove_attribute(node, key)?;
            }
            _ => {
                trace!("set {key}={value} on {node}");
                self.tree.set_property(node, key, value)?;
            }
        }

        self.stats.attribute_writes += 1;
        Ok(())
    }
}

/// Materialize `node` into `tree` with default settings.
pub fn materialize<T: LiveTree + ?Sized>(tree: &mut T, node: &VNode) -> Result<NodeId> {
    Reconciler::new(tree).materialize(node)
}
