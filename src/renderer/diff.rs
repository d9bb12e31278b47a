//! Reconciler - Positional diff/patch of two virtual trees.
//!
//! Compares the previous virtual tree (whose nodes carry live links) with a
//! freshly produced one and issues the smallest set of live mutations that
//! makes the live tree match the new description.
//!
//! # Algorithm
//!
//! Node level, for `old` (materialized) against `new` under `parent`:
//! 1. Different kind (text vs element) or different tag: materialize `new`
//!    and replace the old live node in place. Nothing below is compared.
//! 2. Both text: write the text only if it changed.
//! 3. Same tag: reuse the live node, write changed attributes, rebind
//!    handlers whose reference changed, then diff the children.
//!
//! Children are compared strictly by index over `0..max(old, new)`:
//! - only new: materialize and append
//! - only old: remove
//! - both: node level rule
//!
//! There is no keying. Inserting at the front of a list rewrites every slot
//! after it instead of moving nodes.
//!
//! Every reused node gets its live link copied onto the new virtual node, so
//! the new tree can be diffed against on the next render.

use std::collections::HashSet;

use log::{debug, trace};

use crate::engine::LiveTree;
use crate::error::{Result, VdomError};
use crate::pipeline::StaleAttributes;
use crate::primitives::{VElement, VNode};
use crate::types::{is_event_name, AttrValue, Changes, NodeId};

// =============================================================================
// Patch Stats
// =============================================================================

/// What one reconciliation pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatchStats {
    /// Live nodes created (every node of every materialized subtree).
    pub created: usize,
    /// Children removed from the end of a shrinking list.
    pub removed: usize,
    /// Slots whose node was replaced wholesale.
    pub replaced: usize,
    /// Property / flag writes and attribute removals.
    pub attribute_writes: usize,
    /// Handler binds and unbinds.
    pub handler_writes: usize,
    /// In-place text updates.
    pub text_updates: usize,
}

impl PatchStats {
    /// Fold the counters into change flags.
    pub fn changes(&self) -> Changes {
        let mut changes = Changes::NONE;
        if self.created > 0 {
            changes |= Changes::CREATED;
        }
        if self.removed > 0 {
            changes |= Changes::REMOVED;
        }
        if self.replaced > 0 {
            changes |= Changes::REPLACED;
        }
        if self.attribute_writes > 0 {
            changes |= Changes::ATTRIBUTES;
        }
        if self.handler_writes > 0 {
            changes |= Changes::HANDLERS;
        }
        if self.text_updates > 0 {
            changes |= Changes::TEXT;
        }
        changes
    }

    /// True if the pass touched nothing.
    pub fn is_noop(&self) -> bool {
        self.changes().is_empty()
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Drives a [`LiveTree`] through materialize and patch passes.
pub struct Reconciler<'a, T: LiveTree + ?Sized> {
    pub(super) tree: &'a mut T,
    pub(super) stats: PatchStats,
    stale: StaleAttributes,
}

impl<'a, T: LiveTree + ?Sized> Reconciler<'a, T> {
    /// Reconciler with the default (keep) stale-attribute policy.
    pub fn new(tree: &'a mut T) -> Self {
        Self::with_policy(tree, StaleAttributes::default())
    }

    pub fn with_policy(tree: &'a mut T, stale: StaleAttributes) -> Self {
        Self {
            tree,
            stats: PatchStats::default(),
            stale,
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> PatchStats {
        self.stats
    }

    /// Reconcile `old` (already materialized under `parent`) into `new`.
    ///
    /// Fails with [`VdomError::Unmaterialized`] if `old` has no live node.
    pub fn patch(&mut self, old: &VNode, new: &VNode, parent: NodeId) -> Result<()> {
        let live = old
            .live()
            .ok_or_else(|| VdomError::Unmaterialized(old.describe()))?;

        match (old, new) {
            (VNode::Text(old_text), VNode::Text(new_text)) => {
                if old_text.text() != new_text.text() {
                    trace!("text {live}: {:?} -> {:?}", old_text.text(), new_text.text());
                    self.tree.set_text(live, new_text.text())?;
                    self.stats.text_updates += 1;
                }
                new.set_live(live);
            }
            (VNode::Element(old_el), VNode::Element(new_el)) if old_el.tag() == new_el.tag() => {
                new.set_live(live);
                self.patch_attributes(live, old_el, new_el)?;
                self.patch_children(live, old_el.children(), new_el.children())?;
            }
            _ => {
                debug!("replace {} {live} with {} under {parent}", old.describe(), new.describe());
                let fresh = self.materialize(new)?;
                if let Err(err) = self.tree.replace_child(parent, fresh, live) {
                    self.discard(fresh);
                    return Err(err);
                }
                self.stats.replaced += 1;
            }
        }

        Ok(())
    }

    /// Reconcile two child lists of the live node `parent`, by position.
    pub fn patch_children(&mut self, parent: NodeId, old: &[VNode], new: &[VNode]) -> Result<()> {
        let len = old.len().max(new.len());

        for i in 0..len {
            match (old.get(i), new.get(i)) {
                (None, Some(new_child)) => {
                    self.materialize_into(parent, new_child)?;
                }
                (Some(old_child), None) => {
                    let live = old_child
                        .live()
                        .ok_or_else(|| VdomError::Unmaterialized(old_child.describe()))?;
                    debug!("remove {} {live} from {parent}", old_child.describe());
                    self.tree.remove_child(parent, live)?;
                    self.stats.removed += 1;
                }
                (Some(old_child), Some(new_child)) => {
                    self.patch(old_child, new_child, parent)?;
                }
                (None, None) => {}
            }
        }

        Ok(())
    }

    fn patch_attributes(&mut self, live: NodeId, old: &VElement, new: &VElement) -> Result<()> {
        for (key, value) in new.attributes() {
            let previous = old.attribute(key);
            let unchanged = match previous {
                Some(previous) => previous == value,
                None => value.is_absent(),
            };
            if unchanged {
                continue;
            }

            // A handler replaced by a plain value must not keep firing
            if is_event_name(key) && previous.is_some_and(AttrValue::is_handler) && !value.is_handler() {
                self.tree.remove_event_handler(live, &key.to_lowercase())?;
                self.stats.handler_writes += 1;
            }

            self.write_attribute(live, key, value, false)?;
        }

        if self.stale == StaleAttributes::Clear {
            self.clear_stale_attributes(live, old, new)?;
        }

        Ok(())
    }

    fn clear_stale_attributes(&mut self, live: NodeId, old: &VElement, new: &VElement) -> Result<()> {
        // Events the new node binds, under the name they are bound with
        let bound: HashSet<String> = new
            .attributes()
            .iter()
            .filter(|(key, value)| is_event_name(key) && value.is_handler())
            .map(|(key, _)| key.to_lowercase())
            .collect();

        let stale = old
            .attributes()
            .iter()
            .filter(|(key, _)| new.attribute(key).is_none());

        for (key, value) in stale {
            if is_event_name(key) && value.is_handler() {
                if bound.contains(&key.to_lowercase()) {
                    continue;
                }
                trace!("unbind stale {key} on {live}");
                self.tree.remove_event_handler(live, &key.to_lowercase())?;
                self.stats.handler_writes += 1;
            } else if !value.is_absent() {
                trace!("clear stale {key} on {live}");
                self.tree.remove_attribute(live, key)?;
                self.stats.attribute_writes += 1;
            }
        }

        Ok(())
    }
}

/// Patch `old` into `new` under `parent` with default settings.
pub fn patch<T: LiveTree + ?Sized>(
    tree: &mut T,
    old: &VNode,
    new: &VNode,
    parent: NodeId,
) -> Result<PatchStats> {
    let mut reconciler = Reconciler::new(tree);
    reconciler.patch(old, new, parent)?;
    Ok(reconciler.stats())
}
