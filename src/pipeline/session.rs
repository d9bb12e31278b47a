//! Render Session - Mount registry, render, and notify.
//!
//! A [`Renderer`] owns a live tree and remembers, per mount point, the last
//! rendered virtual tree and the producer that makes new ones:
//!
//! ```text
//! render(mount, producer)          notify(mount)
//!   │                                │
//!   ├─ no record: first paint        └─ render(mount, stored producer)
//!   │    producer() → materialize → append → store {tree, producer}
//!   │
//!   └─ record: producer() → patch(stored, new, mount) → store new tree
//! ```
//!
//! The producer is fixed at first paint. A later `render` call uses the
//! producer it is given for that one render, but `notify` always goes back
//! to the first one.
//!
//! # Re-entrancy
//!
//! Renders are synchronous. A render requested for a mount point that is
//! already rendering (for example from inside its own producer) is rejected
//! with [`VdomError::RenderInProgress`]. The producer runs with no internal
//! borrow held, so it may freely render *other* mount points.
//!
//! # Example
//!
//! ```ignore
//! let mut tree = MemoryTree::new();
//! let app = tree.create_root("app");
//! let renderer = Renderer::new(tree);
//!
//! let count = Rc::new(Cell::new(0));
//! let counter = count.clone();
//! renderer.render(app, move || h!("p", counter.get() as i64))?;
//!
//! count.set(1);
//! renderer.notify(None)?; // re-renders #app
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;

use crate::engine::LiveTree;
use crate::error::{Result, VdomError};
use crate::primitives::VNode;
use crate::renderer::{PatchStats, Reconciler};
use crate::types::{Event, NodeId};

use super::config::RenderConfig;

/// Zero-argument function producing one root node per call.
pub type Producer = Rc<dyn Fn() -> VNode>;

// =============================================================================
// Session State
// =============================================================================

struct MountRecord {
    tree: VNode,
    producer: Producer,
    renders: u64,
}

struct SessionState<T> {
    tree: T,
    config: RenderConfig,
    mounts: HashMap<NodeId, MountRecord>,
    /// Mount points with a render on the stack.
    rendering: HashSet<NodeId>,
}

/// Outcome of one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub mount: NodeId,
    /// True if the tree was materialized rather than patched.
    pub first_paint: bool,
    pub stats: PatchStats,
    /// Renders of this mount point so far, including this one.
    pub renders: u64,
}

/// Clears the in-progress mark of a mount point when a render ends,
/// successfully or not.
struct RenderingGuard<'a, T> {
    state: &'a RefCell<SessionState<T>>,
    mount: NodeId,
}

impl<T> Drop for RenderingGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.rendering.remove(&self.mount);
        }
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Shared handle to a live tree and its mount registry.
///
/// Cloning is cheap and yields another handle to the same session.
/// Single-threaded: the handle is neither `Send` nor `Sync`.
pub struct Renderer<T: LiveTree> {
    state: Rc<RefCell<SessionState<T>>>,
}

impl<T: LiveTree> Clone for Renderer<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: LiveTree> fmt::Debug for Renderer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Renderer");
        if let Ok(state) = self.state.try_borrow() {
            out.field("mounts", &state.mounts.len())
                .field("config", &state.config);
        }
        out.finish_non_exhaustive()
    }
}

impl<T: LiveTree> Renderer<T> {
    /// Renderer with the default configuration.
    pub fn new(tree: T) -> Self {
        Self::with_config(tree, RenderConfig::default())
    }

    pub fn with_config(tree: T, config: RenderConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState {
                tree,
                config,
                mounts: HashMap::new(),
                rendering: HashSet::new(),
            })),
        }
    }

    /// Weak handle, for callbacks stored inside the tree this renderer owns.
    pub fn downgrade(&self) -> WeakRenderer<T> {
        WeakRenderer {
            state: Rc::downgrade(&self.state),
        }
    }

    pub fn config(&self) -> Result<RenderConfig> {
        Ok(self.read_state()?.config.clone())
    }

    // -------------------------------------------------------------------------
    // Render / Notify
    // -------------------------------------------------------------------------

    /// Render `producer` into `mount`.
    ///
    /// First call for a mount point materializes and stores the producer;
    /// later calls patch against the stored tree.
    pub fn render(&self, mount: NodeId, producer: impl Fn() -> VNode + 'static) -> Result<RenderReport> {
        self.render_with(mount, Rc::new(producer))
    }

    /// [`render`](Self::render) with an already shared producer.
    pub fn render_with(&self, mount: NodeId, producer: Producer) -> Result<RenderReport> {
        self.run(mount, Some(producer))
    }

    /// Re-render a mount point with its stored producer.
    ///
    /// `None` targets the default mount point (the element whose `id` equals
    /// [`RenderConfig::default_mount_id`]).
    pub fn notify(&self, mount: Option<NodeId>) -> Result<RenderReport> {
        let mount = match mount {
            Some(mount) => mount,
            None => self.default_mount()?,
        };
        self.run(mount, None)
    }

    /// Resolve the default mount point through the backend.
    pub fn default_mount(&self) -> Result<NodeId> {
        let state = self.read_state()?;
        let id = &state.config.default_mount_id;
        state
            .tree
            .find_by_id(id)
            .ok_or_else(|| VdomError::DefaultMountNotFound(id.clone()))
    }

    fn run(&self, mount: NodeId, producer: Option<Producer>) -> Result<RenderReport> {
        let producer = {
            let mut state = self.write_state()?;
            let producer = match producer {
                Some(producer) => producer,
                None => state
                    .mounts
                    .get(&mount)
                    .map(|record| Rc::clone(&record.producer))
                    .ok_or(VdomError::NotMounted(mount))?,
            };
            if !state.rendering.insert(mount) {
                return Err(VdomError::RenderInProgress(mount));
            }
            producer
        };
        let _guard = RenderingGuard {
            state: &self.state,
            mount,
        };

        let next = producer();

        let mut state = self.write_state()?;
        let state = &mut *state;
        let policy = state.config.stale_attributes;

        let report = if let Some(record) = state.mounts.get_mut(&mount) {
            let mut reconciler = Reconciler::with_policy(&mut state.tree, policy);
            reconciler.patch(&record.tree, &next, mount)?;
            let stats = reconciler.stats();

            // Only a completed patch replaces the stored tree
            record.tree = next;
            record.renders += 1;
            debug!("re-render {mount} #{}: {:?}", record.renders, stats.changes());

            RenderReport {
                mount,
                first_paint: false,
                stats,
                renders: record.renders,
            }
        } else {
            let mut reconciler = Reconciler::with_policy(&mut state.tree, policy);
            reconciler.materialize_into(mount, &next)?;
            let stats = reconciler.stats();
            debug!("first paint of {mount}: {} nodes", stats.created);

            state.mounts.insert(
                mount,
                MountRecord {
                    tree: next,
                    producer,
                    renders: 1,
                },
            );

            RenderReport {
                mount,
                first_paint: true,
                stats,
                renders: 1,
            }
        };

        Ok(report)
    }

    /// Remove a mount point's live root and forget its record.
    pub fn unmount(&self, mount: NodeId) -> Result<()> {
        let mut state = self.write_state()?;
        if state.rendering.contains(&mount) {
            return Err(VdomError::RenderInProgress(mount));
        }

        let live = state
            .mounts
            .get(&mount)
            .ok_or(VdomError::NotMounted(mount))?
            .tree
            .live();
        if let Some(live) = live {
            state.tree.remove_child(mount, live)?;
        }
        state.mounts.remove(&mount);
        debug!("unmounted {mount}");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Invoke the handler bound for `event` on its target.
    ///
    /// Returns `Ok(false)` if nothing is bound. The handler runs with no
    /// borrow held, so it may call [`notify`](Self::notify); its error, if
    /// any, is returned here.
    pub fn dispatch(&self, event: &Event) -> Result<bool> {
        let handler = self
            .read_state()?
            .tree
            .event_handler(event.target, &event.handler_key());

        match handler {
            Some(handler) => {
                handler.call(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn is_mounted(&self, mount: NodeId) -> bool {
        self.state
            .try_borrow()
            .is_ok_and(|state| state.mounts.contains_key(&mount))
    }

    /// Mount points with a stored tree.
    pub fn mounts(&self) -> Vec<NodeId> {
        self.state
            .try_borrow()
            .map(|state| state.mounts.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Copy of the tree last rendered into `mount`.
    pub fn mounted_tree(&self, mount: NodeId) -> Option<VNode> {
        let state = self.state.try_borrow().ok()?;
        state.mounts.get(&mount).map(|record| record.tree.clone())
    }

    /// Read access to the live tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        Ok(f(&self.read_state()?.tree))
    }

    /// Write access to the live tree (e.g. to create more mount points).
    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        Ok(f(&mut self.write_state()?.tree))
    }

    fn read_state(&self) -> Result<Ref<'_, SessionState<T>>> {
        self.state.try_borrow().map_err(|_| VdomError::Busy)
    }

    fn write_state(&self) -> Result<RefMut<'_, SessionState<T>>> {
        self.state.try_borrow_mut().map_err(|_| VdomError::Busy)
    }
}

// =============================================================================
// WeakRenderer
// =============================================================================

/// Non-owning renderer handle.
pub struct WeakRenderer<T: LiveTree> {
    state: Weak<RefCell<SessionState<T>>>,
}

impl<T: LiveTree> Clone for WeakRenderer<T> {
    fn clone(&self) -> Self {
        Self {
            state: Weak::clone(&self.state),
        }
    }
}

impl<T: LiveTree> WeakRenderer<T> {
    pub fn upgrade(&self) -> Option<Renderer<T>> {
        self.state.upgrade().map(|state| Renderer { state })
    }
}
