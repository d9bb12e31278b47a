//! Error type for rendering, reconciliation, and backend operations.

use thiserror::Error;

use crate::types::NodeId;

/// Convenience alias used throughout the crate.
pub type Result<T, E = VdomError> = std::result::Result<T, E>;

/// Errors produced while building, rendering, or dispatching.
///
/// Nothing is retried. Every error aborts the current render and reaches the
/// caller of `render`, `notify`, or `dispatch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VdomError {
    /// An event attribute was built with a key lacking the `on` prefix.
    #[error("event attribute `{0}` must start with `on`")]
    InvalidEventName(String),

    /// Patch or removal reached a virtual node that was never materialized.
    #[error("virtual node {0} has no live node (never materialized)")]
    Unmaterialized(String),

    /// The backend does not know this node.
    #[error("live node {0} does not exist")]
    UnknownNode(NodeId),

    /// `child` is not attached to `parent`.
    #[error("live node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Element-only operation on a text node.
    #[error("live node {0} is not an element")]
    NotAnElement(NodeId),

    /// `notify` or `unmount` on a mount point that was never rendered.
    #[error("mount point {0} has not been rendered")]
    NotMounted(NodeId),

    /// A render for this mount point is already running.
    #[error("mount point {0} is already rendering")]
    RenderInProgress(NodeId),

    /// `notify(None)` could not resolve the default mount point.
    #[error("default mount point `{0}` not found")]
    DefaultMountNotFound(String),

    /// A weak renderer handle outlived its renderer.
    #[error("renderer has been dropped")]
    RendererDropped,

    /// The renderer state is borrowed by an operation still on the stack.
    #[error("renderer is busy")]
    Busy,

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}
