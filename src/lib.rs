//! # spark-vdom
//!
//! Minimal declarative UI renderer for Rust.
//!
//! A view is a zero-argument function returning a tree of virtual nodes. The
//! renderer builds live nodes for the first tree, then on every re-render
//! compares the new tree with the previous one and applies only the
//! differences to the live tree.
//!
//! Reactive re-rendering is built on
//! [spark-signals](https://github.com/RLabs-Inc/spark-signals).
//!
//! ## Architecture
//!
//! ```text
//! h!(...) → VNode ─┬─ first paint → materialize ──┐
//!                  └─ re-render   → patch(old,new)├→ LiveTree (MemoryTree, ...)
//!                                                 │
//!          Renderer: mount → {last tree, producer}┘
//! ```
//!
//! Children are reconciled by position only. There are no keys.
//!
//! ## Modules
//!
//! - [`types`] - Node handles, attribute values, events, change flags
//! - [`error`] - Crate error type
//! - [`primitives`] - Virtual node model and builders
//! - [`engine`] - Live tree backend trait and the in-memory backend
//! - [`renderer`] - Materializer and positional reconciler
//! - [`pipeline`] - Render session, configuration, reactive rendering

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Result, VdomError};

pub use engine::{LiveTree, MemoryTree, MutationCounts};

pub use primitives::{flag, h, on, on_notify, prop, tags, Arg, Attr, Attributes, Children, VElement, VNode, VText};

pub use renderer::{materialize, patch, PatchStats, Reconciler};

pub use pipeline::{
    watch, Cleanup, Producer, RenderConfig, RenderReport, Renderer, StaleAttributes, WeakRenderer,
};
