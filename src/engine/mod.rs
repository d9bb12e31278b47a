//! Live tree engine - The backend boundary and an in-memory backend.
//!
//! - [`LiveTree`]: mutations the reconciler issues (create, append, remove,
//!   replace, set property / flag / handler / text)
//! - [`MemoryTree`]: arena-backed implementation for headless rendering
//!
//! # Architecture
//!
//! Live nodes are NOT referenced by pointer. They are indices handed out by
//! the backend:
//!
//! ```text
//! #0: div#app   (parent=-, children=[#1])
//! #1: div       (parent=#0, class="x", children=[#2])
//! #2: "hello"   (parent=#1)
//! ```
//!
//! Virtual nodes store these indices as their live link, so a render can
//! find and reuse the node it produced last time.

mod live_tree;
mod memory;

pub use live_tree::*;
pub use memory::*;
