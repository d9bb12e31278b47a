//! Render Pipeline
//!
//! Connects producers to mount points in a live tree.
//!
//! # Pipeline Architecture
//!
//! ```text
//! producer() → VNode tree → materialize (first paint) / patch (re-render) → LiveTree
//!                                 ▲
//!            notify(mount) / event handler / signal change (watch)
//! ```
//!
//! - [`Renderer`] - Mount registry; `render`, `notify`, `dispatch`
//! - [`watch`] - Reactive render driven by spark-signals effects
//! - [`RenderConfig`] - Default mount id and stale-attribute policy

mod config;
mod reactive;
mod session;

pub use config::*;
pub use reactive::{watch, Cleanup};
pub use session::{Producer, RenderReport, Renderer, WeakRenderer};
