//! Renderer - Materializer and reconciler.
//!
//! - [`materialize`] - Build live nodes for a virtual subtree (first paint)
//! - [`patch`] / [`Reconciler`] - Diff an old tree against a new one and
//!   mutate the live tree in place
//!
//! Both run synchronously to completion. There is no suspension point inside
//! a pass, and the first backend error aborts it.

mod diff;
mod materialize;

pub use diff::{patch, PatchStats, Reconciler};
pub use materialize::materialize;
