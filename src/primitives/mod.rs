//! Virtual tree primitives.
//!
//! - [`VNode`] - Element or text description, rebuilt on every render
//! - [`Children`] - Tagged child argument, flattened one level
//! - [`h`], [`tags`], [`prop`], [`flag`], [`on`] - Builders over the model
//!
//! # Lifecycle
//!
//! A virtual node is pure description. The only state it ever gains is its
//! live link, written once by the materializer or carried over from the
//! previous tree by the reconciler:
//!
//! ```text
//! render 1:  producer() -> tree A -> materialize -> A.live = #4
//! render 2:  producer() -> tree B -> patch(A, B)  -> B.live = #4, A dropped
//! ```

mod builders;
mod node;

pub use builders::*;
pub use node::*;
