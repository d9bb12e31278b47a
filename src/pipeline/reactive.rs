//! Reactive rendering - Re-render a mount point when its signals change.
//!
//! [`watch`] wraps a render in a spark-signals effect. Every signal the
//! producer reads becomes a dependency; setting any of them re-runs the
//! effect, which patches the mount point synchronously.
//!
//! ```ignore
//! let count = signal(0);
//! let count_view = count.clone();
//! let stop = watch(&renderer, app, move || h!("p", count_view.get()));
//!
//! count.set(1); // #app now shows 1
//! stop();
//! ```

use std::rc::Rc;

use log::error;
use spark_signals::effect;

use crate::engine::LiveTree;
use crate::primitives::VNode;
use crate::types::NodeId;

use super::session::{Producer, Renderer};

/// Cleanup function returned by [`watch`].
pub type Cleanup = Box<dyn FnOnce()>;

/// Render `producer` into `mount` now and again whenever a signal it reads changes.
///
/// Render errors are logged, not returned: there is no caller to return them
/// to once the effect re-runs on its own. The effect holds the renderer
/// weakly and goes quiet once the renderer is dropped.
pub fn watch<T: LiveTree + 'static>(
    renderer: &Renderer<T>,
    mount: NodeId,
    producer: impl Fn() -> VNode + 'static,
) -> Cleanup {
    let weak = renderer.downgrade();
    let producer: Producer = Rc::new(producer);

    let stop_fn = effect(move || {
        let Some(renderer) = weak.upgrade() else {
            return;
        };
        if let Err(err) = renderer.render_with(mount, Rc::clone(&producer)) {
            error!("render of {mount} failed: {err}");
        }
    });

    Box::new(stop_fn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryTree;
    use crate::h;
    use spark_signals::signal;

    #[test]
    fn test_watch_rerenders_on_signal_change() {
        let mut tree = MemoryTree::new();
        let app = tree.create_root("app");
        let renderer = Renderer::new(tree);

        let count = signal(0_i64);
        let count_view = count.clone();
        let _stop = watch(&renderer, app, move || h!("p", count_view.get()));

        let html = || renderer.with_tree(|tree| tree.outer_html(app)).unwrap();
        assert_eq!(html(), "<div id=\"app\"><p>0</p></div>");
        let p = renderer.mounted_tree(app).unwrap().live();

        count.set(3);
        assert_eq!(html(), "<div id=\"app\"><p>3</p></div>");
        assert_eq!(renderer.mounted_tree(app).unwrap().live(), p);
    }

    #[test]
    fn test_watch_stop() {
        let mut tree = MemoryTree::new();
        let app = tree.create_root("app");
        let renderer = Renderer::new(tree);

        let count = signal(0_i64);
        let count_view = count.clone();
        let stop = watch(&renderer, app, move || h!("p", count_view.get()));

        stop();
        count.set(9);

        let html = renderer.with_tree(|tree| tree.outer_html(app)).unwrap();
        assert_eq!(html, "<div id=\"app\"><p>0</p></div>");
    }
}
