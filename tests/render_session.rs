//! End-to-end render sessions against the in-memory backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::signal;
use spark_vdom::{
    flag, h, on, on_notify, prop, watch, Changes, Event, LiveTree, MemoryTree, NodeId,
    RenderConfig, Renderer, StaleAttributes, VNode, VdomError,
};

fn session() -> (Renderer<MemoryTree>, NodeId) {
    let mut tree = MemoryTree::new();
    let app = tree.create_root("app");
    (Renderer::new(tree), app)
}

fn html(renderer: &Renderer<MemoryTree>, node: NodeId) -> String {
    renderer.with_tree(|tree| tree.outer_html(node)).unwrap()
}

fn reset_counts(renderer: &Renderer<MemoryTree>) {
    renderer.with_tree_mut(MemoryTree::reset_counts).unwrap();
}

fn live_root(renderer: &Renderer<MemoryTree>, mount: NodeId) -> NodeId {
    renderer.mounted_tree(mount).unwrap().live().unwrap()
}

// =============================================================================
// Render / re-render
// =============================================================================

#[test]
fn test_render_then_rerender_updates_in_place() {
    let (renderer, app) = session();
    let class = Rc::new(RefCell::new("x".to_string()));

    let view_class = class.clone();
    renderer
        .render(app, move || h!("div", prop("class", view_class.borrow().as_str()), "hello"))
        .unwrap();
    assert_eq!(html(&renderer, app), r#"<div id="app"><div class="x">hello</div></div>"#);

    let div = live_root(&renderer, app);
    reset_counts(&renderer);

    *class.borrow_mut() = "y".to_string();
    let report = renderer.notify(Some(app)).unwrap();

    assert_eq!(html(&renderer, app), r#"<div id="app"><div class="y">hello</div></div>"#);
    assert_eq!(live_root(&renderer, app), div);
    assert_eq!(report.stats.changes(), Changes::ATTRIBUTES);

    let counts = renderer.with_tree(MemoryTree::counts).unwrap();
    assert_eq!(counts.property_writes, 1);
    assert_eq!(counts.total(), 1);
}

#[test]
fn test_identical_rerender_is_noop() {
    let (renderer, app) = session();
    let view = || {
        h!(
            "section",
            prop("class", "card"),
            flag("hidden"),
            h!("h1", "Title"),
            h!("ul", h!("li", "a"), h!("li", "b")),
        )
    };

    renderer.render(app, view).unwrap();
    reset_counts(&renderer);

    let report = renderer.render(app, view).unwrap();

    assert!(report.stats.is_noop());
    assert_eq!(renderer.with_tree(|tree| tree.counts().total()).unwrap(), 0);
}

#[test]
fn test_tag_change_replaces_subtree() {
    let (renderer, app) = session();
    let tag = Rc::new(Cell::new("p"));

    let view_tag = tag.clone();
    renderer.render(app, move || h!(view_tag.get(), "body")).unwrap();
    let before = live_root(&renderer, app);

    tag.set("span");
    let report = renderer.notify(Some(app)).unwrap();

    assert_eq!(report.stats.replaced, 1);
    assert_eq!(report.stats.created, 2);
    assert_ne!(live_root(&renderer, app), before);
    assert_eq!(html(&renderer, app), r#"<div id="app"><span>body</span></div>"#);
}

#[test]
fn test_children_grow_and_shrink() {
    let (renderer, app) = session();
    let items = Rc::new(RefCell::new(vec!["a", "b"]));

    let view_items = items.clone();
    renderer
        .render(app, move || {
            let lis: Vec<VNode> = view_items.borrow().iter().map(|item| h!("li", *item)).collect();
            h!("ul", lis)
        })
        .unwrap();
    let first_li = renderer
        .with_tree(|tree| tree.children(live_root(&renderer, app))[0])
        .unwrap();

    items.borrow_mut().push("c");
    let grow = renderer.notify(Some(app)).unwrap();
    assert_eq!(grow.stats.created, 2);
    assert_eq!(html(&renderer, app), r#"<div id="app"><ul><li>a</li><li>b</li><li>c</li></ul></div>"#);

    items.borrow_mut().truncate(1);
    let shrink = renderer.notify(Some(app)).unwrap();
    assert_eq!(shrink.stats.removed, 2);
    assert_eq!(html(&renderer, app), r#"<div id="app"><ul><li>a</li></ul></div>"#);

    // Positional reuse keeps the first item's live node
    let still_first = renderer
        .with_tree(|tree| tree.children(live_root(&renderer, app))[0])
        .unwrap();
    assert_eq!(still_first, first_li);
}

#[test]
fn test_null_children_are_skipped() {
    let (renderer, app) = session();
    let show = Rc::new(Cell::new(false));

    let view_show = show.clone();
    renderer
        .render(app, move || {
            let banner = view_show.get().then(|| h!("strong", "new"));
            h!("div", banner, "text")
        })
        .unwrap();
    assert_eq!(html(&renderer, app), r#"<div id="app"><div>text</div></div>"#);

    // The text slot moves to position 1: replaced by the new element, text appended
    show.set(true);
    renderer.notify(Some(app)).unwrap();
    assert_eq!(html(&renderer, app), r#"<div id="app"><div><strong>new</strong>text</div></div>"#);
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn test_stale_attribute_policies() {
    for (policy, expected) in [
        (StaleAttributes::Keep, r#"<div id="app"><p title="t"></p></div>"#),
        (StaleAttributes::Clear, r#"<div id="app"><p></p></div>"#),
    ] {
        let mut tree = MemoryTree::new();
        let app = tree.create_root("app");
        let renderer = Renderer::with_config(tree, RenderConfig::default().with_stale_attributes(policy));
        let titled = Rc::new(Cell::new(true));

        let view_titled = titled.clone();
        renderer
            .render(app, move || {
                let title = view_titled.get().then(|| prop("title", "t"));
                h!("p", title.into_iter().collect::<Vec<_>>())
            })
            .unwrap();

        titled.set(false);
        renderer.notify(Some(app)).unwrap();

        assert_eq!(html(&renderer, app), expected, "policy {policy:?}");
    }
}

#[test]
fn test_flag_toggle_removes_attribute() {
    let (renderer, app) = session();
    let disabled = Rc::new(Cell::new(true));

    let view_disabled = disabled.clone();
    renderer
        .render(app, move || h!("button", prop("disabled", view_disabled.get()), "go"))
        .unwrap();
    assert_eq!(html(&renderer, app), r#"<div id="app"><button disabled>go</button></div>"#);

    disabled.set(false);
    renderer.notify(Some(app)).unwrap();
    assert_eq!(html(&renderer, app), r#"<div id="app"><button>go</button></div>"#);
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn test_event_builder_rejects_bad_name() {
    assert_eq!(
        on("click", |_| {}).unwrap_err(),
        VdomError::InvalidEventName("click".to_string())
    );
}

#[test]
fn test_dispatched_event_notifies_default_mount() {
    let (renderer, app) = session();
    let count = Rc::new(Cell::new(0_i64));

    let view = {
        let renderer = renderer.clone();
        let count = count.clone();
        move || {
            let bump = count.clone();
            let increment = on_notify(&renderer, "onClick", move |_| bump.set(bump.get() + 1)).unwrap();
            h!("button", increment, format!("count: {}", count.get()))
        }
    };
    renderer.render(app, view).unwrap();
    let button = live_root(&renderer, app);

    for _ in 0..3 {
        assert!(renderer.dispatch(&Event::new("click", button)).unwrap());
    }

    assert_eq!(count.get(), 3);
    assert_eq!(html(&renderer, app), r#"<div id="app"><button>count: 3</button></div>"#);
}

#[test]
fn test_dispatch_surfaces_handler_error() {
    let mut tree = MemoryTree::new();
    let app = tree.create_root("main");
    let renderer = Renderer::new(tree);

    // Default mount id is "app", which does not exist here
    let view = {
        let renderer = renderer.clone();
        move || h!("button", on_notify(&renderer, "onclick", |_| {}).unwrap())
    };
    renderer.render(app, view).unwrap();

    let err = renderer
        .dispatch(&Event::new("click", live_root(&renderer, app)))
        .unwrap_err();
    assert_eq!(err, VdomError::DefaultMountNotFound("app".to_string()));
}

// =============================================================================
// Registry consistency
// =============================================================================

#[test]
fn test_reentrant_render_of_same_mount_rejected() {
    let (renderer, app) = session();
    let inner = Rc::new(RefCell::new(None));

    let weak = renderer.downgrade();
    let seen = inner.clone();
    renderer
        .render(app, move || {
            if let Some(renderer) = weak.upgrade() {
                *seen.borrow_mut() = Some(renderer.render(app, || h!("p", "inner")));
            }
            h!("p", "outer")
        })
        .unwrap();

    let inner = inner.borrow_mut().take().unwrap();
    assert_eq!(inner.unwrap_err(), VdomError::RenderInProgress(app));
    assert_eq!(html(&renderer, app), r#"<div id="app"><p>outer</p></div>"#);
}

#[test]
fn test_multiple_mounts_are_independent() {
    let mut tree = MemoryTree::new();
    let left = tree.create_root("left");
    let right = tree.create_root("right");
    let renderer = Renderer::new(tree);

    renderer.render(left, || h!("p", "L")).unwrap();
    renderer.render(right, || h!("p", "R")).unwrap();

    let mut mounts = renderer.mounts();
    mounts.sort();
    assert_eq!(mounts, vec![left, right]);

    renderer.unmount(left).unwrap();
    assert!(!renderer.is_mounted(left));
    assert_eq!(html(&renderer, right), r#"<div id="right"><p>R</p></div>"#);
}

#[test]
fn test_live_nodes_released_on_replacement() {
    let (renderer, app) = session();
    let big = Rc::new(Cell::new(true));

    let view_big = big.clone();
    renderer
        .render(app, move || {
            if view_big.get() {
                h!("ul", h!("li", "1"), h!("li", "2"), h!("li", "3"))
            } else {
                h!("p", "small")
            }
        })
        .unwrap();
    // app + ul + 3 li + 3 text
    assert_eq!(renderer.with_tree(MemoryTree::node_count).unwrap(), 8);

    big.set(false);
    renderer.notify(Some(app)).unwrap();

    // app + p + text
    assert_eq!(renderer.with_tree(MemoryTree::node_count).unwrap(), 3);
}

// =============================================================================
// Reactive
// =============================================================================

#[test]
fn test_watch_follows_signal() {
    let (renderer, app) = session();
    let name = signal("world".to_string());

    let view_name = name.clone();
    let stop = watch(&renderer, app, move || h!("p", format!("hello {}", view_name.get())));
    let p = live_root(&renderer, app);

    name.set("rust".to_string());

    assert_eq!(html(&renderer, app), r#"<div id="app"><p>hello rust</p></div>"#);
    assert_eq!(live_root(&renderer, app), p);
    stop();
}

#[test]
fn test_rendered_id_does_not_shadow_default_mount() {
    let mut tree = MemoryTree::new();
    let placeholder = tree.create_element("p").unwrap();
    let app = tree.create_root("app");
    // Frees the lowest index, so the rendered div lands below the mount point
    tree.discard(placeholder).unwrap();
    let renderer = Renderer::new(tree);

    renderer.render(app, || h!("div", prop("id", "app"), "inner")).unwrap();
    assert!(live_root(&renderer, app).index() < app.index());

    let report = renderer.notify(None).unwrap();
    assert_eq!(report.mount, app);
    assert_eq!(renderer.default_mount().unwrap(), app);
}

#[test]
fn test_backend_lookup_by_id() {
    let (renderer, app) = session();
    assert_eq!(renderer.with_tree(|tree| tree.find_by_id("app")).unwrap(), Some(app));
    assert_eq!(renderer.default_mount().unwrap(), app);
}
