//! Builders - Terse construction of virtual trees.
//!
//! Sugar over [`VNode::element`]. Arguments are an explicit tagged variant,
//! [`Arg`], so an attribute can never be mistaken for a child:
//!
//! ```ignore
//! use spark_vdom::{h, prop, flag, on};
//!
//! let view = h!("form",
//!     prop("class", "login"),
//!     h!("input", prop("name", "user"), flag("required")),
//!     h!("button", on("onclick", |_| submit())?, "Sign in"),
//! );
//! ```
//!
//! Event builders validate their key up front: anything not starting with
//! `on` fails at the call site that built the attribute.

use crate::engine::LiveTree;
use crate::error::{Result, VdomError};
use crate::pipeline::Renderer;
use crate::types::{is_event_name, AttrValue, Event, EventHandler};

use super::node::{Children, VNode};

// =============================================================================
// Attr / Arg
// =============================================================================

/// A single attribute entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: AttrValue,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Builder argument: attributes or a child.
#[derive(Clone, Debug)]
pub enum Arg {
    Attrs(Vec<Attr>),
    Child(Children),
}

impl From<Attr> for Arg {
    fn from(attr: Attr) -> Self {
        Arg::Attrs(vec![attr])
    }
}

impl From<Vec<Attr>> for Arg {
    fn from(attrs: Vec<Attr>) -> Self {
        Arg::Attrs(attrs)
    }
}

impl From<Children> for Arg {
    fn from(children: Children) -> Self {
        Arg::Child(children)
    }
}

impl From<VNode> for Arg {
    fn from(node: VNode) -> Self {
        Arg::Child(node.into())
    }
}

impl From<Option<VNode>> for Arg {
    fn from(node: Option<VNode>) -> Self {
        Arg::Child(node.into())
    }
}

impl From<Vec<VNode>> for Arg {
    fn from(nodes: Vec<VNode>) -> Self {
        Arg::Child(nodes.into())
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Arg::Child(text.into())
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Arg::Child(text.into())
    }
}

macro_rules! text_arg_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Child(VNode::text(value).into())
                }
            }
        )*
    };
}

text_arg_from!(i32, i64, u32, u64, usize, f64);

// =============================================================================
// Element builder
// =============================================================================

/// Build an element from tagged arguments.
///
/// Attribute sets merge left to right; a later key overrides an earlier one.
pub fn h(tag: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> VNode {
    let mut attributes = Vec::new();
    let mut children = Vec::new();

    for arg in args {
        match arg {
            Arg::Attrs(attrs) => {
                attributes.extend(attrs.into_iter().map(|a| (a.key, a.value)));
            }
            Arg::Child(child) => children.push(child),
        }
    }

    VNode::element(tag, attributes, children)
}

/// Build an element with mixed attribute and child arguments.
///
/// `h!("div", prop("class", "x"), "hello")`
#[macro_export]
macro_rules! h {
    ($tag:expr $(, $arg:expr)* $(,)?) => {{
        let args: ::std::vec::Vec<$crate::primitives::Arg> =
            ::std::vec![$($crate::primitives::Arg::from($arg)),*];
        $crate::primitives::h($tag, args)
    }};
}

/// Tag builder functions: `tags::div(args)`.
pub mod tags {
    use super::{h, Arg};
    use crate::primitives::VNode;

    macro_rules! tag_fns {
        ($($name:ident),*) => {
            $(
                #[doc = concat!("Build a `<", stringify!($name), ">` element.")]
                pub fn $name(args: impl IntoIterator<Item = Arg>) -> VNode {
                    h(stringify!($name), args)
                }
            )*
        };
    }

    tag_fns!(div, span, p, a, button, ul, ol, li, input, label, section, h1, h2, h3);
}

// =============================================================================
// Attribute builders
// =============================================================================

/// Attribute assigned as a property.
pub fn prop(key: impl Into<String>, value: impl Into<AttrValue>) -> Attr {
    Attr::new(key, value)
}

/// No-value attribute (`disabled`, `checked`, ...).
pub fn flag(key: impl Into<String>) -> Attr {
    Attr::new(key, true)
}

// =============================================================================
// Event builders
// =============================================================================

fn event_key(key: impl Into<String>) -> Result<String> {
    let key = key.into();
    if !is_event_name(&key) {
        return Err(VdomError::InvalidEventName(key));
    }
    Ok(key)
}

/// Event attribute. Fails if `key` lacks the `on` prefix.
pub fn on(key: impl Into<String>, f: impl Fn(&Event) + 'static) -> Result<Attr> {
    let key = event_key(key)?;
    Ok(Attr::new(key, EventHandler::infallible(f)))
}

/// Event attribute whose handler re-renders the default mount point after `f` runs.
///
/// Holds the renderer weakly; firing after the renderer is gone yields
/// [`VdomError::RendererDropped`].
pub fn on_notify<T: LiveTree + 'static>(
    renderer: &Renderer<T>,
    key: impl Into<String>,
    f: impl Fn(&Event) + 'static,
) -> Result<Attr> {
    let key = event_key(key)?;
    let weak = renderer.downgrade();

    let handler = EventHandler::new(move |event: &Event| {
        f(event);
        let renderer = weak.upgrade().ok_or(VdomError::RendererDropped)?;
        renderer.notify(None).map(|_| ())
    });

    Ok(Attr::new(key, handler))
}
