//! Core types shared by the node model, the reconciler, and the backends.
//!
//! - [`NodeId`] - Handle to a node living in a [`LiveTree`](crate::engine::LiveTree)
//! - [`AttrValue`] - Value stored under an attribute key
//! - [`EventHandler`] - Shared callback with reference identity
//! - [`Event`] - Payload handed to handlers on dispatch
//! - [`Changes`] - Bitfield summary of what a render touched

use std::fmt;
use std::rc::Rc;

use crate::error::Result;

/// Attribute keys starting with this prefix name events.
pub const EVENT_PREFIX: &str = "on";

/// Check if an attribute key names an event (`onclick`, `onInput`, ...).
pub fn is_event_name(key: &str) -> bool {
    key.starts_with(EVENT_PREFIX)
}

// =============================================================================
// NodeId - Live node handle
// =============================================================================

/// Handle to a live node.
///
/// Live nodes are NOT owned by the virtual tree. A `NodeId` is an index the
/// backend hands out and resolves; virtual nodes only remember it as a lookup
/// link.
///
/// The generation distinguishes successive occupants of a reused index, so a
/// handle to a released node never resolves to its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    /// Wrap a backend index (first generation).
    pub const fn new(index: usize) -> Self {
        Self::with_generation(index, 0)
    }

    pub const fn with_generation(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The backend index.
    pub const fn index(self) -> usize {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation {
            0 => write!(f, "#{}", self.index),
            generation => write!(f, "#{}v{generation}", self.index),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Event delivered to a handler.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event kind without the prefix ("click", "input", ...).
    pub kind: String,
    /// Live node the event was dispatched to.
    pub target: NodeId,
    /// Optional payload (input value, key name, ...).
    pub value: Option<String>,
}

impl Event {
    /// Create an event without payload.
    pub fn new(kind: impl Into<String>, target: NodeId) -> Self {
        Self {
            kind: kind.into(),
            target,
            value: None,
        }
    }

    /// Create an event carrying a value.
    pub fn with_value(kind: impl Into<String>, target: NodeId, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            target,
            value: Some(value.into()),
        }
    }

    /// Key this event is registered under on a live node (`onclick`).
    pub fn handler_key(&self) -> String {
        format!("{EVENT_PREFIX}{}", self.kind).to_lowercase()
    }
}

/// Event callback.
///
/// Uses `Rc<dyn Fn>` so the same callback can sit in the virtual tree and on
/// the live node at once. Two handlers are equal only if they are the same
/// allocation; a closure recreated on every render compares unequal and is
/// rebound each time.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event) -> Result<()>>);

impl EventHandler {
    /// Wrap a fallible callback.
    pub fn new(f: impl Fn(&Event) -> Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Wrap a callback that cannot fail.
    pub fn infallible(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(move |event: &Event| {
            f(event);
            Ok(())
        }))
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event) -> Result<()> {
        (self.0)(event)
    }

    /// Reference identity.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// AttrValue
// =============================================================================

/// Value of an attribute or event entry.
#[derive(Clone, Debug, Default)]
pub enum AttrValue {
    /// Absent value. Never written on creation; clears on update.
    #[default]
    Null,
    /// `true` sets a no-value attribute, `false` omits it.
    Bool(bool),
    /// String property.
    Str(String),
    /// Numeric property.
    Number(f64),
    /// Callable value. Bound as an event when the key has the event prefix.
    Handler(EventHandler),
}

impl AttrValue {
    /// True for `Null` and `Bool(false)`, the values that never reach the live node.
    pub fn is_absent(&self) -> bool {
        matches!(self, AttrValue::Null | AttrValue::Bool(false))
    }

    /// True if the value is callable.
    pub fn is_handler(&self) -> bool {
        matches!(self, AttrValue::Handler(_))
    }

    /// Borrow the handler, if any.
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            AttrValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Null, AttrValue::Null) => true,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::Number(a), AttrValue::Number(b)) => a == b,
            (AttrValue::Handler(a), AttrValue::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => Ok(()),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(f64::from(value))
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Number(f64::from(value))
    }
}

impl From<EventHandler> for AttrValue {
    fn from(value: EventHandler) -> Self {
        AttrValue::Handler(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Null, Into::into)
    }
}

// =============================================================================
// Changes - What a render touched
// =============================================================================

bitflags::bitflags! {
    /// Kinds of live mutations performed by a render.
    ///
    /// Combine with bitwise OR: `Changes::CREATED | Changes::REMOVED`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Changes: u8 {
        const NONE = 0;
        const CREATED = 1 << 0;
        const REMOVED = 1 << 1;
        const REPLACED = 1 << 2;
        const ATTRIBUTES = 1 << 3;
        const HANDLERS = 1 << 4;
        const TEXT = 1 << 5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_prefix() {
        assert!(is_event_name("onclick"));
        assert!(is_event_name("onInput"));
        assert!(!is_event_name("class"));
        assert!(!is_event_name("Onclick"));
    }

    #[test]
    fn test_handler_equality_is_by_reference() {
        let a = EventHandler::infallible(|_| {});
        let b = EventHandler::infallible(|_| {});

        assert_eq!(AttrValue::Handler(a.clone()), AttrValue::Handler(a.clone()));
        assert_ne!(AttrValue::Handler(a), AttrValue::Handler(b));
    }

    #[test]
    fn test_attr_value_conversions() {
        assert_eq!(AttrValue::from("x"), AttrValue::Str("x".to_string()));
        assert_eq!(AttrValue::from(3_i32), AttrValue::Number(3.0));
        assert_eq!(AttrValue::from(None::<&str>), AttrValue::Null);
        assert!(AttrValue::from(false).is_absent());
        assert!(!AttrValue::from(true).is_absent());
    }

    #[test]
    fn test_node_id_generations_differ() {
        let first = NodeId::new(4);
        let reused = NodeId::with_generation(4, 1);

        assert_ne!(first, reused);
        assert_eq!(first.index(), reused.index());
        assert_eq!(first.to_string(), "#4");
        assert_eq!(reused.to_string(), "#4v1");
    }

    #[test]
    fn test_event_handler_key() {
        let event = Event::new("Click", NodeId::new(3));
        assert_eq!(event.handler_key(), "onclick");
    }

    #[test]
    fn test_changes_flags() {
        let changes = Changes::CREATED | Changes::TEXT;
        assert!(changes.contains(Changes::TEXT));
        assert!(!changes.contains(Changes::REMOVED));
        assert_eq!(Changes::default(), Changes::NONE);
    }
}
