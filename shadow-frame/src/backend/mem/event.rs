use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use super::{MemBackend, MemNode};
use crate::{
    backend::{BackendEvent, BackendNode},
    error::Error,
};

/// The built-in event properties that cannot be assigned.
pub const READ_ONLY_PROPERTIES: &[&str] = &[
    "type",
    "bubbles",
    "cancelable",
    "target",
    "currentTarget",
    "defaultPrevented",
    "isTrusted",
];

/// The value of an event property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Node(MemNode),
}

struct EventInner {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    target: RefCell<Option<MemNode>>,
    current_target: RefCell<Option<MemNode>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    properties: RefCell<Vec<(String, PropertyValue)>>,
}

/// An in-memory event. Clones share the same event.
#[derive(Clone)]
pub struct MemEvent {
    inner: Rc<EventInner>,
}

impl fmt::Debug for MemEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemEvent")
            .field("type", &self.inner.event_type)
            .field("bubbles", &self.inner.bubbles)
            .field("cancelable", &self.inner.cancelable)
            .finish()
    }
}

impl MemEvent {
    pub fn new(event_type: &str, bubbles: bool, cancelable: bool) -> Self {
        Self {
            inner: Rc::new(EventInner {
                event_type: event_type.to_string(),
                bubbles,
                cancelable,
                target: RefCell::new(None),
                current_target: RefCell::new(None),
                default_prevented: Cell::new(false),
                propagation_stopped: Cell::new(false),
                properties: RefCell::new(vec![]),
            }),
        }
    }

    /// Add a custom enumerable property.
    pub fn with_property(self, name: &str, value: PropertyValue) -> Self {
        self.set_custom(name, value);
        self
    }

    /// Read a property, built-in or custom.
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        let inner = &self.inner;
        let node = |x: &RefCell<Option<MemNode>>| {
            Some(match &*x.borrow() {
                Some(n) => PropertyValue::Node(n.clone()),
                None => PropertyValue::Null,
            })
        };
        match name {
            "type" => Some(PropertyValue::String(inner.event_type.clone())),
            "bubbles" => Some(PropertyValue::Bool(inner.bubbles)),
            "cancelable" => Some(PropertyValue::Bool(inner.cancelable)),
            "target" => node(&inner.target),
            "currentTarget" => node(&inner.current_target),
            "defaultPrevented" => Some(PropertyValue::Bool(inner.default_prevented.get())),
            "isTrusted" => Some(PropertyValue::Bool(false)),
            _ => inner
                .properties
                .borrow()
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
        }
    }

    pub fn current_target(&self) -> Option<MemNode> {
        self.inner.current_target.borrow().clone()
    }

    pub fn prevent_default(&self) {
        if self.inner.cancelable {
            self.inner.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.inner.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.inner.propagation_stopped.set(true);
    }

    fn set_custom(&self, name: &str, value: PropertyValue) {
        let mut properties = self.inner.properties.borrow_mut();
        match properties.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => properties.push((name.to_string(), value)),
        }
    }

    /// Run the listeners of the propagation path, returning whether the default is not prevented.
    pub(super) fn dispatch_on(&self, target: &MemNode) -> bool {
        let inner = &self.inner;
        *inner.target.borrow_mut() = Some(target.clone());
        inner.propagation_stopped.set(false);
        let mut cur = Some(target.clone());
        while let Some(node) = cur {
            *inner.current_target.borrow_mut() = Some(node.clone());
            for listener in node.listeners_of(&inner.event_type) {
                listener.call(self);
            }
            if inner.propagation_stopped.get() || !inner.bubbles {
                break;
            }
            cur = node.parent_node();
        }
        *inner.current_target.borrow_mut() = None;
        !inner.default_prevented.get()
    }
}

impl BackendEvent<MemBackend> for MemEvent {
    fn event_type(&self) -> String {
        self.inner.event_type.clone()
    }

    fn bubbles(&self) -> bool {
        self.inner.bubbles
    }

    fn cancelable(&self) -> bool {
        self.inner.cancelable
    }

    fn target(&self) -> Option<MemNode> {
        self.inner.target.borrow().clone()
    }

    fn property_names(&self) -> Vec<String> {
        READ_ONLY_PROPERTIES
            .iter()
            .map(|x| x.to_string())
            .chain(self.inner.properties.borrow().iter().map(|(n, _)| n.clone()))
            .collect()
    }

    fn copy_property(&self, from: &Self, name: &str) -> Result<(), Error> {
        if READ_ONLY_PROPERTIES.contains(&name) {
            return Err(Error::backend(format!("Event property {:?} is read-only", name)));
        }
        let value = from
            .property(name)
            .ok_or_else(|| Error::backend(format!("Event property {:?} does not exist", name)))?;
        self.set_custom(name, value);
        Ok(())
    }
}
