//! The backend-related interface.
//!
//! A backend is the host environment: it owns the real document and node model,
//! creates embedded frames, dispatches events and runs timers.
//! The shadow container logic only talks to these traits.

use std::{fmt, rc::Rc};

use crate::{error::Error, host::Registry};

pub mod mem;

/// The node type of an element.
pub const ELEMENT_NODE: u16 = 1;
/// The node type of a text node.
pub const TEXT_NODE: u16 = 3;
/// The node type of a comment.
pub const COMMENT_NODE: u16 = 8;
/// The node type of a document fragment.
pub const DOCUMENT_FRAGMENT_NODE: u16 = 11;

/// The loading state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Parse the `document.readyState` string.
    ///
    /// Unknown strings are treated as still loading.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "complete" => Self::Complete,
            "interactive" => Self::Interactive,
            _ => Self::Loading,
        }
    }
}

/// An event listener.
///
/// Clones share the same identity.
/// Two listeners are equal only if they are clones of each other.
pub struct Listener<E> {
    f: Rc<dyn Fn(&E)>,
}

impl<E> Listener<E> {
    /// Create a listener from a callback.
    pub fn new(f: impl 'static + Fn(&E)) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Invoke the listener.
    #[inline]
    pub fn call(&self, event: &E) {
        (self.f)(event)
    }
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<E> PartialEq for Listener<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl<E> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.f) as *const ())
    }
}

/// The interface that a backend should implement.
pub trait Backend: 'static + Sized {
    /// A node handle. Equality is node identity.
    type Node: BackendNode<Self>;
    /// A document handle. Equality is document identity.
    type Document: BackendDocument<Self>;
    /// An embedded frame.
    type Frame: BackendFrame<Self>;
    /// An event object.
    type Event: BackendEvent<Self>;
    /// A pending timer.
    type Timer: fmt::Debug;

    /// The record of patched documents and open shadow roots of this backend.
    fn registry(&self) -> &Registry<Self>;

    /// Run `task` after `delay_ms` milliseconds.
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<Self::Timer, Error>;

    /// Cancel a pending timer. Cancelling a fired timer does nothing.
    fn clear_timeout(&self, timer: Self::Timer);
}

/// A node in a backend document.
pub trait BackendNode<B: Backend>: Clone + PartialEq + fmt::Debug + 'static {
    fn node_name(&self) -> String;
    fn node_type(&self) -> u16;
    /// The tag name, `None` if the node is not an element.
    fn tag_name(&self) -> Option<String>;
    fn owner_document(&self) -> Option<B::Document>;
    fn parent_node(&self) -> Option<B::Node>;
    fn child_nodes(&self) -> Vec<B::Node>;
    fn first_child(&self) -> Option<B::Node>;
    fn last_child(&self) -> Option<B::Node>;

    /// Append `child`, moving it from its current parent if any.
    fn append_child(&self, child: &B::Node) -> Result<(), Error>;
    fn insert_before(&self, child: &B::Node, reference: Option<&B::Node>) -> Result<(), Error>;
    fn remove_child(&self, child: &B::Node) -> Result<(), Error>;
    fn replace_child(&self, new_child: &B::Node, old_child: &B::Node) -> Result<(), Error>;
    /// Whether `other` is this node or one of its descendants.
    fn contains(&self, other: &B::Node) -> bool;

    fn get_attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error>;
    fn remove_attribute(&self, name: &str) -> Result<(), Error>;

    fn inner_html(&self) -> String;
    fn set_inner_html(&self, html: &str) -> Result<(), Error>;
    fn text_content(&self) -> String;
    fn set_text_content(&self, text: &str);

    /// The descendant elements with the tag name, in tree order. `*` matches all.
    fn elements_by_tag_name(&self, tag_name: &str) -> Vec<B::Node>;
    fn element_by_id(&self, id: &str) -> Option<B::Node>;

    /// The rendered box size in integer pixels, `(width, height)`.
    fn offset_size(&self) -> (i32, i32);
    /// Replace the whole inline style.
    fn set_style_text(&self, css_text: &str) -> Result<(), Error>;
    fn set_style_property(&self, name: &str, value: &str) -> Result<(), Error>;

    /// Register a listener directly, without any bridging.
    fn add_event_listener(&self, event_type: &str, listener: &Listener<B::Event>);
    fn remove_event_listener(&self, event_type: &str, listener: &Listener<B::Event>);
    /// Dispatch an event, returning `false` if the default was prevented.
    fn dispatch_event(&self, event: &B::Event) -> Result<bool, Error>;

    /// Watch child-list, attribute and subtree changes with the native observer.
    fn observe_mutations(&self, callback: Rc<dyn Fn()>) -> Result<(), Error>;
}

/// A backend document.
pub trait BackendDocument<B: Backend>: Clone + PartialEq + fmt::Debug + 'static {
    fn ready_state(&self) -> ReadyState;
    fn document_element(&self) -> Option<B::Node>;
    fn head(&self) -> Option<B::Node>;
    fn body(&self) -> Option<B::Node>;
    fn active_element(&self) -> Option<B::Node>;
    fn create_element(&self, tag_name: &str) -> Result<B::Node, Error>;
    fn create_fragment(&self) -> Result<B::Node, Error>;
    /// Create an embedded frame owned by this document. It is not inserted anywhere yet.
    fn create_frame(&self) -> Result<B::Frame, Error>;
    fn create_event(&self, event_type: &str, bubbles: bool, cancelable: bool) -> Result<B::Event, Error>;
}

/// An embedded frame, i.e. a nested document hosted by an element.
pub trait BackendFrame<B: Backend>: Clone + fmt::Debug + 'static {
    /// The frame element in its owner document.
    fn element(&self) -> B::Node;
    /// The current content document. It may be replaced when loading finishes.
    fn content_document(&self) -> Option<B::Document>;
    /// Run `task` once when the frame finishes loading.
    fn on_load(&self, task: Box<dyn FnOnce()>);
    /// Whether the frame window provides a native mutation observer.
    fn has_mutation_observer(&self) -> bool;
}

/// An event object.
pub trait BackendEvent<B: Backend>: Clone + fmt::Debug + 'static {
    fn event_type(&self) -> String;
    fn bubbles(&self) -> bool;
    fn cancelable(&self) -> bool;
    fn target(&self) -> Option<B::Node>;
    /// The enumerable property names of the event.
    fn property_names(&self) -> Vec<String>;
    /// Copy the property `name` from `from` onto this event.
    ///
    /// Fails for properties that are not writable on this event.
    fn copy_property(&self, from: &Self, name: &str) -> Result<(), Error>;
}

/// Find the head of a document, falling back to the first `head` element.
pub fn head_of<B: Backend>(document: &B::Document) -> Option<B::Node> {
    document.head().or_else(|| {
        document
            .document_element()
            .and_then(|root| root.elements_by_tag_name("head").into_iter().next())
    })
}
