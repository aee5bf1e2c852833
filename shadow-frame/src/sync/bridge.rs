//! Event registration inside the embedded document.
//!
//! Listeners registered on nodes of the shadow content are mirrored by a listener on
//! the embedded root element. When an event reaches the root from inside the node a
//! listener was meant for, an equivalent event is dispatched on the frame's parent in
//! the outer document, so shadow events appear to bubble out through the host.
//!
//! Until the embedded document is ready every call is recorded and replayed in order.

use std::{cell::RefCell, rc::Rc};

use super::Surface;
use crate::{
    backend::{Backend, BackendDocument, BackendEvent, BackendFrame, BackendNode, Listener},
    error::Error,
};

/// The node a call is aimed at.
pub(crate) enum ListenerTarget<B: Backend> {
    /// The current body of the container, resolved when the call is carried out.
    Body,
    Node(B::Node),
}

impl<B: Backend> Clone for ListenerTarget<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Body => Self::Body,
            Self::Node(x) => Self::Node(x.clone()),
        }
    }
}

enum PendingCall<B: Backend> {
    Add {
        target: ListenerTarget<B>,
        event_type: String,
        listener: Listener<B::Event>,
    },
    Remove {
        target: ListenerTarget<B>,
        event_type: String,
        listener: Listener<B::Event>,
    },
    Dispatch {
        target: ListenerTarget<B>,
        event: B::Event,
    },
}

enum BridgeState<B: Backend> {
    Pending(Vec<PendingCall<B>>),
    Installed { root: B::Node, body: B::Node },
}

struct Registration<B: Backend> {
    target: B::Node,
    event_type: String,
    listener: Listener<B::Event>,
    shadow: Listener<B::Event>,
}

/// The listener registry of one shadow container.
pub struct EventBridge<B: Backend> {
    surface: Rc<Surface<B>>,
    state: RefCell<BridgeState<B>>,
    registrations: RefCell<Vec<Registration<B>>>,
}

impl<B: Backend> EventBridge<B> {
    pub(crate) fn new(surface: Rc<Surface<B>>) -> Self {
        Self {
            surface,
            state: RefCell::new(BridgeState::Pending(vec![])),
            registrations: RefCell::new(vec![]),
        }
    }

    /// Whether the bridge has been installed on a ready document.
    pub fn is_installed(&self) -> bool {
        matches!(&*self.state.borrow(), BridgeState::Installed { .. })
    }

    /// The number of calls waiting for the document to be ready.
    pub fn pending_len(&self) -> usize {
        match &*self.state.borrow() {
            BridgeState::Pending(x) => x.len(),
            BridgeState::Installed { .. } => 0,
        }
    }

    /// The number of bridged listeners currently registered.
    pub fn registration_count(&self) -> usize {
        self.registrations.borrow().len()
    }

    /// Register `listener` on a node of the shadow content.
    ///
    /// Registering the same `(event_type, listener)` pair twice on a node does nothing.
    pub fn add_event_listener(&self, target: &B::Node, event_type: &str, listener: &Listener<B::Event>) {
        self.add(ListenerTarget::Node(target.clone()), event_type, listener)
    }

    /// Remove a listener and its bridging counterpart.
    pub fn remove_event_listener(
        &self,
        target: &B::Node,
        event_type: &str,
        listener: &Listener<B::Event>,
    ) {
        self.remove(ListenerTarget::Node(target.clone()), event_type, listener)
    }

    /// Dispatch an event on a node of the shadow content.
    ///
    /// Returns `None` if the dispatch is deferred until the document is ready,
    /// otherwise whether the default action was not prevented.
    pub fn dispatch_event(&self, target: &B::Node, event: &B::Event) -> Result<Option<bool>, Error> {
        self.dispatch(ListenerTarget::Node(target.clone()), event)
    }

    pub(crate) fn add(&self, target: ListenerTarget<B>, event_type: &str, listener: &Listener<B::Event>) {
        let (root, target) = match self.resolve_or_defer(target, |target| PendingCall::Add {
            target,
            event_type: event_type.to_string(),
            listener: listener.clone(),
        }) {
            Some(x) => x,
            None => return,
        };
        if self.position(&target, event_type, listener).is_some() {
            return;
        }
        let shadow = {
            let frame = self.surface.frame.clone();
            let scope = target.clone();
            Listener::new(move |event: &B::Event| {
                let inside = match event.target() {
                    Some(t) => scope.contains(&t),
                    None => false,
                };
                if inside {
                    bridge_out::<B>(&frame, event);
                }
            })
        };
        target.add_event_listener(event_type, listener);
        root.add_event_listener(event_type, &shadow);
        self.registrations.borrow_mut().push(Registration {
            target,
            event_type: event_type.to_string(),
            listener: listener.clone(),
            shadow,
        });
    }

    pub(crate) fn remove(&self, target: ListenerTarget<B>, event_type: &str, listener: &Listener<B::Event>) {
        let (root, target) = match self.resolve_or_defer(target, |target| PendingCall::Remove {
            target,
            event_type: event_type.to_string(),
            listener: listener.clone(),
        }) {
            Some(x) => x,
            None => return,
        };
        let registration = match self.position(&target, event_type, listener) {
            Some(index) => self.registrations.borrow_mut().remove(index),
            None => return,
        };
        target.remove_event_listener(event_type, &registration.listener);
        root.remove_event_listener(event_type, &registration.shadow);
    }

    pub(crate) fn dispatch(&self, target: ListenerTarget<B>, event: &B::Event) -> Result<Option<bool>, Error> {
        let (_, target) = match self.resolve_or_defer(target, |target| PendingCall::Dispatch {
            target,
            event: event.clone(),
        }) {
            Some(x) => x,
            None => return Ok(None),
        };
        target.dispatch_event(event).map(Some)
    }

    /// Switch to the installed state and replay the recorded calls in order.
    ///
    /// `root` receives the bridging listeners; `body` is the body that calls aimed at
    /// the container body resolve to from now on.
    pub(crate) fn install(&self, root: B::Node, body: B::Node) {
        let pending = {
            let mut state = self.state.borrow_mut();
            let prev = std::mem::replace(&mut *state, BridgeState::Installed { root, body });
            match prev {
                BridgeState::Pending(x) => x,
                BridgeState::Installed { .. } => {
                    log::error!("The event bridge has already been installed");
                    return;
                }
            }
        };
        log::debug!("Replaying {} recorded listener calls", pending.len());
        for call in pending {
            match call {
                PendingCall::Add {
                    target,
                    event_type,
                    listener,
                } => self.add(target, &event_type, &listener),
                PendingCall::Remove {
                    target,
                    event_type,
                    listener,
                } => self.remove(target, &event_type, &listener),
                PendingCall::Dispatch { target, event } => {
                    if let Err(err) = self.dispatch(target, &event) {
                        log::warn!("Replayed event dispatch failed: {}", err);
                    }
                }
            }
        }
    }

    fn resolve_or_defer(
        &self,
        target: ListenerTarget<B>,
        record: impl FnOnce(ListenerTarget<B>) -> PendingCall<B>,
    ) -> Option<(B::Node, B::Node)> {
        let mut state = self.state.borrow_mut();
        match &mut *state {
            BridgeState::Pending(calls) => {
                calls.push(record(target));
                None
            }
            BridgeState::Installed { root, body } => {
                let target = match target {
                    ListenerTarget::Body => body.clone(),
                    ListenerTarget::Node(x) => x,
                };
                Some((root.clone(), target))
            }
        }
    }

    fn position(&self, target: &B::Node, event_type: &str, listener: &Listener<B::Event>) -> Option<usize> {
        self.registrations.borrow().iter().position(|r| {
            r.target == *target && r.event_type == event_type && r.listener == *listener
        })
    }
}

/// Re-dispatch `event` on the parent of the frame element in the outer document.
fn bridge_out<B: Backend>(frame: &B::Frame, event: &B::Event) {
    let element = frame.element();
    let (host, document) = match (element.parent_node(), element.owner_document()) {
        (Some(host), Some(document)) => (host, document),
        _ => {
            log::warn!("Cannot bridge event {:?} out of a detached frame", event.event_type());
            return;
        }
    };
    let bridged = match document.create_event(&event.event_type(), event.bubbles(), event.cancelable()) {
        Ok(x) => x,
        Err(err) => {
            log::warn!("Cannot create bridged event {:?}: {}", event.event_type(), err);
            return;
        }
    };
    for name in event.property_names() {
        if let Err(err) = bridged.copy_property(event, &name) {
            log::trace!("Event property {:?} not copied: {}", name, err);
        }
    }
    if let Err(err) = host.dispatch_event(&bridged) {
        log::warn!("Bridged event dispatch failed: {}", err);
    }
}
