use std::rc::Rc;

use crate::{
    backend::{Backend, BackendFrame, BackendNode, Listener},
    debounce::Debouncer,
    error::Error,
};

/// The legacy coarse-grained change notification.
pub const SUBTREE_MODIFIED: &str = "DOMSubtreeModified";

/// The delay of the fallback notifier after the last change of a burst.
pub const DEBOUNCE_DELAY_MS: u32 = 0;

/// How subtree changes of the embedded body are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    /// The native mutation observer of the frame window.
    Native,
    /// Debounced legacy subtree-modified events.
    SubtreeModified,
}

/// Call `callback` whenever the subtree of `body` changes.
///
/// There is no teardown: the observation lasts as long as the body.
pub(crate) fn observe<B: Backend>(
    backend: &Rc<B>,
    frame: &B::Frame,
    body: &B::Node,
    callback: Rc<dyn Fn()>,
) -> Result<NotifierKind, Error> {
    if frame.has_mutation_observer() {
        body.observe_mutations(callback)?;
        return Ok(NotifierKind::Native);
    }
    let debouncer = Debouncer::new(backend.clone(), DEBOUNCE_DELAY_MS, move || callback());
    let listener = Listener::new(move |_: &B::Event| debouncer.trigger());
    body.add_event_listener(SUBTREE_MODIFIED, &listener);
    Ok(NotifierKind::SubtreeModified)
}
