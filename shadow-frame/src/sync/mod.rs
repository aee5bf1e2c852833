//! The synchronization engine.
//!
//! A shadow container starts `Pending` over an embedded document that may still be
//! loading. The engine runs once that document is ready and wires it up: styles,
//! event bridging, content migration and geometry tracking.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{
    backend::{head_of, Backend, BackendDocument, BackendFrame, BackendNode, ReadyState},
    body::CurrentBody,
    error::Error,
    host,
    uid::UniqueId,
};

pub mod bridge;
pub mod notifier;
pub mod resize;
pub mod style;

use bridge::EventBridge;
use notifier::NotifierKind;
use resize::ResizeTracker;

/// The engine state of a shadow container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// The embedded document is not ready; operations target the placeholder body.
    Pending,
    /// The embedded document is wired up.
    Ready,
}

/// The embedded surface of a shadow container.
pub(crate) struct Surface<B: Backend> {
    pub(crate) frame: B::Frame,
    document: RefCell<B::Document>,
    pub(crate) body: CurrentBody<B>,
    pub(crate) resize: ResizeTracker,
    state: Cell<SyncState>,
    notifier: Cell<Option<NotifierKind>>,
}

impl<B: Backend> Surface<B> {
    /// Read the initial content document of `frame`.
    ///
    /// Some hosts have no body in a freshly created frame, so a detached placeholder
    /// is created in that case.
    pub(crate) fn open(frame: B::Frame) -> Result<Rc<Self>, Error> {
        let document = frame.content_document().ok_or_else(|| {
            Error::SurfaceUnavailable("the frame has no content document".to_string())
        })?;
        let body = match document.body() {
            Some(x) => x,
            None => document.create_element("body")?,
        };
        Ok(Rc::new(Self {
            frame,
            document: RefCell::new(document),
            body: CurrentBody::new(body),
            resize: ResizeTracker::new(),
            state: Cell::new(SyncState::Pending),
            notifier: Cell::new(None),
        }))
    }

    /// The embedded document as currently known.
    pub(crate) fn document(&self) -> B::Document {
        self.document.borrow().clone()
    }

    pub(crate) fn state(&self) -> SyncState {
        self.state.get()
    }

    pub(crate) fn notifier(&self) -> Option<NotifierKind> {
        self.notifier.get()
    }

    /// Measure the body and re-check the styles.
    fn refresh(&self) {
        let body = self.body.get();
        if let Err(err) = self.resize.measure::<B>(&self.frame.element(), &body) {
            log::warn!("Cannot resize the shadow frame: {}", err);
        }
        if let Some(root) = self.document().document_element() {
            style::rewrite_styles::<B>(&root);
        }
    }
}

struct Engine<B: Backend> {
    backend: Rc<B>,
    surface: Rc<Surface<B>>,
    bridge: Rc<EventBridge<B>>,
    id: UniqueId,
}

/// Run the engine now if the embedded document is complete, otherwise when it loads.
///
/// Errors of a synchronous run are returned. Errors of a deferred run can only be logged.
pub(crate) fn schedule<B: Backend>(
    backend: &Rc<B>,
    surface: &Rc<Surface<B>>,
    bridge: &Rc<EventBridge<B>>,
    id: &UniqueId,
) -> Result<(), Error> {
    let engine = Engine {
        backend: backend.clone(),
        surface: surface.clone(),
        bridge: bridge.clone(),
        id: id.clone(),
    };
    if surface.document().ready_state() == ReadyState::Complete {
        return engine.run();
    }
    log::debug!("Shadow root {} waits for its frame to load", id);
    surface.frame.on_load(Box::new(move || {
        if let Err(err) = engine.run() {
            log::error!("Shadow root {} failed to become ready: {}", engine.id, err);
        }
    }));
    Ok(())
}

impl<B: Backend> Engine<B> {
    fn run(&self) -> Result<(), Error> {
        let surface = &self.surface;
        if surface.state.get() == SyncState::Ready {
            return Ok(());
        }

        // the loaded document may replace the initial one
        let document = surface.frame.content_document().ok_or_else(|| {
            Error::SurfaceUnavailable("the loaded frame has no content document".to_string())
        })?;
        *surface.document.borrow_mut() = document.clone();
        let root = document.document_element().ok_or_else(|| {
            Error::SurfaceUnavailable("the loaded document has no root element".to_string())
        })?;
        let live_body = document.body().ok_or_else(|| {
            Error::SurfaceUnavailable("the loaded document has no body".to_string())
        })?;

        let head = head_of::<B>(&document).ok_or_else(|| {
            Error::SurfaceUnavailable("the loaded document has no head".to_string())
        })?;
        let reset = document.create_element("style")?;
        reset.set_text_content(&host::surface_style());
        head.append_child(&reset)?;

        style::rewrite_styles::<B>(&root);

        let placeholder = surface.body.get();
        if placeholder != live_body {
            let mut moved = 0;
            while let Some(child) = placeholder.first_child() {
                live_body.append_child(&child)?;
                moved += 1;
            }
            log::debug!("Shadow root {} moved {} nodes into the frame body", self.id, moved);
        }
        surface.body.settle(live_body.clone());

        // replayed dispatches must travel through the live tree
        self.bridge.install(root, live_body.clone());

        // the observation lasts as long as the frame, with or without a container handle
        let tracked = surface.clone();
        let callback: Rc<dyn Fn()> = Rc::new(move || tracked.refresh());
        match notifier::observe(&self.backend, &surface.frame, &live_body, callback.clone()) {
            Ok(kind) => surface.notifier.set(Some(kind)),
            Err(err) => log::error!("Shadow root {} cannot track its body: {}", self.id, err),
        }
        callback();

        surface.state.set(SyncState::Ready);
        log::debug!("Shadow root {} is ready ({:?} notifier)", self.id, surface.notifier());
        Ok(())
    }
}
