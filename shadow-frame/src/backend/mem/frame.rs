use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use super::{FrameLoading, MemBackend, MemContext, MemDocument, MemNode};
use crate::backend::{BackendFrame, ReadyState};

struct FrameInner {
    ctx: Rc<MemContext>,
    element: MemNode,
    document: RefCell<MemDocument>,
    loaded: Cell<bool>,
    on_load: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// An in-memory embedded frame.
#[derive(Clone)]
pub struct MemFrame {
    inner: Rc<FrameInner>,
}

impl fmt::Debug for MemFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemFrame")
            .field("loaded", &self.inner.loaded.get())
            .finish()
    }
}

impl MemFrame {
    pub(super) fn new(ctx: &Rc<MemContext>, element: MemNode) -> Self {
        let (document, loaded) = match ctx.options.frame_loading {
            FrameLoading::Deferred => (MemDocument::new_blank(ctx, ReadyState::Loading), false),
            FrameLoading::Immediate => (MemDocument::new_with_body(ctx, ReadyState::Complete), true),
        };
        Self {
            inner: Rc::new(FrameInner {
                ctx: ctx.clone(),
                element,
                document: RefCell::new(document),
                loaded: Cell::new(loaded),
                on_load: RefCell::new(vec![]),
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.get()
    }

    /// Replace the loading document with a complete one and fire the load callbacks.
    ///
    /// Frames that already loaded only fire callbacks registered since.
    pub fn finish_loading(&self) {
        if !self.inner.loaded.replace(true) {
            let document = MemDocument::new_with_body(&self.inner.ctx, ReadyState::Complete);
            *self.inner.document.borrow_mut() = document;
        }
        let tasks = self.inner.on_load.replace(vec![]);
        for task in tasks {
            task();
        }
    }
}

impl BackendFrame<MemBackend> for MemFrame {
    fn element(&self) -> MemNode {
        self.inner.element.clone()
    }

    /// `None` while the frame element is not in the page, as a browser does.
    fn content_document(&self) -> Option<MemDocument> {
        if !self.inner.element.is_connected() {
            return None;
        }
        Some(self.inner.document.borrow().clone())
    }

    fn on_load(&self, task: Box<dyn FnOnce()>) {
        self.inner.on_load.borrow_mut().push(task);
    }

    fn has_mutation_observer(&self) -> bool {
        self.inner.ctx.options.mutation_observer
    }
}
