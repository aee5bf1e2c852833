use std::cell::RefCell;

use js_sys::Reflect;
use shadow_frame::backend::BackendFrame;
use wasm_bindgen::{prelude::*, JsCast};

use crate::{DomBackend, DomDocument, DomNode};

/// An `iframe` element with its content document.
#[derive(Debug, Clone)]
pub struct DomFrame {
    element: web_sys::HtmlIFrameElement,
}

impl DomFrame {
    /// Wrap an `iframe` element
    pub fn new(element: web_sys::HtmlIFrameElement) -> Self {
        Self { element }
    }

    /// The underlying `iframe` element
    pub fn dom(&self) -> &web_sys::HtmlIFrameElement {
        &self.element
    }
}

impl BackendFrame<DomBackend> for DomFrame {
    fn element(&self) -> DomNode {
        DomNode::new(self.element.clone().into())
    }

    fn content_document(&self) -> Option<DomDocument> {
        self.element.content_document().map(DomDocument::new)
    }

    fn on_load(&self, task: Box<dyn FnOnce()>) {
        let task = RefCell::new(Some(task));
        let cb: Closure<dyn Fn(web_sys::Event)> = Closure::new(move |_: web_sys::Event| {
            let task = task.borrow_mut().take();
            if let Some(task) = task {
                task();
            }
        });
        if let Err(err) = self
            .element
            .add_event_listener_with_callback("load", cb.as_ref().unchecked_ref())
        {
            crate::log_js_error(&err);
            log::error!("Cannot listen to the frame load event");
            return;
        }
        cb.forget();
    }

    fn has_mutation_observer(&self) -> bool {
        match self.element.content_window() {
            Some(window) => {
                Reflect::has(&window, &JsValue::from_str("MutationObserver")).unwrap_or(false)
            }
            None => false,
        }
    }
}
