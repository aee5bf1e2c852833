//! shadow-frame: shadow root emulation backed by embedded frames
//!
//! This is the *DOM binding* of the framework.
//!
//! ### Quick Start
//!
//! Install the capability once, then request shadow containers from elements.
//!
//! ```rust,no_run
//! use wasm_bindgen::prelude::*;
//! use shadow_frame::prelude::*;
//! use shadow_frame_dom::{install, Capability};
//!
//! #[wasm_bindgen(start)]
//! pub fn wasm_main() {
//!     let patch = match install().unwrap() {
//!         // the browser supports shadow roots itself
//!         Capability::Native => return,
//!         Capability::Emulated(patch) => patch,
//!     };
//!     let document = patch.document().clone();
//!     let host = document.create_element("div").unwrap();
//!     document.body().unwrap().append_child(&host).unwrap();
//!     let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
//!     root.set_inner_html("<style>:host { color: red }</style>Hello world!").unwrap();
//! }
//! ```

#![warn(missing_docs)]

use std::{cell::RefCell, rc::Rc};

use js_sys::Reflect;
use shadow_frame::{backend::Backend, error::Error, host::Registry, HostPatch};
use wasm_bindgen::{prelude::*, JsCast, JsValue};

mod document;
mod event;
mod frame;
mod listener;
mod node;

pub use document::DomDocument;
pub use event::DomEvent;
pub use frame::DomFrame;
pub use node::DomNode;

thread_local! {
    static BACKEND: RefCell<Option<Rc<DomBackend>>> = RefCell::new(None);
}

fn js_message(err: &JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        String::from(err.message())
    } else if let Some(s) = err.as_string() {
        s
    } else {
        "(JavaScript Error)".to_string()
    }
}

fn log_js_error(err: &JsValue) {
    log::error!("{}", js_message(err));
}

/// Convert a JavaScript exception into a backend error.
pub(crate) fn js_error(msg: &'static str) -> impl FnOnce(JsValue) -> Error {
    move |err| Error::BackendError {
        msg: format!("{}: {}", msg, js_message(&err)),
        err: None,
    }
}

pub(crate) fn backend_error(msg: impl Into<String>) -> Error {
    Error::BackendError {
        msg: msg.into(),
        err: None,
    }
}

/// A pending `setTimeout`.
#[derive(Debug)]
pub struct DomTimer {
    id: i32,
}

/// A DOM backend over the page window
pub struct DomBackend {
    window: web_sys::Window,
    document: web_sys::Document,
    registry: Registry<Self>,
}

impl DomBackend {
    /// The backend of the current window
    ///
    /// It is created on first use and shared afterwards, so installation state is page-wide.
    pub fn current() -> Result<Rc<Self>, Error> {
        BACKEND.with(|cell| {
            if let Some(x) = cell.borrow().as_ref() {
                return Ok(x.clone());
            }
            let backend = Self::new()?;
            *cell.borrow_mut() = Some(backend.clone());
            Ok(backend)
        })
    }

    fn new() -> Result<Rc<Self>, Error> {
        let window = web_sys::window()
            .ok_or_else(|| backend_error("Cannot init DOM backend outside web page environment"))?;
        let document = window
            .document()
            .ok_or_else(|| backend_error("Cannot init DOM backend when document is not ready"))?;
        Ok(Rc::new(Self {
            window,
            document,
            registry: Registry::default(),
        }))
    }

    /// The page document
    pub fn document(&self) -> DomDocument {
        DomDocument::new(self.document.clone())
    }

    /// Whether the page already provides `Element.prototype.attachShadow`
    pub fn has_native_shadow_root(&self) -> bool {
        let proto = Reflect::get(&self.window, &JsValue::from_str("Element"))
            .and_then(|x| Reflect::get(&x, &JsValue::from_str("prototype")));
        match proto {
            Ok(proto) if proto.is_object() => {
                Reflect::has(&proto, &JsValue::from_str("attachShadow")).unwrap_or(false)
            }
            _ => false,
        }
    }
}

impl Backend for DomBackend {
    type Node = DomNode;
    type Document = DomDocument;
    type Frame = DomFrame;
    type Event = DomEvent;
    type Timer = DomTimer;

    fn registry(&self) -> &Registry<Self> {
        &self.registry
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<DomTimer, Error> {
        let cb = Closure::once_into_js(move || task());
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.unchecked_ref(),
                delay_ms as i32,
            )
            .map_err(js_error("Cannot set timeout"))?;
        Ok(DomTimer { id })
    }

    fn clear_timeout(&self, timer: DomTimer) {
        self.window.clear_timeout_with_handle(timer.id);
    }
}

/// The result of `install`.
pub enum Capability {
    /// The browser supports shadow roots natively and nothing was installed.
    Native,
    /// The emulation has been installed on the page document.
    Emulated(HostPatch<DomBackend>),
}

/// Install the emulation unless the browser supports shadow roots natively.
pub fn install() -> Result<Capability, Error> {
    let backend = DomBackend::current()?;
    if backend.has_native_shadow_root() {
        log::debug!("Native shadow roots are available");
        return Ok(Capability::Native);
    }
    let patch = HostPatch::install(&backend, &backend.document())?;
    Ok(Capability::Emulated(patch))
}

/// Install the emulation even if the browser supports shadow roots natively.
pub fn install_emulated() -> Result<HostPatch<DomBackend>, Error> {
    let backend = DomBackend::current()?;
    HostPatch::install(&backend, &backend.document())
}
