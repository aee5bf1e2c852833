//! The host patch: the capability to attach shadow containers to elements.

use std::{cell::RefCell, rc::Rc};

use crate::{
    backend::{head_of, Backend, BackendDocument, BackendFrame, BackendNode},
    error::Error,
    request::{ShadowMode, ShadowRequest},
    shadow_root::ShadowRoot,
};

/// The marker attribute set on every host element.
pub const OWNER_ATTRIBUTE: &str = "data-attachshadow";

/// The inline style of the frame, also re-stated on the embedded `html` and `body`.
pub const CSS_RESET: &str = "display:inline-block;box-sizing:border-box;margin:0;padding:0;background:transparent;visibility:visible;width:100%;height:auto";

/// The page-wide rule removing the padding of host elements.
pub const SHADOW_RESET: &str = "*[data-attachshadow]{padding:0 !important}";

/// The presentational attributes of the frame.
pub const FRAME_ATTRIBUTES: &[(&str, &str)] = &[
    ("scrolling", "no"),
    ("allowtransparency", "yes"),
    ("allowfullscreen", "yes"),
    ("frameborder", "0"),
];

/// The corrective style text appended to the head of every embedded document.
pub fn surface_style() -> String {
    format!("html,body{{{}}}*{{margin:0}}{}", CSS_RESET, SHADOW_RESET)
}

/// The patched documents and open shadow containers of a backend.
pub struct Registry<B: Backend> {
    patched: RefCell<Vec<B::Document>>,
    open_roots: RefCell<Vec<(B::Node, ShadowRoot<B>)>>,
}

impl<B: Backend> Default for Registry<B> {
    fn default() -> Self {
        Self {
            patched: RefCell::new(vec![]),
            open_roots: RefCell::new(vec![]),
        }
    }
}

impl<B: Backend> Registry<B> {
    /// Whether the patch has been installed on `document`.
    pub fn is_patched(&self, document: &B::Document) -> bool {
        self.patched.borrow().iter().any(|x| x == document)
    }

    /// The open shadow container of `host`, if any.
    pub fn open_root(&self, host: &B::Node) -> Option<ShadowRoot<B>> {
        self.open_roots
            .borrow()
            .iter()
            .find(|(h, _)| h == host)
            .map(|(_, root)| root.clone())
    }
}

/// The installed capability of a hosting document.
pub struct HostPatch<B: Backend> {
    backend: Rc<B>,
    document: B::Document,
}

impl<B: Backend> Clone for HostPatch<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            document: self.document.clone(),
        }
    }
}

impl<B: Backend> std::fmt::Debug for HostPatch<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostPatch")
            .field("document", &self.document)
            .finish()
    }
}

impl<B: Backend> HostPatch<B> {
    /// Install the capability on `document`.
    ///
    /// The padding rule is inserted once per document; installing again only returns
    /// another handle.
    pub fn install(backend: &Rc<B>, document: &B::Document) -> Result<Self, Error> {
        let registry = backend.registry();
        if !registry.is_patched(document) {
            let head = head_of::<B>(document).ok_or_else(|| {
                Error::SurfaceUnavailable("the hosting document has no head".to_string())
            })?;
            let style = document.create_element("style")?;
            style.set_text_content(SHADOW_RESET);
            head.insert_before(&style, head.first_child().as_ref())?;
            registry.patched.borrow_mut().push(document.clone());
            log::debug!("Shadow root capability installed");
        }
        Ok(Self {
            backend: backend.clone(),
            document: document.clone(),
        })
    }

    /// The backend of this patch.
    pub fn backend(&self) -> &Rc<B> {
        &self.backend
    }

    /// The hosting document.
    pub fn document(&self) -> &B::Document {
        &self.document
    }

    /// Attach a shadow container to `host`.
    ///
    /// The container is returned immediately, before its embedded surface is ready.
    pub fn attach_shadow(&self, host: &B::Node, request: &ShadowRequest) -> Result<ShadowRoot<B>, Error> {
        let registry = self.backend.registry();
        if registry.open_root(host).is_some() {
            return Err(Error::ShadowRootExists);
        }
        let document = host.owner_document().ok_or_else(|| {
            Error::SurfaceUnavailable("the host element has no owner document".to_string())
        })?;
        let marked = host.get_attribute(OWNER_ATTRIBUTE).is_some();
        host.set_attribute(OWNER_ATTRIBUTE, "")?;
        let root = match self.mount(host, &document, request.mode) {
            Ok(x) => x,
            Err(err) => {
                if !marked {
                    if let Err(err) = host.remove_attribute(OWNER_ATTRIBUTE) {
                        log::warn!("Cannot unmark the host element: {}", err);
                    }
                }
                return Err(err);
            }
        };
        if request.mode == ShadowMode::Open {
            registry
                .open_roots
                .borrow_mut()
                .push((host.clone(), root.clone()));
        }
        log::debug!("Attached shadow root {} ({})", root.id(), request.mode);
        Ok(root)
    }

    /// Insert a frame into `host` and open a container over it.
    ///
    /// On failure the frame is taken out of `host` again.
    fn mount(&self, host: &B::Node, document: &B::Document, mode: ShadowMode) -> Result<ShadowRoot<B>, Error> {
        let frame = document.create_frame()?;
        let element = frame.element();
        for (name, value) in FRAME_ATTRIBUTES {
            element.set_attribute(name, value)?;
        }
        element.set_style_text(CSS_RESET)?;
        host.append_child(&element)?;
        ShadowRoot::create(&self.backend, frame, mode).map_err(|err| {
            if let Err(err) = host.remove_child(&element) {
                log::warn!("Cannot remove the unusable frame: {}", err);
            }
            err
        })
    }

    /// The open shadow container of `host`.
    ///
    /// Always `None` for closed containers.
    pub fn shadow_root(&self, host: &B::Node) -> Option<ShadowRoot<B>> {
        self.backend.registry().open_root(host)
    }
}
