use shadow_frame::{
    backend::{BackendDocument, ReadyState},
    error::Error,
};
use wasm_bindgen::JsCast;

use crate::{backend_error, js_error, DomBackend, DomEvent, DomFrame, DomNode};

/// A DOM document. Equality is document identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DomDocument {
    document: web_sys::Document,
}

impl DomDocument {
    /// Wrap a DOM document
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The underlying DOM document
    pub fn dom(&self) -> &web_sys::Document {
        &self.document
    }
}

impl BackendDocument<DomBackend> for DomDocument {
    fn ready_state(&self) -> ReadyState {
        ReadyState::from_str_lossy(&self.document.ready_state())
    }

    fn document_element(&self) -> Option<DomNode> {
        self.document
            .document_element()
            .map(|x| DomNode::new(x.into()))
    }

    fn head(&self) -> Option<DomNode> {
        self.document.head().map(|x| DomNode::new(x.into()))
    }

    fn body(&self) -> Option<DomNode> {
        self.document.body().map(|x| DomNode::new(x.into()))
    }

    fn active_element(&self) -> Option<DomNode> {
        self.document
            .active_element()
            .map(|x| DomNode::new(x.into()))
    }

    fn create_element(&self, tag_name: &str) -> Result<DomNode, Error> {
        let elem = self
            .document
            .create_element(tag_name)
            .map_err(js_error("Cannot create element"))?;
        Ok(DomNode::new(elem.into()))
    }

    fn create_fragment(&self) -> Result<DomNode, Error> {
        Ok(DomNode::new(self.document.create_document_fragment().into()))
    }

    fn create_frame(&self) -> Result<DomFrame, Error> {
        let elem = self
            .document
            .create_element("iframe")
            .map_err(|err| Error::SurfaceUnavailable(crate::js_message(&err)))?;
        let frame = elem
            .dyn_into::<web_sys::HtmlIFrameElement>()
            .map_err(|_| backend_error("The created frame is not an iframe element"))?;
        Ok(DomFrame::new(frame))
    }

    fn create_event(&self, event_type: &str, bubbles: bool, cancelable: bool) -> Result<DomEvent, Error> {
        let event = self
            .document
            .create_event("Event")
            .map_err(js_error("Cannot create event"))?;
        event.init_event_with_bubbles_and_cancelable(event_type, bubbles, cancelable);
        Ok(DomEvent::new(event))
    }
}
