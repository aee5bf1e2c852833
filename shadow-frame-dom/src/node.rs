use std::rc::Rc;

use shadow_frame::{
    backend::{BackendNode, Listener, DOCUMENT_FRAGMENT_NODE, ELEMENT_NODE},
    error::Error,
};
use wasm_bindgen::{prelude::*, JsCast};

use crate::{backend_error, js_error, listener, DomBackend, DomDocument, DomEvent};

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A DOM node. Equality is node identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    node: web_sys::Node,
}

impl From<web_sys::Node> for DomNode {
    fn from(node: web_sys::Node) -> Self {
        Self::new(node)
    }
}

impl DomNode {
    /// Wrap a DOM node
    pub fn new(node: web_sys::Node) -> Self {
        Self { node }
    }

    /// The underlying DOM node
    pub fn dom(&self) -> &web_sys::Node {
        &self.node
    }

    // nodes of an embedded document belong to another realm, so `instanceof` casts fail on them
    fn element(&self) -> Option<&web_sys::Element> {
        if self.node.node_type() == ELEMENT_NODE {
            Some(self.node.unchecked_ref())
        } else {
            None
        }
    }

    fn expect_element(&self) -> Result<&web_sys::Element, Error> {
        self.element()
            .ok_or_else(|| backend_error(format!("{} is not an element", self.node.node_name())))
    }

    fn html_element(&self) -> Option<&web_sys::HtmlElement> {
        let elem = self.element()?;
        if elem.namespace_uri().as_deref() == Some(XHTML_NAMESPACE) {
            Some(self.node.unchecked_ref())
        } else {
            None
        }
    }

    fn collect(list: web_sys::HtmlCollection) -> Vec<Self> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .map(|x| Self::new(x.into()))
            .collect()
    }
}

impl BackendNode<DomBackend> for DomNode {
    fn node_name(&self) -> String {
        self.node.node_name()
    }

    fn node_type(&self) -> u16 {
        self.node.node_type()
    }

    fn tag_name(&self) -> Option<String> {
        self.element().map(|x| x.tag_name())
    }

    fn owner_document(&self) -> Option<DomDocument> {
        self.node.owner_document().map(DomDocument::new)
    }

    fn parent_node(&self) -> Option<DomNode> {
        self.node.parent_node().map(Self::new)
    }

    fn child_nodes(&self) -> Vec<DomNode> {
        let list = self.node.child_nodes();
        (0..list.length())
            .filter_map(|i| list.item(i))
            .map(Self::new)
            .collect()
    }

    fn first_child(&self) -> Option<DomNode> {
        self.node.first_child().map(Self::new)
    }

    fn last_child(&self) -> Option<DomNode> {
        self.node.last_child().map(Self::new)
    }

    fn append_child(&self, child: &DomNode) -> Result<(), Error> {
        self.node
            .append_child(&child.node)
            .map_err(js_error("Cannot append child"))?;
        Ok(())
    }

    fn insert_before(&self, child: &DomNode, reference: Option<&DomNode>) -> Result<(), Error> {
        self.node
            .insert_before(&child.node, reference.map(|x| &x.node))
            .map_err(js_error("Cannot insert child"))?;
        Ok(())
    }

    fn remove_child(&self, child: &DomNode) -> Result<(), Error> {
        self.node
            .remove_child(&child.node)
            .map_err(js_error("Cannot remove child"))?;
        Ok(())
    }

    fn replace_child(&self, new_child: &DomNode, old_child: &DomNode) -> Result<(), Error> {
        self.node
            .replace_child(&new_child.node, &old_child.node)
            .map_err(js_error("Cannot replace child"))?;
        Ok(())
    }

    fn contains(&self, other: &DomNode) -> bool {
        self.node.contains(Some(&other.node))
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.element()?.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error> {
        self.expect_element()?
            .set_attribute(name, value)
            .map_err(js_error("Cannot set attribute"))
    }

    fn remove_attribute(&self, name: &str) -> Result<(), Error> {
        self.expect_element()?
            .remove_attribute(name)
            .map_err(js_error("Cannot remove attribute"))
    }

    fn inner_html(&self) -> String {
        self.element().map(|x| x.inner_html()).unwrap_or_default()
    }

    fn set_inner_html(&self, html: &str) -> Result<(), Error> {
        self.expect_element()?.set_inner_html(html);
        Ok(())
    }

    fn text_content(&self) -> String {
        self.node.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, text: &str) {
        self.node.set_text_content(Some(text))
    }

    fn elements_by_tag_name(&self, tag_name: &str) -> Vec<DomNode> {
        if let Some(elem) = self.element() {
            return Self::collect(elem.get_elements_by_tag_name(tag_name));
        }
        if self.node.node_type() == DOCUMENT_FRAGMENT_NODE {
            let frag: &web_sys::DocumentFragment = self.node.unchecked_ref();
            return match frag.query_selector_all(tag_name) {
                Ok(list) => (0..list.length())
                    .filter_map(|i| list.item(i))
                    .map(Self::new)
                    .collect(),
                Err(err) => {
                    crate::log_js_error(&err);
                    vec![]
                }
            };
        }
        vec![]
    }

    fn element_by_id(&self, id: &str) -> Option<DomNode> {
        self.elements_by_tag_name("*")
            .into_iter()
            .find(|x| x.element().map(|x| x.id() == id).unwrap_or(false))
    }

    fn offset_size(&self) -> (i32, i32) {
        self.html_element()
            .map(|x| (x.offset_width(), x.offset_height()))
            .unwrap_or((0, 0))
    }

    fn set_style_text(&self, css_text: &str) -> Result<(), Error> {
        let elem = self
            .html_element()
            .ok_or_else(|| backend_error("Cannot set style on a non-HTML node"))?;
        elem.style().set_css_text(css_text);
        Ok(())
    }

    fn set_style_property(&self, name: &str, value: &str) -> Result<(), Error> {
        let elem = self
            .html_element()
            .ok_or_else(|| backend_error("Cannot set style on a non-HTML node"))?;
        elem.style()
            .set_property(name, value)
            .map_err(js_error("Cannot set style property"))
    }

    fn add_event_listener(&self, event_type: &str, listener: &Listener<DomEvent>) {
        listener::add(&self.node, event_type, listener)
    }

    fn remove_event_listener(&self, event_type: &str, listener: &Listener<DomEvent>) {
        listener::remove(&self.node, event_type, listener)
    }

    fn dispatch_event(&self, event: &DomEvent) -> Result<bool, Error> {
        self.node
            .dispatch_event(event.dom())
            .map_err(js_error("Cannot dispatch event"))
    }

    fn observe_mutations(&self, callback: Rc<dyn Fn()>) -> Result<(), Error> {
        let cb: Closure<dyn Fn(js_sys::Array, web_sys::MutationObserver)> =
            Closure::new(move |_: js_sys::Array, _: web_sys::MutationObserver| callback());
        let observer = web_sys::MutationObserver::new(cb.as_ref().unchecked_ref())
            .map_err(js_error("Cannot create mutation observer"))?;
        let mut init = web_sys::MutationObserverInit::new();
        init.child_list(true).attributes(true).subtree(true);
        observer
            .observe_with_options(&self.node, &init)
            .map_err(js_error("Cannot observe mutations"))?;
        // the observer lives as long as the observed node
        cb.forget();
        Ok(())
    }
}
