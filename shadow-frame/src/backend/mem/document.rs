use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use super::{frame::MemFrame, node::NodeKind, MemBackend, MemContext, MemEvent, MemNode};
use crate::{
    backend::{BackendDocument, BackendNode, ReadyState},
    error::Error,
};

pub(crate) struct DocumentInner {
    ctx: Rc<MemContext>,
    ready_state: Cell<ReadyState>,
    root: RefCell<Option<MemNode>>,
    active_element: RefCell<Option<MemNode>>,
}

impl DocumentInner {
    pub(super) fn ctx(&self) -> &Rc<MemContext> {
        &self.ctx
    }

    pub(super) fn root(&self) -> Option<MemNode> {
        self.root.borrow().clone()
    }
}

/// An in-memory document. Equality is document identity.
#[derive(Clone)]
pub struct MemDocument {
    inner: Rc<DocumentInner>,
}

impl PartialEq for MemDocument {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for MemDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemDocument")
            .field("ready_state", &self.inner.ready_state.get())
            .finish()
    }
}

impl MemDocument {
    pub(super) fn from_inner(inner: Rc<DocumentInner>) -> Self {
        Self { inner }
    }

    fn new(ctx: &Rc<MemContext>, ready_state: ReadyState) -> Self {
        let ret = Self {
            inner: Rc::new(DocumentInner {
                ctx: ctx.clone(),
                ready_state: Cell::new(ready_state),
                root: RefCell::new(None),
                active_element: RefCell::new(None),
            }),
        };
        let html = ret.new_node(NodeKind::Element("html".to_string()));
        *ret.inner.root.borrow_mut() = Some(html);
        ret
    }

    /// A document with only a root element, as a frame has while loading.
    pub(super) fn new_blank(ctx: &Rc<MemContext>, ready_state: ReadyState) -> Self {
        Self::new(ctx, ready_state)
    }

    /// A document with `html`, `head` and `body`.
    pub(super) fn new_with_body(ctx: &Rc<MemContext>, ready_state: ReadyState) -> Self {
        let ret = Self::new(ctx, ready_state);
        let head = ret.new_node(NodeKind::Element("head".to_string()));
        let body = ret.new_node(NodeKind::Element("body".to_string()));
        if let Some(root) = ret.inner.root.borrow().as_ref() {
            root.replace_children(vec![head, body]);
        }
        ret
    }

    fn new_node(&self, kind: NodeKind) -> MemNode {
        MemNode::new(kind, Rc::downgrade(&self.inner))
    }

    pub fn set_ready_state(&self, ready_state: ReadyState) {
        self.inner.ready_state.set(ready_state);
    }

    /// Set the focused element.
    pub fn set_active_element(&self, element: Option<&MemNode>) {
        *self.inner.active_element.borrow_mut() = element.cloned();
    }

    pub fn create_text_node(&self, data: &str) -> MemNode {
        MemNode::new_text(data, Rc::downgrade(&self.inner))
    }

    pub fn create_comment(&self, data: &str) -> MemNode {
        MemNode::new_comment(data, Rc::downgrade(&self.inner))
    }

    fn child_element(&self, tag_name: &str) -> Option<MemNode> {
        let root = self.inner.root.borrow().clone()?;
        let ret = root
            .child_nodes()
            .into_iter()
            .find(|x| x.local_name() == Some(tag_name));
        ret
    }
}

fn is_valid_tag_name(tag_name: &str) -> bool {
    let mut chars = tag_name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl BackendDocument<MemBackend> for MemDocument {
    fn ready_state(&self) -> ReadyState {
        self.inner.ready_state.get()
    }

    fn document_element(&self) -> Option<MemNode> {
        self.inner.root.borrow().clone()
    }

    fn head(&self) -> Option<MemNode> {
        self.child_element("head")
    }

    fn body(&self) -> Option<MemNode> {
        self.child_element("body")
    }

    fn active_element(&self) -> Option<MemNode> {
        self.inner
            .active_element
            .borrow()
            .clone()
            .or_else(|| self.body())
    }

    fn create_element(&self, tag_name: &str) -> Result<MemNode, Error> {
        if !is_valid_tag_name(tag_name) {
            return Err(Error::backend(format!("Invalid tag name {:?}", tag_name)));
        }
        Ok(self.new_node(NodeKind::Element(tag_name.to_ascii_lowercase())))
    }

    fn create_fragment(&self) -> Result<MemNode, Error> {
        Ok(self.new_node(NodeKind::Fragment))
    }

    fn create_frame(&self) -> Result<MemFrame, Error> {
        if !self.inner.ctx.options.frames_enabled {
            return Err(Error::SurfaceUnavailable(
                "frames are disabled in this backend".to_string(),
            ));
        }
        let element = self.new_node(NodeKind::Element("iframe".to_string()));
        let frame = MemFrame::new(&self.inner.ctx, element);
        self.inner.ctx.frames.borrow_mut().push(frame.clone());
        Ok(frame)
    }

    fn create_event(&self, event_type: &str, bubbles: bool, cancelable: bool) -> Result<MemEvent, Error> {
        Ok(MemEvent::new(event_type, bubbles, cancelable))
    }
}
