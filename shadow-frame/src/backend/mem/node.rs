use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use super::{document::DocumentInner, html, MemBackend, MemDocument, MemEvent};
use crate::{
    backend::{
        BackendNode, Listener, COMMENT_NODE, DOCUMENT_FRAGMENT_NODE, ELEMENT_NODE, TEXT_NODE,
    },
    error::Error,
    sync::notifier::SUBTREE_MODIFIED,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum NodeKind {
    /// An element with its lower-case tag name.
    Element(String),
    Text,
    Comment,
    Fragment,
}

struct Observer {
    callback: Rc<dyn Fn()>,
    queued: Rc<Cell<bool>>,
}

pub(super) struct NodeInner {
    kind: NodeKind,
    document: RefCell<Weak<DocumentInner>>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<MemNode>>,
    attributes: RefCell<Vec<(String, String)>>,
    style: RefCell<Vec<(String, String)>>,
    style_writes: RefCell<Vec<(String, String)>>,
    data: RefCell<String>,
    offset_size: Cell<(i32, i32)>,
    listeners: RefCell<Vec<(String, Listener<MemEvent>)>>,
    observers: RefCell<Vec<Observer>>,
}

/// An in-memory node. Equality is node identity.
#[derive(Clone)]
pub struct MemNode {
    inner: Rc<NodeInner>,
}

impl PartialEq for MemNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for MemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            NodeKind::Element(tag) => write!(f, "<{}>", tag),
            NodeKind::Text => write!(f, "#text {:?}", self.inner.data.borrow()),
            NodeKind::Comment => write!(f, "#comment {:?}", self.inner.data.borrow()),
            NodeKind::Fragment => write!(f, "#document-fragment"),
        }
    }
}

impl MemNode {
    pub(super) fn new(kind: NodeKind, document: Weak<DocumentInner>) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                kind,
                document: RefCell::new(document),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(vec![]),
                attributes: RefCell::new(vec![]),
                style: RefCell::new(vec![]),
                style_writes: RefCell::new(vec![]),
                data: RefCell::new(String::new()),
                offset_size: Cell::new((0, 0)),
                listeners: RefCell::new(vec![]),
                observers: RefCell::new(vec![]),
            }),
        }
    }

    pub(super) fn new_text(data: &str, document: Weak<DocumentInner>) -> Self {
        let ret = Self::new(NodeKind::Text, document);
        *ret.inner.data.borrow_mut() = data.to_string();
        ret
    }

    pub(super) fn new_comment(data: &str, document: Weak<DocumentInner>) -> Self {
        let ret = Self::new(NodeKind::Comment, document);
        *ret.inner.data.borrow_mut() = data.to_string();
        ret
    }

    pub(super) fn kind(&self) -> &NodeKind {
        &self.inner.kind
    }

    pub(super) fn data(&self) -> String {
        self.inner.data.borrow().clone()
    }

    pub(super) fn attributes(&self) -> Vec<(String, String)> {
        let mut ret = self.inner.attributes.borrow().clone();
        let style = self.style_text();
        if !style.is_empty() {
            ret.push(("style".to_string(), style));
        }
        ret
    }

    /// The tag name if the node is an element.
    pub(super) fn local_name(&self) -> Option<&str> {
        match &self.inner.kind {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// Set the box size reported by `offset_size`.
    ///
    /// Layout is not computed in memory, so sizes are set explicitly.
    /// Like a layout change, this is not a mutation.
    pub fn set_offset_size(&self, width: i32, height: i32) {
        self.inner.offset_size.set((width, height));
    }

    /// All inline style property writes so far, in order.
    pub fn inline_style_writes(&self) -> Vec<(String, String)> {
        self.inner.style_writes.borrow().clone()
    }

    /// An inline style property.
    pub fn style_property(&self, name: &str) -> Option<String> {
        self.inner
            .style
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// The whole inline style.
    pub fn style_text(&self) -> String {
        self.inner
            .style
            .borrow()
            .iter()
            .map(|(n, v)| format!("{}:{}", n, v))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// The number of listeners registered directly on this node.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|(t, _)| t == event_type)
            .count()
    }

    pub(super) fn listeners_of(&self, event_type: &str) -> Vec<Listener<MemEvent>> {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|(t, _)| t == event_type)
            .map(|(_, l)| l.clone())
            .collect()
    }

    /// Whether the node is in the tree of its owner document.
    pub fn is_connected(&self) -> bool {
        let mut top = self.clone();
        while let Some(parent) = top.parent_node() {
            top = parent;
        }
        match self.document_inner().and_then(|x| x.root()) {
            Some(root) => root == top,
            None => false,
        }
    }

    fn document_inner(&self) -> Option<Rc<DocumentInner>> {
        self.inner.document.borrow().upgrade()
    }

    fn adopt(&self, document: &Weak<DocumentInner>) {
        *self.inner.document.borrow_mut() = document.clone();
        for child in self.inner.children.borrow().iter() {
            child.adopt(document);
        }
    }

    fn index_of(&self, child: &MemNode) -> Option<usize> {
        self.inner.children.borrow().iter().position(|x| x == child)
    }

    fn detach(&self) {
        let parent = self.inner.parent.borrow().upgrade();
        if let Some(parent) = parent {
            let parent = MemNode { inner: parent };
            parent.inner.children.borrow_mut().retain(|x| x != self);
            *self.inner.parent.borrow_mut() = Weak::new();
            parent.mutated();
        }
    }

    fn insert_at(&self, child: &MemNode, reference: Option<&MemNode>) -> Result<(), Error> {
        if self.local_name().is_none() && self.inner.kind != NodeKind::Fragment {
            return Err(Error::backend("Only elements and fragments can have children"));
        }
        if child.contains(self) {
            return Err(Error::backend("Cannot insert a node into itself or its descendants"));
        }
        if let Some(reference) = reference {
            if reference.parent_node().as_ref() != Some(self) {
                return Err(Error::backend("The reference node is not a child of this node"));
            }
            if reference == child {
                return Ok(());
            }
        }
        let moved = if child.inner.kind == NodeKind::Fragment {
            child.inner.children.replace(vec![])
        } else {
            child.detach();
            vec![child.clone()]
        };
        let document = self.inner.document.borrow().clone();
        for node in moved.iter() {
            *node.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
            node.adopt(&document);
        }
        {
            let mut children = self.inner.children.borrow_mut();
            let index = match reference {
                Some(r) => children.iter().position(|x| x == r).unwrap_or(children.len()),
                None => children.len(),
            };
            children.splice(index..index, moved);
        }
        if child.inner.kind == NodeKind::Fragment {
            child.mutated();
        }
        self.mutated();
        Ok(())
    }

    /// Replace all children, without any checks.
    pub(super) fn replace_children(&self, nodes: Vec<MemNode>) {
        let old = self.inner.children.replace(vec![]);
        for node in old {
            *node.inner.parent.borrow_mut() = Weak::new();
        }
        let document = self.inner.document.borrow().clone();
        for node in nodes.iter() {
            node.detach();
            *node.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
            node.adopt(&document);
        }
        *self.inner.children.borrow_mut() = nodes;
        self.mutated();
    }

    /// Store an attribute produced by the HTML parser.
    ///
    /// The parser accepts names that `set_attribute` rejects, and the node is not in any
    /// tree yet, so nothing is checked or reported.
    pub(super) fn set_parsed_attribute(&self, name: &str, value: &str) {
        if name == "style" {
            *self.inner.style.borrow_mut() = parse_style(value);
            return;
        }
        let mut attributes = self.inner.attributes.borrow_mut();
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Report a mutation of this node to observers and legacy listeners.
    pub(super) fn mutated(&self) {
        if let Some(document) = self.document_inner() {
            let mut cur = Some(self.clone());
            while let Some(node) = cur {
                for observer in node.inner.observers.borrow().iter() {
                    if observer.queued.replace(true) {
                        continue;
                    }
                    let callback = observer.callback.clone();
                    let queued = observer.queued.clone();
                    document.ctx().queue_microtask(Box::new(move || {
                        queued.set(false);
                        callback();
                    }));
                }
                cur = node.parent_node();
            }
        }
        let event = MemEvent::new(SUBTREE_MODIFIED, true, false);
        event.dispatch_on(self);
    }
}

fn parse_style(css_text: &str) -> Vec<(String, String)> {
    css_text
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

impl BackendNode<MemBackend> for MemNode {
    fn node_name(&self) -> String {
        match &self.inner.kind {
            NodeKind::Element(tag) => tag.to_ascii_uppercase(),
            NodeKind::Text => "#text".to_string(),
            NodeKind::Comment => "#comment".to_string(),
            NodeKind::Fragment => "#document-fragment".to_string(),
        }
    }

    fn node_type(&self) -> u16 {
        match &self.inner.kind {
            NodeKind::Element(_) => ELEMENT_NODE,
            NodeKind::Text => TEXT_NODE,
            NodeKind::Comment => COMMENT_NODE,
            NodeKind::Fragment => DOCUMENT_FRAGMENT_NODE,
        }
    }

    fn tag_name(&self) -> Option<String> {
        self.local_name().map(|x| x.to_ascii_uppercase())
    }

    fn owner_document(&self) -> Option<MemDocument> {
        self.document_inner().map(MemDocument::from_inner)
    }

    fn parent_node(&self) -> Option<MemNode> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| MemNode { inner })
    }

    fn child_nodes(&self) -> Vec<MemNode> {
        self.inner.children.borrow().clone()
    }

    fn first_child(&self) -> Option<MemNode> {
        self.inner.children.borrow().first().cloned()
    }

    fn last_child(&self) -> Option<MemNode> {
        self.inner.children.borrow().last().cloned()
    }

    fn append_child(&self, child: &MemNode) -> Result<(), Error> {
        self.insert_at(child, None)
    }

    fn insert_before(&self, child: &MemNode, reference: Option<&MemNode>) -> Result<(), Error> {
        self.insert_at(child, reference)
    }

    fn remove_child(&self, child: &MemNode) -> Result<(), Error> {
        if self.index_of(child).is_none() {
            return Err(Error::backend("The node to remove is not a child of this node"));
        }
        child.detach();
        Ok(())
    }

    fn replace_child(&self, new_child: &MemNode, old_child: &MemNode) -> Result<(), Error> {
        if self.index_of(old_child).is_none() {
            return Err(Error::backend("The node to replace is not a child of this node"));
        }
        if new_child == old_child {
            return Ok(());
        }
        let next = {
            let children = self.inner.children.borrow();
            self.index_of(old_child)
                .and_then(|i| children.get(i + 1).cloned())
        };
        let next = next.filter(|x| x != new_child);
        old_child.detach();
        self.insert_at(new_child, next.as_ref())
    }

    fn contains(&self, other: &MemNode) -> bool {
        let mut cur = Some(other.clone());
        while let Some(node) = cur {
            if node == *self {
                return true;
            }
            cur = node.parent_node();
        }
        false
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        if name == "style" {
            let style = self.style_text();
            return if style.is_empty() { None } else { Some(style) };
        }
        self.inner
            .attributes
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error> {
        if self.local_name().is_none() {
            return Err(Error::backend("Only elements have attributes"));
        }
        if name.is_empty() || name.contains(|c: char| c.is_whitespace() || "\"'>/=".contains(c)) {
            return Err(Error::backend(format!("Invalid attribute name {:?}", name)));
        }
        if name == "style" {
            return self.set_style_text(value);
        }
        {
            let mut attributes = self.inner.attributes.borrow_mut();
            match attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
        self.mutated();
        Ok(())
    }

    fn remove_attribute(&self, name: &str) -> Result<(), Error> {
        if name == "style" {
            self.inner.style.borrow_mut().clear();
        } else {
            self.inner.attributes.borrow_mut().retain(|(n, _)| n != name);
        }
        self.mutated();
        Ok(())
    }

    fn inner_html(&self) -> String {
        html::serialize_children(self)
    }

    fn set_inner_html(&self, html: &str) -> Result<(), Error> {
        let document = self.inner.document.borrow().clone();
        let nodes = html::parse_fragment(html, &document)?;
        self.replace_children(nodes);
        Ok(())
    }

    fn text_content(&self) -> String {
        match &self.inner.kind {
            NodeKind::Text | NodeKind::Comment => self.data(),
            _ => {
                let mut ret = String::new();
                for child in self.inner.children.borrow().iter() {
                    if child.inner.kind != NodeKind::Comment {
                        ret.push_str(&child.text_content());
                    }
                }
                ret
            }
        }
    }

    fn set_text_content(&self, text: &str) {
        match &self.inner.kind {
            NodeKind::Text | NodeKind::Comment => {
                *self.inner.data.borrow_mut() = text.to_string();
                self.mutated();
            }
            _ => {
                let nodes = if text.is_empty() {
                    vec![]
                } else {
                    let document = self.inner.document.borrow().clone();
                    vec![MemNode::new_text(text, document)]
                };
                self.replace_children(nodes);
            }
        }
    }

    fn elements_by_tag_name(&self, tag_name: &str) -> Vec<MemNode> {
        fn collect(node: &MemNode, tag_name: &str, ret: &mut Vec<MemNode>) {
            for child in node.inner.children.borrow().iter() {
                if let Some(tag) = child.local_name() {
                    if tag_name == "*" || tag.eq_ignore_ascii_case(tag_name) {
                        ret.push(child.clone());
                    }
                }
                collect(child, tag_name, ret);
            }
        }
        let mut ret = vec![];
        collect(self, tag_name, &mut ret);
        ret
    }

    fn element_by_id(&self, id: &str) -> Option<MemNode> {
        self.elements_by_tag_name("*")
            .into_iter()
            .find(|x| x.get_attribute("id").as_deref() == Some(id))
    }

    fn offset_size(&self) -> (i32, i32) {
        self.inner.offset_size.get()
    }

    fn set_style_text(&self, css_text: &str) -> Result<(), Error> {
        *self.inner.style.borrow_mut() = parse_style(css_text);
        self.mutated();
        Ok(())
    }

    fn set_style_property(&self, name: &str, value: &str) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::backend("Empty style property name"));
        }
        {
            let mut style = self.inner.style.borrow_mut();
            match style.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => style.push((name.to_string(), value.to_string())),
            }
        }
        self.inner
            .style_writes
            .borrow_mut()
            .push((name.to_string(), value.to_string()));
        self.mutated();
        Ok(())
    }

    fn add_event_listener(&self, event_type: &str, listener: &Listener<MemEvent>) {
        let mut listeners = self.inner.listeners.borrow_mut();
        if listeners.iter().any(|(t, l)| t == event_type && l == listener) {
            return;
        }
        listeners.push((event_type.to_string(), listener.clone()));
    }

    fn remove_event_listener(&self, event_type: &str, listener: &Listener<MemEvent>) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(t, l)| !(t == event_type && l == listener));
    }

    fn dispatch_event(&self, event: &MemEvent) -> Result<bool, Error> {
        Ok(event.dispatch_on(self))
    }

    fn observe_mutations(&self, callback: Rc<dyn Fn()>) -> Result<(), Error> {
        if let Some(msg) = self.document_inner().and_then(|x| x.ctx().observe_error()) {
            return Err(Error::backend(msg));
        }
        self.inner.observers.borrow_mut().push(Observer {
            callback,
            queued: Rc::new(Cell::new(false)),
        });
        Ok(())
    }
}
