//! The shadow container.
//!
//! A `ShadowRoot` identifies as a document fragment but stores its content in the body
//! of an embedded document. Every member resolves through the delegation table, and
//! body members always go through the current body, so calls made before the
//! embedded document is ready land on the placeholder and later calls on the real body.

use std::rc::Rc;

use crate::{
    backend::{Backend, BackendDocument, BackendNode, Listener, ELEMENT_NODE},
    delegate::{Member, Resolution},
    error::Error,
    request::ShadowMode,
    sync::{
        self,
        bridge::{EventBridge, ListenerTarget},
        notifier::NotifierKind,
        resize::BoxSize,
        Surface, SyncState,
    },
    uid::UniqueId,
};

/// The real target a delegated member resolves to.
pub enum Target<B: Backend> {
    /// The synthetic fragment.
    Fragment(B::Node),
    /// The embedded document.
    Document(B::Document),
    /// The current body.
    Body(B::Node),
    /// The container itself.
    Container(ShadowMode),
}

impl<B: Backend> std::fmt::Debug for Target<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fragment(x) => f.debug_tuple("Fragment").field(x).finish(),
            Self::Document(x) => f.debug_tuple("Document").field(x).finish(),
            Self::Body(x) => f.debug_tuple("Body").field(x).finish(),
            Self::Container(x) => f.debug_tuple("Container").field(x).finish(),
        }
    }
}

struct Inner<B: Backend> {
    id: UniqueId,
    mode: ShadowMode,
    surface: Rc<Surface<B>>,
    fragment: B::Node,
    bridge: Rc<EventBridge<B>>,
}

/// A shadow container.
///
/// Clones refer to the same container.
pub struct ShadowRoot<B: Backend> {
    inner: Rc<Inner<B>>,
}

impl<B: Backend> Clone for ShadowRoot<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B: Backend> PartialEq for ShadowRoot<B> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<B: Backend> std::fmt::Debug for ShadowRoot<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowRoot")
            .field("id", &self.inner.id)
            .field("mode", &self.inner.mode)
            .field("state", &self.state())
            .finish()
    }
}

impl<B: Backend> ShadowRoot<B> {
    pub(crate) fn create(backend: &Rc<B>, frame: B::Frame, mode: ShadowMode) -> Result<Self, Error> {
        let surface = Surface::<B>::open(frame)?;
        let fragment = surface.document().create_fragment()?;
        let bridge = Rc::new(EventBridge::new(surface.clone()));
        let id = UniqueId::generate();
        sync::schedule(backend, &surface, &bridge, &id)?;
        Ok(Self {
            inner: Rc::new(Inner {
                id,
                mode,
                surface,
                fragment,
                bridge,
            }),
        })
    }

    /// Whether two handles refer to the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The mode fixed at creation.
    pub fn mode(&self) -> ShadowMode {
        self.inner.mode
    }

    /// The identifier of the container.
    pub fn id(&self) -> &UniqueId {
        &self.inner.id
    }

    pub fn state(&self) -> SyncState {
        self.inner.surface.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SyncState::Ready
    }

    /// The embedded frame.
    pub fn frame(&self) -> &B::Frame {
        &self.inner.surface.frame
    }

    /// The embedded document, re-read when the frame finished loading.
    pub fn document(&self) -> B::Document {
        self.inner.surface.document()
    }

    /// The current body: the placeholder before readiness, the real body afterwards.
    pub fn body(&self) -> B::Node {
        self.inner.surface.body.get()
    }

    /// The last body size written onto the frame.
    pub fn size(&self) -> BoxSize {
        self.inner.surface.resize.last()
    }

    /// How body changes are detected, known once ready.
    pub fn notifier_kind(&self) -> Option<NotifierKind> {
        self.inner.surface.notifier()
    }

    /// The listener registry for nodes inside the container.
    pub fn events(&self) -> &EventBridge<B> {
        &self.inner.bridge
    }

    /// Resolve a member to its current real target.
    pub fn resolve(&self, member: Member) -> Target<B> {
        match member.resolution() {
            Resolution::Fragment => Target::Fragment(self.inner.fragment.clone()),
            Resolution::Document => Target::Document(self.document()),
            Resolution::Body | Resolution::BodyMethod => Target::Body(self.body()),
            Resolution::Container => Target::Container(self.inner.mode),
        }
    }

    pub fn node_name(&self) -> String {
        self.inner.fragment.node_name()
    }

    pub fn node_type(&self) -> u16 {
        self.inner.fragment.node_type()
    }

    pub fn tag_name(&self) -> Option<String> {
        self.inner.fragment.tag_name()
    }

    /// The focused element of the embedded document.
    pub fn active_element(&self) -> Option<B::Node> {
        self.document().active_element()
    }

    pub fn inner_html(&self) -> String {
        self.body().inner_html()
    }

    pub fn set_inner_html(&self, html: &str) -> Result<(), Error> {
        self.body().set_inner_html(html)
    }

    pub fn text_content(&self) -> String {
        self.body().text_content()
    }

    pub fn set_text_content(&self, text: &str) {
        self.body().set_text_content(text)
    }

    pub fn child_nodes(&self) -> Vec<B::Node> {
        self.body().child_nodes()
    }

    pub fn first_child(&self) -> Option<B::Node> {
        self.body().first_child()
    }

    pub fn last_child(&self) -> Option<B::Node> {
        self.body().last_child()
    }

    pub fn child_element_count(&self) -> usize {
        self.body()
            .child_nodes()
            .iter()
            .filter(|x| x.node_type() == ELEMENT_NODE)
            .count()
    }

    pub fn append_child(&self, child: &B::Node) -> Result<(), Error> {
        self.body().append_child(child)
    }

    pub fn insert_before(&self, child: &B::Node, reference: Option<&B::Node>) -> Result<(), Error> {
        self.body().insert_before(child, reference)
    }

    pub fn remove_child(&self, child: &B::Node) -> Result<(), Error> {
        self.body().remove_child(child)
    }

    pub fn replace_child(&self, new_child: &B::Node, old_child: &B::Node) -> Result<(), Error> {
        self.body().replace_child(new_child, old_child)
    }

    pub fn contains(&self, other: &B::Node) -> bool {
        self.body().contains(other)
    }

    pub fn has_child_nodes(&self) -> bool {
        self.body().first_child().is_some()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<B::Node> {
        self.body().element_by_id(id)
    }

    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<B::Node> {
        self.body().elements_by_tag_name(tag_name)
    }

    /// Listen on the container body.
    ///
    /// Before readiness the registration is recorded and applied to the real body later.
    pub fn add_event_listener(&self, event_type: &str, listener: &Listener<B::Event>) {
        self.inner.bridge.add(ListenerTarget::Body, event_type, listener)
    }

    pub fn remove_event_listener(&self, event_type: &str, listener: &Listener<B::Event>) {
        self.inner.bridge.remove(ListenerTarget::Body, event_type, listener)
    }

    /// Dispatch an event on the container body.
    ///
    /// Returns `None` if the dispatch is deferred until readiness.
    pub fn dispatch_event(&self, event: &B::Event) -> Result<Option<bool>, Error> {
        self.inner.bridge.dispatch(ListenerTarget::Body, event)
    }
}
