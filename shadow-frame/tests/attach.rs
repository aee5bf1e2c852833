use std::rc::Rc;

use shadow_frame::{
    backend::{
        mem::{FrameLoading, MemBackend, MemNode, MemOptions},
        DOCUMENT_FRAGMENT_NODE,
    },
    delegate::Member,
    host::{CSS_RESET, FRAME_ATTRIBUTES, OWNER_ATTRIBUTE, SHADOW_RESET},
    prelude::*,
    shadow_root::Target,
    Error, SyncState,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup(options: MemOptions) -> (Rc<MemBackend>, HostPatch<MemBackend>, MemNode) {
    init_logger();
    let backend = MemBackend::with_options(options);
    let document = backend.document();
    let patch = HostPatch::install(&backend, &document).unwrap();
    let host = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&host).unwrap();
    (backend, patch, host)
}

#[test]
fn install_inserts_padding_rule_once() {
    init_logger();
    let backend = MemBackend::new();
    let document = backend.document();
    let head = document.head().unwrap();
    let meta = document.create_element("meta").unwrap();
    head.append_child(&meta).unwrap();
    HostPatch::install(&backend, &document).unwrap();
    HostPatch::install(&backend, &document).unwrap();
    let styles = head.elements_by_tag_name("style");
    assert_eq!(styles.len(), 1);
    assert_eq!(head.first_child(), Some(styles[0].clone()));
    assert_eq!(styles[0].text_content(), SHADOW_RESET);
    assert!(backend.registry().is_patched(&document));
}

#[test]
fn attach_returns_pending_container() {
    let (backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    assert_eq!(root.state(), SyncState::Pending);
    assert_eq!(root.mode(), ShadowMode::Open);
    assert_eq!(root.node_name(), "#document-fragment");
    assert_eq!(root.node_type(), DOCUMENT_FRAGMENT_NODE);
    assert_eq!(root.tag_name(), None);
    assert_eq!(root.inner_html(), "");
    assert_eq!(root.text_content(), "");
    assert_eq!(root.child_element_count(), 0);
    assert!(!root.has_child_nodes());
    assert_eq!(root.size().width, 0);
    assert_eq!(root.notifier_kind(), None);
    assert!(root.id().as_str().starts_with("#shadow-root:"));
    assert_eq!(backend.frames().len(), 1);
}

#[test]
fn host_gets_marker_and_frame() {
    let (_backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::closed()).unwrap();
    assert_eq!(host.get_attribute(OWNER_ATTRIBUTE).as_deref(), Some(""));
    let frame = root.frame().element();
    assert_eq!(host.child_nodes(), vec![frame.clone()]);
    assert_eq!(frame.tag_name().as_deref(), Some("IFRAME"));
    for (name, value) in FRAME_ATTRIBUTES {
        assert_eq!(frame.get_attribute(name).as_deref(), Some(*value));
    }
    assert_eq!(frame.style_text(), CSS_RESET);
}

#[test]
fn open_container_is_exposed() {
    let (_backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    let a = patch.shadow_root(&host).unwrap();
    let b = patch.shadow_root(&host).unwrap();
    assert!(a.ptr_eq(&root));
    assert!(b.ptr_eq(&root));
    match patch.attach_shadow(&host, &ShadowRequest::open()) {
        Err(Error::ShadowRootExists) => {}
        x => panic!("unexpected result {:?}", x),
    }
    assert!(patch.shadow_root(&host).unwrap().ptr_eq(&root));
}

#[test]
fn closed_container_is_not_exposed() {
    let (_backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::closed()).unwrap();
    assert_eq!(root.mode(), ShadowMode::Closed);
    assert_eq!(patch.shadow_root(&host), None);
}

#[test]
fn invalid_mode_is_rejected() {
    match ShadowRequest::with_mode("bogus") {
        Err(Error::InvalidMode(mode)) => assert_eq!(mode, "bogus"),
        x => panic!("unexpected result {:?}", x),
    }
    assert_eq!(ShadowRequest::with_mode("closed").unwrap(), ShadowRequest::closed());
    let request: ShadowRequest = serde_json::from_str(r#"{"mode":"open"}"#).unwrap();
    assert_eq!(request, ShadowRequest::open());
    assert!(serde_json::from_str::<ShadowRequest>(r#"{"mode":"Open"}"#).is_err());
    assert_eq!(serde_json::to_string(&ShadowRequest::closed()).unwrap(), r#"{"mode":"closed"}"#);
}

#[test]
fn missing_frame_support_fails() {
    let (_backend, patch, host) = setup(MemOptions {
        frames_enabled: false,
        ..Default::default()
    });
    match patch.attach_shadow(&host, &ShadowRequest::open()) {
        Err(Error::SurfaceUnavailable(_)) => {}
        x => panic!("unexpected result {:?}", x),
    }
    assert_eq!(patch.shadow_root(&host), None);
    assert_eq!(host.get_attribute(OWNER_ATTRIBUTE), None);
    assert!(host.child_nodes().is_empty());
}

#[test]
fn failed_attach_leaves_host_untouched() {
    init_logger();
    let backend = MemBackend::with_options(MemOptions::default());
    let document = backend.document();
    let patch = HostPatch::install(&backend, &document).unwrap();
    // not in the page, so the frame gets no content document
    let host = document.create_element("div").unwrap();
    match patch.attach_shadow(&host, &ShadowRequest::open()) {
        Err(Error::SurfaceUnavailable(_)) => {}
        x => panic!("unexpected result {:?}", x),
    }
    assert_eq!(host.get_attribute(OWNER_ATTRIBUTE), None);
    assert!(host.child_nodes().is_empty());
    assert_eq!(patch.shadow_root(&host), None);

    document.body().unwrap().append_child(&host).unwrap();
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    assert_eq!(host.get_attribute(OWNER_ATTRIBUTE).as_deref(), Some(""));
    assert_eq!(host.child_nodes(), vec![root.frame().element()]);
}

#[test]
fn marker_of_an_earlier_container_survives_a_failed_attach() {
    let (_backend, patch, host) = setup(MemOptions::default());
    patch.attach_shadow(&host, &ShadowRequest::closed()).unwrap();
    let detached = patch.document().create_element("div").unwrap();
    detached.set_attribute(OWNER_ATTRIBUTE, "").unwrap();
    assert!(patch.attach_shadow(&detached, &ShadowRequest::closed()).is_err());
    assert_eq!(detached.get_attribute(OWNER_ATTRIBUTE).as_deref(), Some(""));
    assert_eq!(host.get_attribute(OWNER_ATTRIBUTE).as_deref(), Some(""));
}

#[test]
fn content_written_early_is_migrated() {
    let (backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    root.set_inner_html("<div>hi</div>").unwrap();
    let placeholder = root.body();
    assert_eq!(root.text_content(), "hi");
    backend.finish_loading_frames();
    assert!(root.is_ready());
    let exposed = patch.shadow_root(&host).unwrap();
    assert_eq!(exposed.text_content(), "hi");
    assert_eq!(exposed.inner_html(), "<div>hi</div>");
    assert_eq!(exposed.child_element_count(), 1);
    assert_eq!(root.body(), root.document().body().unwrap());
    assert_ne!(root.body(), placeholder);
    assert!(placeholder.child_nodes().is_empty());
}

#[test]
fn migration_keeps_order() {
    let (backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    let document = root.document();
    let a = document.create_element("a").unwrap();
    let b = document.create_element("b").unwrap();
    let c = document.create_element("i").unwrap();
    root.append_child(&a).unwrap();
    root.append_child(&c).unwrap();
    root.insert_before(&b, Some(&c)).unwrap();
    backend.finish_loading_frames();
    assert_eq!(root.child_nodes(), vec![a.clone(), b.clone(), c.clone()]);
    assert_eq!(root.first_child(), Some(a.clone()));
    assert_eq!(root.last_child(), Some(c.clone()));
    assert!(root.contains(&b));
    assert_eq!(a.parent_node(), Some(root.document().body().unwrap()));
    assert_eq!(a.owner_document(), Some(root.document()));
    root.remove_child(&b).unwrap();
    root.replace_child(&b, &a).unwrap();
    assert_eq!(root.child_nodes(), vec![b, c]);
}

#[test]
fn members_resolve_through_current_body() {
    let (backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    let placeholder = match root.resolve(Member::InnerHtml) {
        Target::Body(x) => x,
        x => panic!("unexpected target {:?}", x),
    };
    backend.finish_loading_frames();
    match root.resolve(Member::AppendChild) {
        Target::Body(x) => {
            assert_ne!(x, placeholder);
            assert_eq!(Some(x), root.document().body());
        }
        x => panic!("unexpected target {:?}", x),
    }
    match root.resolve(Member::NodeName) {
        Target::Fragment(x) => assert_eq!(x.node_name(), "#document-fragment"),
        x => panic!("unexpected target {:?}", x),
    }
    match root.resolve(Member::ActiveElement) {
        Target::Document(x) => assert_eq!(x, root.document()),
        x => panic!("unexpected target {:?}", x),
    }
    match root.resolve(Member::Mode) {
        Target::Container(mode) => assert_eq!(mode, ShadowMode::Open),
        x => panic!("unexpected target {:?}", x),
    }
}

#[test]
fn active_element_comes_from_the_document() {
    let (backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    backend.finish_loading_frames();
    root.set_inner_html(r#"<input id="name">"#).unwrap();
    assert_eq!(root.active_element(), root.document().body());
    let input = root.get_element_by_id("name").unwrap();
    root.document().set_active_element(Some(&input));
    assert_eq!(root.active_element(), Some(input.clone()));
    assert_eq!(root.get_elements_by_tag_name("input"), vec![input]);
}

#[test]
fn complete_frame_is_ready_at_once() {
    let (_backend, patch, host) = setup(MemOptions {
        frame_loading: FrameLoading::Immediate,
        ..Default::default()
    });
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    assert!(root.is_ready());
    assert_eq!(Some(root.body()), root.document().body());
    root.set_inner_html("<p>now</p>").unwrap();
    assert_eq!(root.document().body().unwrap().text_content(), "now");
}

#[test]
fn unloaded_frame_stays_pending() {
    let (backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    root.set_inner_html("<p>waiting</p>").unwrap();
    backend.advance(10_000);
    assert_eq!(root.state(), SyncState::Pending);
    assert_eq!(root.text_content(), "waiting");
    assert!(root.frame().element().inline_style_writes().is_empty());
}

#[test]
fn readiness_runs_once() {
    let (backend, patch, host) = setup(MemOptions::default());
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    backend.finish_loading_frames();
    backend.finish_loading_frames();
    let head = root.document().head().unwrap();
    let styles = head.elements_by_tag_name("style");
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0].text_content(), shadow_frame::host::surface_style());
}
