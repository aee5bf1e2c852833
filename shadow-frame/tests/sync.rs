use std::rc::Rc;

use shadow_frame::{
    backend::mem::{MemBackend, MemOptions},
    prelude::*,
    sync::{notifier::NotifierKind, resize::BoxSize},
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn attach(options: MemOptions) -> (Rc<MemBackend>, ShadowRoot<MemBackend>) {
    init_logger();
    let backend = MemBackend::with_options(options);
    let document = backend.document();
    let patch = HostPatch::install(&backend, &document).unwrap();
    let host = document.create_element("section").unwrap();
    document.body().unwrap().append_child(&host).unwrap();
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    (backend, root)
}

fn fallback() -> MemOptions {
    MemOptions {
        mutation_observer: false,
        ..Default::default()
    }
}

fn size_writes(root: &ShadowRoot<MemBackend>) -> Vec<(String, String)> {
    root.frame().element().inline_style_writes()
}

fn pair(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

#[test]
fn host_selector_is_rewritten_when_ready() {
    let (backend, root) = attach(MemOptions::default());
    root.set_inner_html("<style>:host { color: red; }</style>").unwrap();
    assert_eq!(root.text_content(), ":host { color: red; }");
    backend.finish_loading_frames();
    assert_eq!(root.text_content(), "body { color: red; }");
}

#[test]
fn late_styles_are_rewritten_on_change() {
    let (backend, root) = attach(MemOptions::default());
    backend.finish_loading_frames();
    let style = root.document().create_element("style").unwrap();
    style.set_text_content(":host > p { margin: 0 }");
    root.append_child(&style).unwrap();
    assert_eq!(style.text_content(), ":host > p { margin: 0 }");
    backend.flush();
    assert_eq!(style.text_content(), "body > p { margin: 0 }");
}

#[test]
fn empty_body_never_resizes() {
    let (backend, root) = attach(MemOptions::default());
    backend.finish_loading_frames();
    assert_eq!(root.notifier_kind(), Some(NotifierKind::Native));
    assert_eq!(root.size(), BoxSize::new(0, 0));
    assert!(size_writes(&root).is_empty());
}

#[test]
fn resize_writes_only_changes() {
    let (backend, root) = attach(MemOptions::default());
    backend.finish_loading_frames();
    let body = root.body();
    body.set_offset_size(120, 40);
    root.set_inner_html("<p>a</p>").unwrap();
    backend.flush();
    assert_eq!(size_writes(&root), vec![pair("width", "120px"), pair("height", "40px")]);
    assert_eq!(root.size(), BoxSize::new(120, 40));

    root.set_inner_html("<p>b</p>").unwrap();
    backend.flush();
    assert_eq!(size_writes(&root).len(), 2);

    body.set_offset_size(120, 55);
    root.set_inner_html("<p>c</p>").unwrap();
    backend.flush();
    assert_eq!(
        size_writes(&root),
        vec![pair("width", "120px"), pair("height", "40px"), pair("height", "55px")],
    );
    let frame = root.frame().element();
    assert_eq!(frame.style_property("width").as_deref(), Some("120px"));
    assert_eq!(frame.style_property("height").as_deref(), Some("55px"));
}

#[test]
fn observer_batches_changes() {
    let (backend, root) = attach(MemOptions::default());
    backend.finish_loading_frames();
    root.body().set_offset_size(10, 10);
    for _ in 0..3 {
        let p = root.document().create_element("p").unwrap();
        root.append_child(&p).unwrap();
    }
    assert!(size_writes(&root).is_empty());
    backend.flush();
    assert_eq!(size_writes(&root).len(), 2);
}

#[test]
fn fallback_notifier_debounces_bursts() {
    let (backend, root) = attach(fallback());
    backend.finish_loading_frames();
    assert_eq!(root.notifier_kind(), Some(NotifierKind::SubtreeModified));
    root.body().set_offset_size(30, 10);
    for _ in 0..3 {
        let p = root.document().create_element("p").unwrap();
        root.append_child(&p).unwrap();
    }
    assert_eq!(backend.pending_timers(), 1);
    assert!(size_writes(&root).is_empty());
    backend.advance(0);
    assert_eq!(size_writes(&root), vec![pair("width", "30px"), pair("height", "10px")]);
    assert_eq!(backend.pending_timers(), 0);
}

#[test]
fn fallback_notifier_rewrites_styles() {
    let (backend, root) = attach(fallback());
    backend.finish_loading_frames();
    root.set_inner_html("<style>:host{display:block}</style>").unwrap();
    assert_eq!(root.text_content(), ":host{display:block}");
    backend.advance(0);
    assert_eq!(root.text_content(), "body{display:block}");
}

#[test]
fn dropped_closed_root_keeps_resizing() {
    init_logger();
    let backend = MemBackend::with_options(MemOptions::default());
    let document = backend.document();
    let patch = HostPatch::install(&backend, &document).unwrap();
    let host = document.create_element("section").unwrap();
    document.body().unwrap().append_child(&host).unwrap();
    let root = patch.attach_shadow(&host, &ShadowRequest::closed()).unwrap();
    backend.finish_loading_frames();
    let frame = root.frame().element();
    let body = root.body();
    drop(root);

    body.set_offset_size(50, 20);
    let p = body.owner_document().unwrap().create_element("p").unwrap();
    body.append_child(&p).unwrap();
    backend.flush();
    assert_eq!(frame.inline_style_writes(), vec![pair("width", "50px"), pair("height", "20px")]);

    let style = body.owner_document().unwrap().create_element("style").unwrap();
    style.set_text_content(":host{color:red}");
    body.append_child(&style).unwrap();
    backend.flush();
    assert_eq!(style.text_content(), "body{color:red}");
}

#[test]
fn observer_failure_still_becomes_ready() {
    let (backend, root) = attach(MemOptions::default());
    root.set_inner_html("<p>early</p>").unwrap();
    backend.set_observe_error(Some("observer unavailable"));
    backend.finish_loading_frames();
    assert!(root.is_ready());
    assert_eq!(root.notifier_kind(), None);
    assert_eq!(root.text_content(), "early");
    assert_eq!(Some(root.body()), root.document().body());
    assert!(root.events().is_installed());
}
