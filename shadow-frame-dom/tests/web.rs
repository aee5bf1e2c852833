#![cfg(target_arch = "wasm32")]

use std::{cell::RefCell, rc::Rc, sync::Once};

use shadow_frame::prelude::*;
use shadow_frame_dom::{install, install_emulated, Capability, DomBackend, DomEvent, DomNode};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

static INIT: Once = Once::new();

fn init() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Trace).unwrap();
    });
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
}

async fn wait_ready(root: &ShadowRoot<DomBackend>) {
    for _ in 0..100 {
        if root.is_ready() {
            return;
        }
        sleep(10).await;
    }
    panic!("the shadow container never became ready");
}

fn new_host(patch: &HostPatch<DomBackend>) -> DomNode {
    let document = patch.document();
    let host = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&host).unwrap();
    host
}

#[wasm_bindgen_test]
fn capability_matches_native_support() {
    init();
    let native = DomBackend::current().unwrap().has_native_shadow_root();
    match install().unwrap() {
        Capability::Native => assert!(native),
        Capability::Emulated(_) => assert!(!native),
    }
}

#[wasm_bindgen_test]
fn install_is_idempotent() {
    init();
    let patch = install_emulated().unwrap();
    install_emulated().unwrap();
    let head = patch.document().head().unwrap();
    let count = head
        .child_nodes()
        .iter()
        .filter(|x| x.text_content().contains("data-attachshadow"))
        .count();
    assert_eq!(count, 1);
}

#[wasm_bindgen_test]
async fn content_moves_into_the_frame() {
    init();
    let patch = install_emulated().unwrap();
    let host = new_host(&patch);
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    assert_eq!(host.get_attribute("data-attachshadow").as_deref(), Some(""));
    root.set_inner_html(r#"<p id="greeting">hi</p>"#).unwrap();
    wait_ready(&root).await;
    let greeting = root.get_element_by_id("greeting").unwrap();
    assert_eq!(greeting.text_content(), "hi");
    assert_eq!(Some(root.body()), root.document().body());
    assert_eq!(patch.shadow_root(&host), Some(root));
}

#[wasm_bindgen_test]
async fn host_selector_targets_the_frame_body() {
    init();
    let patch = install_emulated().unwrap();
    let host = new_host(&patch);
    let root = patch.attach_shadow(&host, &ShadowRequest::closed()).unwrap();
    root.set_inner_html("<style>:host { display: block }</style>").unwrap();
    wait_ready(&root).await;
    assert_eq!(root.text_content(), "body { display: block }");
    assert_eq!(patch.shadow_root(&host), None);
}

#[wasm_bindgen_test]
async fn frame_follows_body_height() {
    init();
    let patch = install_emulated().unwrap();
    let host = new_host(&patch);
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    wait_ready(&root).await;
    root.set_inner_html(r#"<div style="height: 40px"></div>"#).unwrap();
    sleep(20).await;
    assert!(root.size().height > 0);
    let frame = root.frame().element();
    let style = frame.get_attribute("style").unwrap_or_default();
    assert!(style.contains(&format!("height: {}px", root.size().height)));
}

#[wasm_bindgen_test]
async fn inner_events_reach_the_host() {
    init();
    let patch = install_emulated().unwrap();
    let host = new_host(&patch);
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    root.set_inner_html(r#"<button id="ok">ok</button>"#).unwrap();
    wait_ready(&root).await;

    let outer_log = Rc::new(RefCell::new(vec![]));
    let outer_log2 = outer_log.clone();
    let outer = Listener::new(move |ev: &DomEvent| outer_log2.borrow_mut().push(ev.target()));
    host.add_event_listener("ping", &outer);
    let inner_count = Rc::new(RefCell::new(0));
    let inner_count2 = inner_count.clone();
    let inner = Listener::new(move |_: &DomEvent| *inner_count2.borrow_mut() += 1);
    let button = root.get_element_by_id("ok").unwrap();
    root.events().add_event_listener(&button, "ping", &inner);

    let event = root.document().create_event("ping", true, true).unwrap();
    assert_eq!(root.events().dispatch_event(&button, &event).unwrap(), Some(true));
    assert_eq!(*inner_count.borrow(), 1);
    assert_eq!(*outer_log.borrow(), vec![Some(host.clone())]);

    root.events().remove_event_listener(&button, "ping", &inner);
    let event = root.document().create_event("ping", true, true).unwrap();
    root.events().dispatch_event(&button, &event).unwrap();
    assert_eq!(*inner_count.borrow(), 1);
    assert_eq!(outer_log.borrow().len(), 1);
    host.remove_event_listener("ping", &outer);
}
