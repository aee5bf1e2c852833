use std::{cell::RefCell, rc::Rc};

use shadow_frame::{
    backend::mem::{MemBackend, MemEvent, MemNode, MemOptions, PropertyValue},
    prelude::*,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Fixture {
    backend: Rc<MemBackend>,
    host: MemNode,
    root: ShadowRoot<MemBackend>,
}

fn setup() -> Fixture {
    init_logger();
    let backend = MemBackend::with_options(MemOptions::default());
    let document = backend.document();
    let patch = HostPatch::install(&backend, &document).unwrap();
    let host = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&host).unwrap();
    let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
    root.set_inner_html(r#"<div id="panel"><button id="ok">ok</button></div><span id="other"></span>"#)
        .unwrap();
    Fixture {
        backend,
        host,
        root,
    }
}

/// A listener recording every event it receives.
fn recorder() -> (Listener<MemEvent>, Rc<RefCell<Vec<MemEvent>>>) {
    let log = Rc::new(RefCell::new(vec![]));
    let log2 = log.clone();
    let listener = Listener::new(move |event: &MemEvent| log2.borrow_mut().push(event.clone()));
    (listener, log)
}

fn click() -> MemEvent {
    MemEvent::new("click", true, true)
}

#[test]
fn inner_events_bubble_out_through_host() {
    let f = setup();
    f.backend.finish_loading_frames();
    let (outer, outer_log) = recorder();
    f.host.add_event_listener("click", &outer);
    let (inner, inner_log) = recorder();
    let panel = f.root.get_element_by_id("panel").unwrap();
    let button = f.root.get_element_by_id("ok").unwrap();
    f.root.events().add_event_listener(&panel, "click", &inner);

    let event = click().with_property("detail", PropertyValue::Number(3.));
    assert_eq!(f.root.events().dispatch_event(&button, &event).unwrap(), Some(true));
    assert_eq!(inner_log.borrow().len(), 1);
    let outer_log = outer_log.borrow();
    assert_eq!(outer_log.len(), 1);
    let bridged = &outer_log[0];
    assert_eq!(bridged.event_type(), "click");
    assert!(bridged.bubbles());
    assert!(bridged.cancelable());
    assert_eq!(bridged.target(), Some(f.host.clone()));
    assert_eq!(bridged.property("detail"), Some(PropertyValue::Number(3.)));
}

#[test]
fn events_outside_the_listening_node_stay_inside() {
    let f = setup();
    f.backend.finish_loading_frames();
    let (outer, outer_log) = recorder();
    f.host.add_event_listener("click", &outer);
    let (inner, inner_log) = recorder();
    let panel = f.root.get_element_by_id("panel").unwrap();
    let other = f.root.get_element_by_id("other").unwrap();
    f.root.events().add_event_listener(&panel, "click", &inner);
    f.root.events().dispatch_event(&other, &click()).unwrap();
    assert!(inner_log.borrow().is_empty());
    assert!(outer_log.borrow().is_empty());
}

#[test]
fn non_bubbling_events_are_not_bridged() {
    let f = setup();
    f.backend.finish_loading_frames();
    let (outer, outer_log) = recorder();
    f.host.add_event_listener("focus", &outer);
    let (inner, inner_log) = recorder();
    let button = f.root.get_element_by_id("ok").unwrap();
    f.root.events().add_event_listener(&button, "focus", &inner);
    f.root
        .events()
        .dispatch_event(&button, &MemEvent::new("focus", false, false))
        .unwrap();
    assert_eq!(inner_log.borrow().len(), 1);
    assert!(outer_log.borrow().is_empty());
}

#[test]
fn duplicate_registration_bridges_once() {
    let f = setup();
    f.backend.finish_loading_frames();
    let (outer, outer_log) = recorder();
    f.host.add_event_listener("click", &outer);
    let (inner, inner_log) = recorder();
    let button = f.root.get_element_by_id("ok").unwrap();
    f.root.events().add_event_listener(&button, "click", &inner);
    f.root.events().add_event_listener(&button, "click", &inner.clone());
    assert_eq!(f.root.events().registration_count(), 1);
    assert_eq!(button.listener_count("click"), 1);
    f.root.events().dispatch_event(&button, &click()).unwrap();
    assert_eq!(inner_log.borrow().len(), 1);
    assert_eq!(outer_log.borrow().len(), 1);

    let (other, _) = recorder();
    f.root.events().add_event_listener(&button, "click", &other);
    f.root.events().add_event_listener(&button, "keydown", &inner);
    assert_eq!(f.root.events().registration_count(), 3);
}

#[test]
fn early_registration_is_replayed() {
    let f = setup();
    let (outer, outer_log) = recorder();
    f.host.add_event_listener("click", &outer);
    let (inner, inner_log) = recorder();
    let button = f.root.get_element_by_id("ok").unwrap();
    f.root.events().add_event_listener(&button, "click", &inner);
    assert_eq!(f.root.events().dispatch_event(&button, &click()).unwrap(), None);
    assert_eq!(f.root.events().pending_len(), 2);
    assert!(inner_log.borrow().is_empty());

    f.backend.finish_loading_frames();
    assert!(f.root.events().is_installed());
    assert_eq!(f.root.events().pending_len(), 0);
    assert_eq!(inner_log.borrow().len(), 1);
    assert_eq!(outer_log.borrow().len(), 1);
    assert_eq!(button.parent_node(), f.root.get_element_by_id("panel"));
}

#[test]
fn removal_after_replay_stops_bridging() {
    let f = setup();
    let (outer, outer_log) = recorder();
    f.host.add_event_listener("click", &outer);
    let (inner, inner_log) = recorder();
    let button = f.root.get_element_by_id("ok").unwrap();
    f.root.events().add_event_listener(&button, "click", &inner);
    f.backend.finish_loading_frames();
    assert_eq!(f.root.events().registration_count(), 1);

    f.root.events().remove_event_listener(&button, "click", &inner);
    assert_eq!(f.root.events().registration_count(), 0);
    let html = f.root.document().document_element().unwrap();
    assert_eq!(html.listener_count("click"), 0);
    assert_eq!(button.listener_count("click"), 0);
    f.root.events().dispatch_event(&button, &click()).unwrap();
    assert!(inner_log.borrow().is_empty());
    assert!(outer_log.borrow().is_empty());
}

#[test]
fn early_removal_is_replayed_in_order() {
    let f = setup();
    let (inner, inner_log) = recorder();
    let button = f.root.get_element_by_id("ok").unwrap();
    f.root.events().add_event_listener(&button, "click", &inner);
    f.root.events().remove_event_listener(&button, "click", &inner);
    f.root.events().dispatch_event(&button, &click()).unwrap();
    f.backend.finish_loading_frames();
    assert_eq!(f.root.events().registration_count(), 0);
    assert!(inner_log.borrow().is_empty());
}

#[test]
fn container_listeners_target_the_real_body() {
    let f = setup();
    let (outer, outer_log) = recorder();
    f.host.add_event_listener("select", &outer);
    let (inner, inner_log) = recorder();
    f.root.add_event_listener("select", &inner);
    f.backend.finish_loading_frames();
    let body = f.root.document().body().unwrap();
    assert_eq!(body.listener_count("select"), 1);

    let button = f.root.get_element_by_id("ok").unwrap();
    button.dispatch_event(&MemEvent::new("select", true, false)).unwrap();
    assert_eq!(inner_log.borrow().len(), 1);
    assert_eq!(outer_log.borrow().len(), 1);

    f.root.remove_event_listener("select", &inner);
    assert_eq!(body.listener_count("select"), 0);
}

#[test]
fn container_dispatch_is_deferred() {
    let f = setup();
    let (inner, inner_log) = recorder();
    f.root.add_event_listener("ping", &inner);
    let event = MemEvent::new("ping", false, false);
    assert_eq!(f.root.dispatch_event(&event).unwrap(), None);
    f.backend.finish_loading_frames();
    assert_eq!(inner_log.borrow().len(), 1);
    assert_eq!(inner_log.borrow()[0].target(), f.root.document().body());
    assert_eq!(f.root.dispatch_event(&event).unwrap(), Some(true));
    assert_eq!(inner_log.borrow().len(), 2);
}
