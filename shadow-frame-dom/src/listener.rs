use std::cell::RefCell;

use shadow_frame::backend::Listener;
use wasm_bindgen::{prelude::*, JsCast};

use crate::DomEvent;

thread_local! {
    static LISTENERS: RefCell<Vec<Attached>> = RefCell::new(vec![]);
}

struct Attached {
    target: web_sys::EventTarget,
    event_type: String,
    listener: Listener<DomEvent>,
    cb: Closure<dyn Fn(web_sys::Event)>,
}

impl Attached {
    fn matches(
        &self,
        target: &web_sys::EventTarget,
        event_type: &str,
        listener: &Listener<DomEvent>,
    ) -> bool {
        self.target == *target && self.event_type == event_type && self.listener == *listener
    }
}

pub(crate) fn add(target: &web_sys::EventTarget, event_type: &str, listener: &Listener<DomEvent>) {
    let exists = LISTENERS.with(|x| {
        x.borrow()
            .iter()
            .any(|x| x.matches(target, event_type, listener))
    });
    if exists {
        return;
    }
    let f = listener.clone();
    let cb: Closure<dyn Fn(web_sys::Event)> =
        Closure::new(move |dom_event: web_sys::Event| f.call(&DomEvent::new(dom_event)));
    if let Err(err) = target.add_event_listener_with_callback(event_type, cb.as_ref().unchecked_ref()) {
        crate::log_js_error(&err);
        log::error!("Cannot listen to {:?} events", event_type);
        return;
    }
    LISTENERS.with(|x| {
        x.borrow_mut().push(Attached {
            target: target.clone(),
            event_type: event_type.to_string(),
            listener: listener.clone(),
            cb,
        })
    });
}

pub(crate) fn remove(
    target: &web_sys::EventTarget,
    event_type: &str,
    listener: &Listener<DomEvent>,
) {
    let attached = LISTENERS.with(|x| {
        let mut list = x.borrow_mut();
        let index = list
            .iter()
            .position(|x| x.matches(target, event_type, listener))?;
        Some(list.remove(index))
    });
    if let Some(attached) = attached {
        if let Err(err) = target
            .remove_event_listener_with_callback(event_type, attached.cb.as_ref().unchecked_ref())
        {
            crate::log_js_error(&err);
        }
    }
}
