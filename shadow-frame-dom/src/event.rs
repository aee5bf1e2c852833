use js_sys::{Object, Reflect};
use shadow_frame::{backend::BackendEvent, error::Error};
use wasm_bindgen::{JsCast, JsValue};

use crate::{backend_error, js_error, DomBackend, DomNode};

/// A DOM event.
#[derive(Debug, Clone)]
pub struct DomEvent {
    event: web_sys::Event,
}

impl DomEvent {
    /// Wrap a DOM event
    pub fn new(event: web_sys::Event) -> Self {
        Self { event }
    }

    /// The underlying DOM event
    pub fn dom(&self) -> &web_sys::Event {
        &self.event
    }
}

impl BackendEvent<DomBackend> for DomEvent {
    fn event_type(&self) -> String {
        self.event.type_()
    }

    fn bubbles(&self) -> bool {
        self.event.bubbles()
    }

    fn cancelable(&self) -> bool {
        self.event.cancelable()
    }

    fn target(&self) -> Option<DomNode> {
        let target = self.event.target()?;
        // targets inside an embedded document fail `instanceof Node` in this realm
        if Reflect::has(&target, &JsValue::from_str("nodeType")).unwrap_or(false) {
            Some(DomNode::new(target.unchecked_into()))
        } else {
            None
        }
    }

    fn property_names(&self) -> Vec<String> {
        let mut ret: Vec<String> = vec![];
        let mut obj: Object = self.event.clone().unchecked_into();
        loop {
            for key in Object::keys(&obj).iter() {
                if let Some(key) = key.as_string() {
                    if !ret.contains(&key) {
                        ret.push(key);
                    }
                }
            }
            let proto = Object::get_prototype_of(&obj);
            if proto.is_null() || proto.is_undefined() {
                break;
            }
            obj = proto;
        }
        ret
    }

    fn copy_property(&self, from: &Self, name: &str) -> Result<(), Error> {
        let key = JsValue::from_str(name);
        let value = Reflect::get(&from.event, &key).map_err(js_error("Cannot read event property"))?;
        match Reflect::set(&self.event, &key, &value) {
            Ok(true) => Ok(()),
            Ok(false) => Err(backend_error(format!("Event property {:?} is read-only", name))),
            Err(err) => Err(js_error("Cannot write event property")(err)),
        }
    }
}
