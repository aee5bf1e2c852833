//! shadow-frame: shadow root emulation backed by embedded frames
//!
//! This is the *core* crate. It works on any host environment implementing the
//! traits in `backend`, and ships an in-memory backend for headless hosts and tests.
//!
//! A shadow container is requested from a host element through an installed
//! `HostPatch`. The container is returned immediately and stores its content in the
//! body of a same-origin embedded document. Once that document is ready, the content
//! written so far is moved into it, `:host` selectors are rewritten, the frame is
//! resized whenever the content changes, and events fired inside are re-dispatched
//! on the host element.
//!
//! ```rust
//! use shadow_frame::{backend::mem::MemBackend, prelude::*};
//!
//! let backend = MemBackend::new();
//! let document = backend.document();
//! let patch = HostPatch::install(&backend, &document).unwrap();
//! let host = document.create_element("div").unwrap();
//! document.body().unwrap().append_child(&host).unwrap();
//!
//! // usable right away, the content is moved into the frame once it loads
//! let root = patch.attach_shadow(&host, &ShadowRequest::open()).unwrap();
//! root.set_inner_html("<div>hi</div>").unwrap();
//! backend.finish_loading_frames();
//! assert!(root.is_ready());
//! assert_eq!(root.text_content(), "hi");
//! assert_eq!(patch.shadow_root(&host), Some(root));
//! ```

pub mod backend;
pub mod body;
pub mod debounce;
pub mod delegate;
pub mod error;
pub mod host;
pub mod request;
pub mod shadow_root;
pub mod sync;
pub mod uid;

pub use error::Error;
pub use host::HostPatch;
pub use request::{ShadowMode, ShadowRequest};
pub use shadow_root::ShadowRoot;
pub use sync::SyncState;

pub mod prelude {
    pub use super::backend::{
        Backend, BackendDocument, BackendEvent, BackendFrame, BackendNode, Listener,
    };
    pub use super::{HostPatch, ShadowMode, ShadowRequest, ShadowRoot};
}
