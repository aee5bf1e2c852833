//! `:host` selector rewriting.
//!
//! Inside the embedded document the body plays the host, so every `:host` token in a
//! style element is replaced with `body`. The replacement is purely textual.

use crate::backend::{Backend, BackendNode};

/// The host-selector token.
pub const HOST_SELECTOR: &str = ":host";

/// The selector that replaces the host-selector token.
pub const HOST_REPLACEMENT: &str = "body";

/// Rewrite the host-selector tokens of a style text.
///
/// Returns `None` if the text contains no token, so callers can skip the write.
pub fn rewrite_host_selector(css: &str) -> Option<String> {
    if css.contains(HOST_SELECTOR) {
        Some(css.replace(HOST_SELECTOR, HOST_REPLACEMENT))
    } else {
        None
    }
}

/// Rewrite every style element under `root`, returning how many were changed.
pub(crate) fn rewrite_styles<B: Backend>(root: &B::Node) -> usize {
    let mut changed = 0;
    for style in root.elements_by_tag_name("style") {
        if let Some(css) = rewrite_host_selector(&style.text_content()) {
            style.set_text_content(&css);
            changed += 1;
        }
    }
    changed
}
