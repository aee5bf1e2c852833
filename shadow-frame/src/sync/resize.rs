use std::cell::Cell;

use crate::{
    backend::{Backend, BackendNode},
    error::Error,
};

/// A rendered box size in integer pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoxSize {
    pub width: i32,
    pub height: i32,
}

impl BoxSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Keeps the frame size in sync with the embedded body box.
///
/// Only changed dimensions are written to the frame inline style.
#[derive(Debug, Default)]
pub struct ResizeTracker {
    last: Cell<BoxSize>,
}

impl ResizeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last recorded size.
    pub fn last(&self) -> BoxSize {
        self.last.get()
    }

    /// Record a measurement and write the changed dimensions onto `frame_element`.
    ///
    /// Returns whether anything was written.
    pub fn update<B: Backend>(&self, frame_element: &B::Node, size: BoxSize) -> Result<bool, Error> {
        let mut last = self.last.get();
        let mut written = false;
        if last.width != size.width {
            last.width = size.width;
            self.last.set(last);
            frame_element.set_style_property("width", &format!("{}px", size.width))?;
            written = true;
        }
        if last.height != size.height {
            last.height = size.height;
            self.last.set(last);
            frame_element.set_style_property("height", &format!("{}px", size.height))?;
            written = true;
        }
        Ok(written)
    }

    /// Measure `body` and update.
    pub fn measure<B: Backend>(&self, frame_element: &B::Node, body: &B::Node) -> Result<bool, Error> {
        let (width, height) = body.offset_size();
        self.update::<B>(frame_element, BoxSize::new(width, height))
    }
}
