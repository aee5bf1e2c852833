//! A cancellable delayed task.

use std::{cell::RefCell, rc::Rc};

use crate::backend::Backend;

/// Runs a task once after a burst of triggers has settled.
///
/// Each `trigger` cancels the pending run, if any, and schedules a new one,
/// so at most one run is pending at any time.
pub struct Debouncer<B: Backend> {
    backend: Rc<B>,
    delay_ms: u32,
    pending: RefCell<Option<B::Timer>>,
    task: Box<dyn Fn()>,
}

impl<B: Backend> Debouncer<B> {
    pub fn new(backend: Rc<B>, delay_ms: u32, task: impl 'static + Fn()) -> Rc<Self> {
        Rc::new(Self {
            backend,
            delay_ms,
            pending: RefCell::new(None),
            task: Box::new(task),
        })
    }

    /// Whether a run is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Rearm the delayed run.
    pub fn trigger(self: &Rc<Self>) {
        if let Some(timer) = self.pending.borrow_mut().take() {
            self.backend.clear_timeout(timer);
        }
        let this = Rc::downgrade(self);
        let fire = Box::new(move || {
            if let Some(this) = this.upgrade() {
                this.pending.borrow_mut().take();
                log::trace!("Debounced task fired");
                (this.task)();
            }
        });
        match self.backend.set_timeout(self.delay_ms, fire) {
            Ok(timer) => {
                *self.pending.borrow_mut() = Some(timer);
            }
            Err(err) => {
                log::error!("Cannot schedule debounced task: {}", err);
            }
        }
    }

    /// Cancel the pending run, if any.
    pub fn cancel(&self) {
        if let Some(timer) = self.pending.borrow_mut().take() {
            self.backend.clear_timeout(timer);
        }
    }
}
