//! An in-memory backend.
//!
//! It keeps a reference-counted node tree and runs timers and microtasks on a manual
//! clock, so hosts without a browser (and tests) can drive the whole lifecycle of a
//! shadow container deterministically.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use super::{Backend, ReadyState};
use crate::{error::Error, host::Registry};

mod document;
mod event;
mod frame;
mod html;
mod node;

pub use document::MemDocument;
pub use event::{MemEvent, PropertyValue, READ_ONLY_PROPERTIES};
pub use frame::MemFrame;
pub use node::MemNode;

/// How embedded frames load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameLoading {
    /// Frames start with a loading document without a body and are replaced on `finish_loading`.
    Deferred,
    /// Frames start with a complete document.
    Immediate,
}

/// The options of a `MemBackend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemOptions {
    pub frame_loading: FrameLoading,
    /// Whether frame windows provide a native mutation observer.
    pub mutation_observer: bool,
    /// Whether frames can be created at all.
    pub frames_enabled: bool,
}

impl Default for MemOptions {
    fn default() -> Self {
        Self {
            frame_loading: FrameLoading::Deferred,
            mutation_observer: true,
            frames_enabled: true,
        }
    }
}

/// A pending timer of the in-memory backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemTimer(u64);

struct TimerEntry {
    id: u64,
    due: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Scheduler {
    now: Cell<u64>,
    next_id: Cell<u64>,
    timers: RefCell<Vec<TimerEntry>>,
    microtasks: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl Scheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> MemTimer {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.timers.borrow_mut().push(TimerEntry {
            id,
            due: self.now.get() + delay_ms as u64,
            task,
        });
        MemTimer(id)
    }

    fn clear_timeout(&self, timer: MemTimer) {
        self.timers.borrow_mut().retain(|x| x.id != timer.0);
    }

    fn queue_microtask(&self, task: Box<dyn FnOnce()>) {
        self.microtasks.borrow_mut().push_back(task);
    }

    fn flush(&self) {
        loop {
            let task = self.microtasks.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    fn next_due(&self, until: u64) -> Option<TimerEntry> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, x)| x.due <= until)
            .min_by_key(|(_, x)| (x.due, x.id))
            .map(|(i, _)| i)?;
        Some(timers.remove(index))
    }

    fn advance(&self, ms: u64) {
        let until = self.now.get() + ms;
        self.flush();
        while let Some(entry) = self.next_due(until) {
            self.now.set(entry.due);
            (entry.task)();
            self.flush();
        }
        self.now.set(until);
    }
}

pub(crate) struct MemContext {
    options: MemOptions,
    scheduler: Scheduler,
    frames: RefCell<Vec<MemFrame>>,
    observe_error: RefCell<Option<String>>,
}

impl MemContext {
    pub(crate) fn queue_microtask(&self, task: Box<dyn FnOnce()>) {
        self.scheduler.queue_microtask(task)
    }

    pub(crate) fn observe_error(&self) -> Option<String> {
        self.observe_error.borrow().clone()
    }
}

/// The in-memory backend.
pub struct MemBackend {
    ctx: Rc<MemContext>,
    registry: Registry<Self>,
    document: MemDocument,
}

impl MemBackend {
    /// Create a backend with the default options.
    pub fn new() -> Rc<Self> {
        Self::with_options(MemOptions::default())
    }

    /// Create a backend whose page document is complete and has a head and a body.
    pub fn with_options(options: MemOptions) -> Rc<Self> {
        let ctx = Rc::new(MemContext {
            options,
            scheduler: Scheduler::default(),
            frames: RefCell::new(vec![]),
            observe_error: RefCell::new(None),
        });
        let document = MemDocument::new_with_body(&ctx, ReadyState::Complete);
        Rc::new(Self {
            ctx,
            registry: Registry::default(),
            document,
        })
    }

    /// The page document.
    pub fn document(&self) -> MemDocument {
        self.document.clone()
    }

    pub fn options(&self) -> &MemOptions {
        &self.ctx.options
    }

    /// The virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.ctx.scheduler.now.get()
    }

    /// The number of timers not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.ctx.scheduler.timers.borrow().len()
    }

    /// Run all queued microtasks, including the ones they queue.
    pub fn flush(&self) {
        self.ctx.scheduler.flush()
    }

    /// Move the clock forward, firing due timers in order.
    pub fn advance(&self, ms: u64) {
        self.ctx.scheduler.advance(ms)
    }

    /// All frames created so far.
    pub fn frames(&self) -> Vec<MemFrame> {
        self.ctx.frames.borrow().clone()
    }

    /// Make native mutation observers fail with `msg` from now on, or work again with `None`.
    pub fn set_observe_error(&self, msg: Option<&str>) {
        *self.ctx.observe_error.borrow_mut() = msg.map(|x| x.to_string());
    }

    /// Finish loading every frame that has not loaded yet.
    pub fn finish_loading_frames(&self) {
        for frame in self.frames() {
            frame.finish_loading();
        }
    }
}

impl Backend for MemBackend {
    type Node = MemNode;
    type Document = MemDocument;
    type Frame = MemFrame;
    type Event = MemEvent;
    type Timer = MemTimer;

    fn registry(&self) -> &Registry<Self> {
        &self.registry
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<MemTimer, Error> {
        Ok(self.ctx.scheduler.set_timeout(delay_ms, task))
    }

    fn clear_timeout(&self, timer: MemTimer) {
        self.ctx.scheduler.clear_timeout(timer)
    }
}
