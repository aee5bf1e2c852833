use std::cell::RefCell;

use crate::backend::Backend;

enum BodyState<N> {
    Provisional(N),
    Settled(N),
}

/// The "current body" of a shadow container.
///
/// Holds the provisional body (possibly a detached placeholder) until the embedded
/// document is ready, then the real body. It settles exactly once.
/// Readers must always go through `get` and never keep the returned node across
/// the readiness transition.
pub struct CurrentBody<B: Backend> {
    state: RefCell<BodyState<B::Node>>,
}

impl<B: Backend> CurrentBody<B> {
    pub(crate) fn new(provisional: B::Node) -> Self {
        Self {
            state: RefCell::new(BodyState::Provisional(provisional)),
        }
    }

    /// The body that delegated members should currently target.
    pub fn get(&self) -> B::Node {
        match &*self.state.borrow() {
            BodyState::Provisional(x) | BodyState::Settled(x) => x.clone(),
        }
    }

    /// Whether the real body has been bound.
    pub fn is_settled(&self) -> bool {
        matches!(&*self.state.borrow(), BodyState::Settled(_))
    }

    /// Bind the real body.
    ///
    /// Returns the previous body if it differs from `real`.
    /// Settling twice is a logic error and leaves the first binding in place.
    pub(crate) fn settle(&self, real: B::Node) -> Option<B::Node> {
        let mut state = self.state.borrow_mut();
        let prev = match &*state {
            BodyState::Provisional(x) => x.clone(),
            BodyState::Settled(_) => {
                log::error!("The shadow root body has already been settled");
                return None;
            }
        };
        let replaced = if prev == real { None } else { Some(prev) };
        *state = BodyState::Settled(real);
        replaced
    }
}
