use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// The identifier of a shadow container.
///
/// Combines a process-wide increasing counter with a random component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueId(String);

impl UniqueId {
    pub(crate) fn generate() -> Self {
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("#shadow-root:{}.{}", counter, fastrand::u64(..)))
    }

    /// The id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
