//! Single-slot holder for a runtime entity's configuration.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Atomically swappable slot holding an immutable config value.
///
/// The slot is empty until the first reconciliation stores a value. Writers
/// replace the whole value with one pointer store; readers never take a lock
/// and never observe a partially built config.
pub struct ConfigSlot<T> {
    inner: ArcSwapOption<T>,
}

impl<T> ConfigSlot<T> {
    pub fn empty() -> Self {
        Self {
            inner: ArcSwapOption::empty(),
        }
    }

    /// Current value, if any.
    pub fn load(&self) -> Option<Arc<T>> {
        self.inner.load_full()
    }

    /// Replace the current value.
    pub fn store(&self, value: Arc<T>) {
        self.inner.store(Some(value));
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_none()
    }
}

impl<T> Default for ConfigSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for ConfigSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigSlot").field(&self.load()).finish()
    }
}
