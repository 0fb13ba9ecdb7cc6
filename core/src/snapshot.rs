use parking_lot::RwLock;
use std::sync::Arc;

/// Holder for an immutable, swappable value such as a loaded index.
///
/// Readers take an `Arc` and evaluate against it without holding the lock;
/// a reload builds a new value and swaps it in whole.
pub struct Snapshot<T> {
    current: RwLock<Arc<T>>,
}

impl<T> Snapshot<T> {
    pub fn new(value: T) -> Self {
        Self { current: RwLock::new(Arc::new(value)) }
    }

    pub fn current(&self) -> Arc<T> {
        self.current.read().clone()
    }

    /// Swap in `value`, returning the previous snapshot.
    pub fn replace(&self, value: T) -> Arc<T> {
        std::mem::replace(&mut *self.current.write(), Arc::new(value))
    }
}
