//! Disposable — a handle that removes exactly one registration.

use std::fmt;

use parking_lot::Mutex;

type DisposeFn = Box<dyn FnOnce() + Send + Sync>;

/// Removes the one registration it was created for. Collected by the
/// `*_tracked` registration methods of [`EventEmitter`](crate::EventEmitter).
///
/// Disposing is idempotent, and a no-op once the emitter is gone or the entry
/// was already removed some other way (e.g. a one-shot listener that fired).
pub struct Disposable {
    action: Mutex<Option<DisposeFn>>,
}

impl Disposable {
    pub(crate) fn new(action: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    pub fn dispose(&self) {
        // Take first so the lock is not held while the emitter runs hooks.
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.action.lock().is_none()
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
