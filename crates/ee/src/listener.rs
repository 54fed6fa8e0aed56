//! Listener — a shareable callback handle with identity.
//!
//! Listeners are stored as `Arc<dyn Fn(&A) -> Option<R>>`. Cloning a handle is
//! a ref-count bump and every clone compares equal under [`Listener::ptr_eq`],
//! which is what [`EventEmitter::off`](crate::EventEmitter::off) matches on.

use std::fmt;
use std::sync::Arc;

/// Closure type behind a [`Listener`].
///
/// Returning `None` means "no value": it never overwrites a result already
/// produced by an earlier listener during the same emit.
pub type ListenerFn<A, R> = dyn Fn(&A) -> Option<R> + Send + Sync;

/// A registered (or registrable) event callback.
pub struct Listener<A, R = ()> {
    callback: Arc<ListenerFn<A, R>>,
}

impl<A: 'static, R: 'static> Listener<A, R> {
    /// Wrap a callback that may produce a value.
    pub fn new(callback: impl Fn(&A) -> Option<R> + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Wrap a callback that never produces a value.
    pub fn from_fn(callback: impl Fn(&A) + Send + Sync + 'static) -> Self {
        Self::new(move |args| {
            callback(args);
            None
        })
    }
}

impl<A, R> Listener<A, R> {
    /// Invoke the callback directly.
    pub fn call(&self, args: &A) -> Option<R> {
        (self.callback)(args)
    }

    /// True if both handles refer to the same underlying callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.callback), Arc::as_ptr(&other.callback))
    }
}

impl<A, R> Clone for Listener<A, R> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A, R> fmt::Debug for Listener<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("ptr", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}
