//! EventEmitter<A, R> — named, synchronous, reentrant pub/sub.
//!
//! Every event name owns a linked list of listeners. `emit` walks that list
//! lazily (see [`dispatch`](crate::dispatch)) and calls each listener inline:
//!   - A listener removed *during* emission is skipped if not yet reached.
//!   - A listener added *during* emission is reached if the walk has not
//!     passed the tail yet.
//!   - One-shot listeners fire exactly once, even under nested emits.
//!
//! Panics inside a listener propagate to the `emit` caller and stop the rest
//! of that emission. There is no error isolation between listeners.
//!
//! All methods take `&self`. The registry sits behind a `parking_lot::Mutex`
//! that is never held while listeners or lifecycle hooks run, or while removed
//! listeners are dropped, so all of them may call back into the emitter.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::dispatch::Listeners;
use crate::disposable::Disposable;
use crate::error::Result;
use crate::lifecycle::{EventLifecycle, NoopLifecycle};
use crate::list::{Graveyard, Node, NodeRef};
use crate::listener::Listener;
use crate::registry::Registry;
use crate::types::{EmitterOptions, WILDCARD};

// ============================================================================
// Shared state
// ============================================================================

pub(crate) struct Shared<A, R> {
    pub(crate) registry: Mutex<Registry<A, R>>,
    lifecycle: Arc<dyn EventLifecycle>,
    options: EmitterOptions,
}

impl<A, R> Shared<A, R> {
    fn handled(&self, event: &str) {
        debug!(label = self.options.label(), event, "event handled");
        self.lifecycle.on_event_handled(event);
    }

    pub(crate) fn unhandled(&self, event: &str) {
        debug!(label = self.options.label(), event, "event unhandled");
        self.lifecycle.on_event_unhandled(event);
    }
}

// ============================================================================
// EventEmitter
// ============================================================================

/// Synchronous event emitter keyed by event name.
///
/// `A` is the argument type passed to listeners, `R` the value they may
/// return. Which arguments a given name carries is a contract between the
/// caller and its listeners; use an enum for `A` when events differ.
pub struct EventEmitter<A, R = ()> {
    shared: Arc<Shared<A, R>>,
}

impl<A: 'static, R: 'static> EventEmitter<A, R> {
    /// Create an emitter with default options and no lifecycle hooks.
    pub fn new() -> Self {
        Self::from_parts(EmitterOptions::default(), Arc::new(NoopLifecycle))
    }

    /// Create an emitter that reports 0 ↔ 1 listener transitions to `lifecycle`.
    pub fn with_lifecycle(lifecycle: Arc<dyn EventLifecycle>) -> Self {
        Self::from_parts(EmitterOptions::default(), lifecycle)
    }

    pub fn builder() -> EmitterBuilder<A, R> {
        EmitterBuilder::new()
    }

    fn from_parts(options: EmitterOptions, lifecycle: Arc<dyn EventLifecycle>) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new()),
                lifecycle,
                options,
            }),
        }
    }

    pub fn options(&self) -> &EmitterOptions {
        &self.shared.options
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Add a recurring listener. Returns the handle to pass to [`off`](Self::off).
    pub fn on(&self, event: impl Into<String>, listener: Listener<A, R>) -> Listener<A, R> {
        self.register(event.into(), listener, false, None)
    }

    /// Add a one-time listener. It is removed right after its first call.
    pub fn one(&self, event: impl Into<String>, listener: Listener<A, R>) -> Listener<A, R> {
        self.register(event.into(), listener, true, None)
    }

    /// Like [`on`](Self::on), also pushing a [`Disposable`] for this
    /// registration into `disposables`.
    pub fn on_tracked(
        &self,
        event: impl Into<String>,
        listener: Listener<A, R>,
        disposables: &mut Vec<Disposable>,
    ) -> Listener<A, R> {
        self.register(event.into(), listener, false, Some(disposables))
    }

    /// Like [`one`](Self::one), also pushing a [`Disposable`].
    pub fn one_tracked(
        &self,
        event: impl Into<String>,
        listener: Listener<A, R>,
        disposables: &mut Vec<Disposable>,
    ) -> Listener<A, R> {
        self.register(event.into(), listener, true, Some(disposables))
    }

    /// Add many recurring listeners. `None` entries are skipped.
    pub fn on_many<K: Into<String>>(
        &self,
        entries: impl IntoIterator<Item = (K, Option<Listener<A, R>>)>,
    ) -> &Self {
        self.register_many(entries, false, None)
    }

    /// Add many one-time listeners. `None` entries are skipped.
    pub fn one_many<K: Into<String>>(
        &self,
        entries: impl IntoIterator<Item = (K, Option<Listener<A, R>>)>,
    ) -> &Self {
        self.register_many(entries, true, None)
    }

    /// Like [`on_many`](Self::on_many), pushing one [`Disposable`] per
    /// registered entry.
    pub fn on_many_tracked<K: Into<String>>(
        &self,
        entries: impl IntoIterator<Item = (K, Option<Listener<A, R>>)>,
        disposables: &mut Vec<Disposable>,
    ) -> &Self {
        self.register_many(entries, false, Some(disposables))
    }

    /// Like [`one_many`](Self::one_many), pushing one [`Disposable`] per
    /// registered entry.
    pub fn one_many_tracked<K: Into<String>>(
        &self,
        entries: impl IntoIterator<Item = (K, Option<Listener<A, R>>)>,
        disposables: &mut Vec<Disposable>,
    ) -> &Self {
        self.register_many(entries, true, Some(disposables))
    }

    /// Add `fallback` as a listener that only runs while it is the sole
    /// listener of `event`. Any other listener makes it inert without
    /// removing it. Returns the registered handle.
    pub fn unhandle(&self, event: impl Into<String>, fallback: Listener<A, R>) -> Listener<A, R> {
        let event = event.into();
        let guard = self.fallback_guard(&event, fallback);
        self.register(event, guard, false, None)
    }

    /// Like [`unhandle`](Self::unhandle), also pushing a [`Disposable`].
    pub fn unhandle_tracked(
        &self,
        event: impl Into<String>,
        fallback: Listener<A, R>,
        disposables: &mut Vec<Disposable>,
    ) -> Listener<A, R> {
        let event = event.into();
        let guard = self.fallback_guard(&event, fallback);
        self.register(event, guard, false, Some(disposables))
    }

    fn fallback_guard(&self, event: &str, fallback: Listener<A, R>) -> Listener<A, R> {
        let shared = Arc::downgrade(&self.shared);
        let key = event.to_owned();
        Listener::new(move |args: &A| {
            let sole = shared.upgrade().is_some_and(|s| {
                let registry = s.registry.lock();
                registry.get(&key).is_some_and(|l| l.is_single())
            });
            if sole {
                fallback.call(args)
            } else {
                None
            }
        })
    }

    fn register(
        &self,
        event: String,
        listener: Listener<A, R>,
        once: bool,
        disposables: Option<&mut Vec<Disposable>>,
    ) -> Listener<A, R> {
        let node = Node::new(listener.clone(), once);
        if let Some(disposables) = disposables {
            disposables.push(self.disposer(&event, &node));
        }
        let created = self
            .shared
            .registry
            .lock()
            .add(&event, node, &self.shared.options);
        if created {
            self.shared.handled(&event);
        }
        listener
    }

    fn register_many<K: Into<String>>(
        &self,
        entries: impl IntoIterator<Item = (K, Option<Listener<A, R>>)>,
        once: bool,
        mut disposables: Option<&mut Vec<Disposable>>,
    ) -> &Self {
        for (event, listener) in entries {
            let Some(listener) = listener else {
                continue;
            };
            self.register(event.into(), listener, once, disposables.as_deref_mut());
        }
        self
    }

    fn disposer(&self, event: &str, node: &NodeRef<A, R>) -> Disposable {
        let shared: Weak<Shared<A, R>> = Arc::downgrade(&self.shared);
        let node = Arc::downgrade(node);
        let event = event.to_owned();
        Disposable::new(move || {
            let (Some(shared), Some(node)) = (shared.upgrade(), node.upgrade()) else {
                return;
            };
            let mut dead = Graveyard::new();
            let emptied = shared.registry.lock().evict(&event, &node, None, &mut dead);
            drop(dead);
            if emptied {
                shared.unhandled(&event);
            }
        })
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove the first registration of `listener` under `event`.
    ///
    /// Does nothing if it is not registered (safe to call multiple times).
    /// [`WILDCARD`] is not matched against `listener`: it clears every event,
    /// like [`off_all`](Self::off_all).
    pub fn off(&self, event: &str, listener: &Listener<A, R>) -> &Self {
        self.remove(event, |node| node.listener.ptr_eq(listener), true)
    }

    /// Remove every registration of `listener` under `event`. [`WILDCARD`]
    /// clears every event, as with [`off`](Self::off).
    pub fn off_every(&self, event: &str, listener: &Listener<A, R>) -> &Self {
        self.remove(event, |node| node.listener.ptr_eq(listener), false)
    }

    /// Remove all listeners of `event`, or of every event for [`WILDCARD`].
    pub fn off_event(&self, event: &str) -> &Self {
        if event == WILDCARD {
            return self.off_all();
        }
        let detached = self.shared.registry.lock().take(event);
        if let Some(head) = detached {
            drop(head);
            self.shared.unhandled(event);
        }
        self
    }

    /// Remove all listeners of all events.
    pub fn off_all(&self) -> &Self {
        let detached = self.shared.registry.lock().take_all();
        for (event, head) in detached {
            drop(head);
            self.shared.unhandled(&event);
        }
        self
    }

    fn remove(&self, event: &str, filter: impl FnMut(&Node<A, R>) -> bool, first_only: bool) -> &Self {
        if event == WILDCARD {
            return self.off_all();
        }
        let mut dead = Graveyard::new();
        let emptied = self
            .shared
            .registry
            .lock()
            .remove(event, filter, first_only, &mut dead);
        drop(dead);
        if emptied {
            self.shared.unhandled(event);
        }
        self
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Call every listener of `event` with `args`, in registration order.
    ///
    /// Returns the last value produced; `None` results never overwrite an
    /// earlier one. Returns `None` when the event has no listeners.
    pub fn emit(&self, event: &str, args: &A) -> Option<R> {
        trace!(label = self.shared.options.label(), event, "emit");
        let mut result = None;
        for listener in self.listeners(event) {
            if let Some(value) = listener.call(args) {
                result = Some(value);
            }
        }
        result
    }

    /// Iterate over the listeners of `event` without calling them.
    ///
    /// The iterator applies the same bookkeeping as [`emit`](Self::emit):
    /// yielded one-shot listeners are removed.
    pub fn listeners<'a>(&'a self, event: &'a str) -> Listeners<'a, A, R> {
        Listeners::new(&self.shared, event)
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of listeners registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.shared.registry.lock().count(event)
    }

    /// Whether `event` has listeners. [`WILDCARD`] asks about any event.
    pub fn has(&self, event: &str) -> bool {
        if event == WILDCARD {
            return self.has_any();
        }
        self.shared.registry.lock().contains(event)
    }

    pub fn has_any(&self) -> bool {
        !self.shared.registry.lock().is_empty()
    }

    /// Names of all events that currently have listeners, in no set order.
    pub fn keys(&self) -> Vec<String> {
        self.shared.registry.lock().keys()
    }
}

impl<A: 'static, R: 'static> Default for EventEmitter<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static, R: 'static> fmt::Debug for EventEmitter<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("options", &self.shared.options)
            .field("events", &self.keys())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for an [`EventEmitter`] with options and lifecycle hooks.
pub struct EmitterBuilder<A, R> {
    options: EmitterOptions,
    lifecycle: Arc<dyn EventLifecycle>,
    _marker: PhantomData<fn(&A) -> Option<R>>,
}

impl<A: 'static, R: 'static> EmitterBuilder<A, R> {
    fn new() -> Self {
        Self {
            options: EmitterOptions::default(),
            lifecycle: Arc::new(NoopLifecycle),
            _marker: PhantomData,
        }
    }

    pub fn options(mut self, options: EmitterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.options.label = Some(label.into());
        self
    }

    pub fn max_listeners(mut self, max: usize) -> Self {
        self.options.max_listeners = Some(max);
        self
    }

    pub fn lifecycle(mut self, lifecycle: Arc<dyn EventLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Validate the options and build the emitter.
    pub fn build(self) -> Result<EventEmitter<A, R>> {
        self.options.validate()?;
        Ok(EventEmitter::from_parts(self.options, self.lifecycle))
    }
}
