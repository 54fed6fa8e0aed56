//! Host hooks for an event's 0 ↔ 1 listener transitions.
//!
//! A host implements [`EventLifecycle`] to react when an event gains its first
//! listener (e.g. start producing it lazily) or loses its last one. Hooks run
//! after the registry lock is released, so they may call back into the
//! emitter.

/// Lifecycle callbacks injected into an [`EventEmitter`](crate::EventEmitter).
///
/// Both methods default to no-ops.
pub trait EventLifecycle: Send + Sync {
    /// `event` went from no listeners to one.
    fn on_event_handled(&self, _event: &str) {}

    /// `event` went from one or more listeners to none.
    fn on_event_unhandled(&self, _event: &str) {}
}

/// The default lifecycle: ignores every transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLifecycle;

impl EventLifecycle for NoopLifecycle {}
