//! Synchronous, reentrant event emitter.
//!
//! # Quick start
//! ```
//! use ee::{EventEmitter, Listener};
//!
//! let ee: EventEmitter<i32, i32> = EventEmitter::new();
//! let double = ee.on("num", Listener::new(|n: &i32| Some(n * 2)));
//! ee.one("num", Listener::from_fn(|_: &i32| {}));
//!
//! assert_eq!(ee.emit("num", &21), Some(42));
//! assert_eq!(ee.count("num"), 1);
//!
//! ee.off("num", &double);
//! assert!(!ee.has("num"));
//! ```
//!
//! # Modules
//!
//! - [`emitter`] — [`EventEmitter`] and its builder.
//! - [`dispatch`] — the [`Listeners`] traversal used by `emit`.
//! - [`listener`] — [`Listener`] callback handles.
//! - [`lifecycle`] — [`EventLifecycle`] hooks for 0 ↔ 1 listener transitions.

pub mod dispatch;
pub mod disposable;
pub mod emitter;
pub mod error;
pub mod lifecycle;
pub mod listener;
pub mod types;

mod list;
mod registry;

pub use dispatch::Listeners;
pub use disposable::Disposable;
pub use emitter::{EmitterBuilder, EventEmitter};
pub use error::{EmitterError, Result};
pub use lifecycle::{EventLifecycle, NoopLifecycle};
pub use listener::{Listener, ListenerFn};
pub use types::{EmitterOptions, WILDCARD};
