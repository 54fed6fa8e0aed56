//! Listeners — the lazy dispatch traversal behind `emit`.
//!
//! The registry lock is held only inside [`Iterator::next`], never while the
//! consumer runs a yielded callback. Between two calls the callback may add,
//! remove or emit anything on the same emitter, so each step re-reads the
//! parked node rather than a `next` link captured before the yield:
//!
//!   - a node unlinked by someone else keeps its `next`, and unlinked nodes
//!     are skipped while advancing, so nothing not yet reached is visited
//!     after removal and nothing is visited twice;
//!   - a yielded one-shot node is claimed before the yield and evicted after
//!     it, so a nested emit of the same event cannot fire it again.
//!
//! Every node reference the traversal lets go of while locked goes into a
//! [`Graveyard`] that is dropped after the guard.

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::emitter::Shared;
use crate::list::{Graveyard, NodeRef};
use crate::listener::Listener;
use crate::registry::Registry;

enum Cursor<A, R> {
    Start,
    /// The node last handed to the consumer, not yet settled.
    Yielded(NodeRef<A, R>),
    Done,
}

/// Single-pass iterator over the listeners of one event, in registration
/// order. Returned by [`EventEmitter::listeners`](crate::EventEmitter::listeners).
///
/// Dropping it part-way settles the last yielded entry (a one-shot entry
/// counts as fired).
pub struct Listeners<'a, A, R> {
    shared: &'a Shared<A, R>,
    event: &'a str,
    cursor: Cursor<A, R>,
    /// Last visited node that is still linked; splice hint for evictions.
    prev: Option<NodeRef<A, R>>,
}

impl<'a, A, R> Listeners<'a, A, R> {
    pub(crate) fn new(shared: &'a Shared<A, R>, event: &'a str) -> Self {
        Self {
            shared,
            event,
            cursor: Cursor::Start,
            prev: None,
        }
    }

    /// Post-yield step for `node`. Returns `true` if evicting it removed the
    /// event.
    fn settle(
        &mut self,
        registry: &mut Registry<A, R>,
        node: &NodeRef<A, R>,
        dead: &mut Graveyard<A, R>,
    ) -> bool {
        if node.is_removed() {
            return false;
        }
        if node.once {
            return registry.evict(self.event, node, self.prev.as_ref(), dead);
        }
        self.park_prev(node, dead);
        false
    }

    fn park_prev(&mut self, node: &NodeRef<A, R>, dead: &mut Graveyard<A, R>) {
        if let Some(old) = self.prev.replace(Arc::clone(node)) {
            dead.push(old);
        }
    }

    /// Move to the first yieldable node at or after `candidate`.
    fn advance(
        &mut self,
        registry: &mut Registry<A, R>,
        mut candidate: Option<NodeRef<A, R>>,
        dead: &mut Graveyard<A, R>,
    ) -> Option<Listener<A, R>> {
        while let Some(node) = candidate {
            if node.is_removed() {
                candidate = node.next();
                dead.push(node);
                continue;
            }
            if node.once && !node.claim() {
                // Fired by an enclosing traversal, which will evict it.
                self.park_prev(&node, dead);
                candidate = node.next();
                dead.push(node);
                continue;
            }
            let listener = node.listener.clone();
            self.cursor = Cursor::Yielded(node);
            return Some(listener);
        }

        if let (Some(tail), Some(list)) = (&self.prev, registry.get_mut(self.event)) {
            list.fix_last(tail);
        }
        self.cursor = Cursor::Done;
        None
    }
}

impl<A, R> Iterator for Listeners<'_, A, R> {
    type Item = Listener<A, R>;

    fn next(&mut self) -> Option<Self::Item> {
        let shared = self.shared;
        let mut dead = Graveyard::new();
        let mut emptied = false;
        let item = {
            let mut registry = shared.registry.lock();
            let candidate = match std::mem::replace(&mut self.cursor, Cursor::Done) {
                Cursor::Start => registry.get(self.event).map(|list| Arc::clone(list.first())),
                Cursor::Yielded(node) => {
                    emptied = self.settle(&mut registry, &node, &mut dead);
                    let next = if emptied { None } else { node.next() };
                    dead.push(node);
                    next
                }
                Cursor::Done => return None,
            };
            self.advance(&mut registry, candidate, &mut dead)
        };
        drop(dead);
        if emptied {
            shared.unhandled(self.event);
        }
        item
    }
}

impl<A, R> FusedIterator for Listeners<'_, A, R> {}

impl<A, R> Drop for Listeners<'_, A, R> {
    fn drop(&mut self) {
        let Cursor::Yielded(node) = std::mem::replace(&mut self.cursor, Cursor::Done) else {
            return;
        };
        let shared = self.shared;
        let mut dead = Graveyard::new();
        let emptied = {
            let mut registry = shared.registry.lock();
            self.settle(&mut registry, &node, &mut dead)
        };
        drop(node);
        drop(dead);
        if emptied {
            shared.unhandled(self.event);
        }
    }
}
