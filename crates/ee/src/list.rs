//! ListenerList — the per-event singly-linked chain of listener entries.
//!
//! Nodes are reference counted. The list owns the chain through `first` and
//! each node's `next`; `last` is a weak back-reference used only for O(1)
//! append. A dispatch traversal holds its own `Arc` to the node it is parked
//! on, so a node unlinked mid-traversal stays alive (with its `next` link
//! intact) until the traversal moves past it.
//!
//! Invariant: a node's `removed` flag is clear iff the node is reachable from
//! the `first` of the list currently registered for its event. Every mutation
//! here runs under the registry lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::listener::Listener;

pub(crate) type NodeRef<A, R> = Arc<Node<A, R>>;

// ============================================================================
// Node
// ============================================================================

/// One registered listener.
pub(crate) struct Node<A, R> {
    pub(crate) listener: Listener<A, R>,
    pub(crate) once: bool,
    /// Set when a traversal yields a one-shot node.
    claimed: AtomicBool,
    removed: AtomicBool,
    next: Mutex<Option<NodeRef<A, R>>>,
}

impl<A, R> Node<A, R> {
    pub(crate) fn new(listener: Listener<A, R>, once: bool) -> NodeRef<A, R> {
        Arc::new(Self {
            listener,
            once,
            claimed: AtomicBool::new(false),
            removed: AtomicBool::new(false),
            next: Mutex::new(None),
        })
    }

    pub(crate) fn next(&self) -> Option<NodeRef<A, R>> {
        self.next.lock().clone()
    }

    fn set_next(&self, next: Option<NodeRef<A, R>>) {
        *self.next.lock() = next;
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    fn mark_removed(&self) {
        self.removed.store(true, Ordering::Release);
    }

    /// Take the single firing of a one-shot node. Returns `false` if another
    /// traversal already took it.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    /// True if this node is still linked and directly followed by `node`.
    fn precedes(&self, node: &NodeRef<A, R>) -> bool {
        !self.is_removed() && self.next().is_some_and(|n| Arc::ptr_eq(&n, node))
    }
}

impl<A, R> Drop for Node<A, R> {
    // Unwind the chain iteratively so long lists don't overflow the stack.
    fn drop(&mut self) {
        let mut next = self.next.get_mut().take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.next.get_mut().take(),
                Err(_) => break,
            }
        }
    }
}

// ============================================================================
// ListenerList
// ============================================================================

/// Outcome of removing entries from a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unlinked {
    /// Entries were removed (possibly zero) and the list is still non-empty.
    Kept(usize),
    /// The last entry was removed; the caller must drop the list.
    Emptied,
}

/// Nodes unlinked under the registry lock.
///
/// Dropping a node can drop the last handle to its listener, and with it any
/// state the callback captured. That state may call back into the emitter, so
/// callers release the lock before letting this go.
pub(crate) type Graveyard<A, R> = Vec<NodeRef<A, R>>;

pub(crate) struct ListenerList<A, R> {
    first: NodeRef<A, R>,
    last: Weak<Node<A, R>>,
    len: usize,
    /// Whether the listener-leak warning already fired for this list.
    pub(crate) warned: bool,
}

impl<A, R> ListenerList<A, R> {
    pub(crate) fn new(node: NodeRef<A, R>) -> Self {
        Self {
            last: Arc::downgrade(&node),
            first: node,
            len: 1,
            warned: false,
        }
    }

    pub(crate) fn first(&self) -> &NodeRef<A, R> {
        &self.first
    }

    /// Append `node` after the current tail.
    pub(crate) fn append(&mut self, node: NodeRef<A, R>) {
        let tail = self.tail();
        self.last = Arc::downgrade(&node);
        tail.set_next(Some(node));
        self.len += 1;
        self.debug_check();
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// True if the head has no successor.
    pub(crate) fn is_single(&self) -> bool {
        self.first.next().is_none()
    }

    /// Walk the linked entries in order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = NodeRef<A, R>> {
        std::iter::successors(Some(Arc::clone(&self.first)), |node| node.next())
    }

    /// Remove entries matching `filter`, stopping after the first match when
    /// `first_only` is set. Removed nodes keep their `next` link and are moved
    /// into `dead`.
    pub(crate) fn unlink(
        &mut self,
        mut filter: impl FnMut(&Node<A, R>) -> bool,
        first_only: bool,
        dead: &mut Graveyard<A, R>,
    ) -> Unlinked {
        let mut removed = 0;
        let mut prev: Option<NodeRef<A, R>> = None;
        let mut curr = Some(Arc::clone(&self.first));

        while let Some(node) = curr {
            let next = node.next();
            if !filter(&*node) {
                prev = Some(node);
                curr = next;
                continue;
            }

            node.mark_removed();
            dead.push(node);
            removed += 1;
            match (&prev, &next) {
                // Splice it.
                (Some(prev), _) => prev.set_next(next.clone()),
                // Shift it.
                (None, Some(next)) => self.first = Arc::clone(next),
                // Nothing remains.
                (None, None) => {
                    self.len = 0;
                    return Unlinked::Emptied;
                }
            }
            if first_only {
                if next.is_none() {
                    if let Some(prev) = &prev {
                        self.last = Arc::downgrade(prev);
                    }
                }
                self.len -= removed;
                self.debug_check();
                return Unlinked::Kept(removed);
            }
            curr = next;
        }

        // Ran off the end: `prev` is the surviving tail.
        if let Some(prev) = &prev {
            self.last = Arc::downgrade(prev);
        }
        self.len -= removed;
        self.debug_check();
        Unlinked::Kept(removed)
    }

    /// Remove one specific linked node. `prev` is a hint for an O(1) splice;
    /// a stale hint falls back to a scan.
    pub(crate) fn evict(
        &mut self,
        node: &NodeRef<A, R>,
        prev: Option<&NodeRef<A, R>>,
        dead: &mut Graveyard<A, R>,
    ) -> Unlinked {
        if let Some(prev) = prev.filter(|p| p.precedes(node)) {
            node.mark_removed();
            dead.push(Arc::clone(node));
            let next = node.next();
            if next.is_none() {
                self.last = Arc::downgrade(prev);
            }
            prev.set_next(next);
            self.len -= 1;
            self.debug_check();
            return Unlinked::Kept(1);
        }
        self.unlink(|n| std::ptr::eq(n, Arc::as_ptr(node)), true, dead)
    }

    /// Point `last` at `tail` if it really is the end of this chain.
    pub(crate) fn fix_last(&mut self, tail: &NodeRef<A, R>) {
        if !tail.is_removed() && tail.next().is_none() {
            self.last = Arc::downgrade(tail);
        }
    }

    /// Tombstone every entry. Called when the whole list leaves the registry;
    /// returns the head, which owns the rest of the chain.
    pub(crate) fn detach(self) -> NodeRef<A, R> {
        for node in self.iter() {
            node.mark_removed();
        }
        self.first
    }

    fn tail(&self) -> NodeRef<A, R> {
        match self.last.upgrade() {
            Some(tail) if !tail.is_removed() => tail,
            _ => self
                .iter()
                .last()
                .unwrap_or_else(|| Arc::clone(&self.first)),
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            self.last
                .upgrade()
                .is_some_and(|tail| !tail.is_removed() && tail.next().is_none()),
            "ListenerList::last must be the live tail"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
