//! Registry — event name → [`ListenerList`].
//!
//! A name is present only while its list holds at least one entry. Methods
//! report 0 ↔ 1 transitions to the caller instead of firing lifecycle hooks
//! themselves, and hand removed nodes back in a [`Graveyard`]: hooks run and
//! nodes are dropped only after the registry lock is released.

use std::collections::HashMap;

use tracing::warn;

use crate::list::{Graveyard, ListenerList, Node, NodeRef, Unlinked};
use crate::types::EmitterOptions;

pub(crate) struct Registry<A, R> {
    lists: HashMap<String, ListenerList<A, R>>,
}

impl<A, R> Registry<A, R> {
    pub(crate) fn new() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, event: &str) -> Option<&ListenerList<A, R>> {
        self.lists.get(event)
    }

    pub(crate) fn get_mut(&mut self, event: &str) -> Option<&mut ListenerList<A, R>> {
        self.lists.get_mut(event)
    }

    /// Append `node` to `event`'s list. Returns `true` if the list was created.
    pub(crate) fn add(&mut self, event: &str, node: NodeRef<A, R>, options: &EmitterOptions) -> bool {
        let Some(list) = self.lists.get_mut(event) else {
            self.lists.insert(event.to_owned(), ListenerList::new(node));
            return true;
        };
        list.append(node);

        if let Some(max) = options.max_listeners {
            if !list.warned {
                let count = list.len();
                if count > max {
                    list.warned = true;
                    warn!(
                        label = options.label(),
                        event,
                        count,
                        max,
                        "possible listener leak: event exceeds max_listeners"
                    );
                }
            }
        }
        false
    }

    /// Remove entries of `event` matching `filter`. Returns `true` if this
    /// removed the event entirely.
    pub(crate) fn remove(
        &mut self,
        event: &str,
        filter: impl FnMut(&Node<A, R>) -> bool,
        first_only: bool,
        dead: &mut Graveyard<A, R>,
    ) -> bool {
        let Some(list) = self.lists.get_mut(event) else {
            return false;
        };
        let outcome = list.unlink(filter, first_only, dead);
        self.drop_if_emptied(event, outcome)
    }

    /// Remove one specific node. Returns `true` if this removed the event
    /// entirely. A node that is already unlinked is left alone.
    pub(crate) fn evict(
        &mut self,
        event: &str,
        node: &NodeRef<A, R>,
        prev: Option<&NodeRef<A, R>>,
        dead: &mut Graveyard<A, R>,
    ) -> bool {
        if node.is_removed() {
            return false;
        }
        let Some(list) = self.lists.get_mut(event) else {
            return false;
        };
        let outcome = list.evict(node, prev, dead);
        self.drop_if_emptied(event, outcome)
    }

    /// Remove `event`'s whole list, returning its detached head if it existed.
    pub(crate) fn take(&mut self, event: &str) -> Option<NodeRef<A, R>> {
        self.lists.remove(event).map(ListenerList::detach)
    }

    /// Remove every list, returning each name with its detached head.
    pub(crate) fn take_all(&mut self) -> Vec<(String, NodeRef<A, R>)> {
        self.lists
            .drain()
            .map(|(event, list)| (event, list.detach()))
            .collect()
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.lists.get(event).map_or(0, ListenerList::len)
    }

    pub(crate) fn contains(&self, event: &str) -> bool {
        self.lists.contains_key(event)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.lists.keys().cloned().collect()
    }

    fn drop_if_emptied(&mut self, event: &str, outcome: Unlinked) -> bool {
        match outcome {
            Unlinked::Emptied => {
                self.lists.remove(event);
                true
            }
            Unlinked::Kept(_) => false,
        }
    }
}
