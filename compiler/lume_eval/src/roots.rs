//! Root registry.
//!
//! A root pins a value node that is referenced from outside the heap, so the
//! collector treats it as live. The registry keeps only weak references:
//! the holder's [`RootHandle`] is the owner, and dropping the last clone of
//! it releases the pin.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::heap::ValueId;

struct RootSlot {
    value: ValueId,
}

/// Keeps a value alive across collections while held.
#[derive(Clone)]
pub struct RootHandle(Rc<RootSlot>);

impl RootHandle {
    /// The pinned node.
    #[inline]
    pub fn value(&self) -> ValueId {
        self.0.value
    }
}

impl fmt::Debug for RootHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootHandle({:?})", self.0.value)
    }
}

/// Table of registered roots.
#[derive(Default)]
pub struct RootRegistry {
    entries: Vec<Weak<RootSlot>>,
}

impl RootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `value` until every clone of the returned handle is dropped.
    pub fn register(&mut self, value: ValueId) -> RootHandle {
        let slot = Rc::new(RootSlot { value });
        self.entries.push(Rc::downgrade(&slot));
        RootHandle(slot)
    }

    /// Nodes pinned by live handles. Released entries are pruned.
    pub fn live(&mut self) -> Vec<ValueId> {
        self.entries.retain(|entry| entry.strong_count() > 0);
        self.entries
            .iter()
            .filter_map(Weak::upgrade)
            .map(|slot| slot.value)
            .collect()
    }

    /// Number of live roots.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RootRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootRegistry")
            .field("live", &self.len())
            .finish()
    }
}
