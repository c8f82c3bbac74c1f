//! Environment frames.
//!
//! A frame is a fixed-size array of value slots plus a link to the enclosing
//! frame. Variables resolved at tree-building time are addressed by
//! `(depth, index)`: walk `depth` parent links, then read slot `index`.
//!
//! A frame created for a `with` expression additionally carries the
//! (possibly unforced) attribute set that is searched when a name was not
//! resolved statically.

use super::{EnvId, ValueId};

/// One lexical frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Env {
    parent: Option<EnvId>,
    /// `None` until bound; a fresh frame has every slot unbound.
    slots: Box<[Option<ValueId>]>,
    dynamic_scope: Option<ValueId>,
}

impl Env {
    pub(crate) fn new(parent: Option<EnvId>, size: usize) -> Self {
        Env {
            parent,
            slots: vec![None; size].into_boxed_slice(),
            dynamic_scope: None,
        }
    }

    pub(crate) fn with_scope(parent: EnvId, attrs: ValueId) -> Self {
        Env {
            parent: Some(parent),
            slots: Box::default(),
            dynamic_scope: Some(attrs),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<EnvId> {
        self.parent
    }

    /// Number of slots in this frame.
    #[inline]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn slot(&self, index: usize) -> Option<ValueId> {
        self.slots.get(index).copied().flatten()
    }

    /// All slots, bound or not.
    pub fn slots(&self) -> &[Option<ValueId>] {
        &self.slots
    }

    /// The attribute set merged into lookup by a `with` frame.
    #[inline]
    pub fn dynamic_scope(&self) -> Option<ValueId> {
        self.dynamic_scope
    }

    /// Bind slot `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range or the slot is already bound.
    pub(crate) fn bind(&mut self, index: usize, value: ValueId) {
        let size = self.slots.len();
        let Some(slot) = self.slots.get_mut(index) else {
            panic!("environment slot {index} out of range (frame size {size})");
        };
        assert!(slot.is_none(), "environment slot {index} is already bound");
        *slot = Some(value);
    }
}
