//! Two-tier inline/external storage for list values.
//!
//! Lists of one or two elements live directly in the value node; empty lists
//! and lists of three or more share a reference-counted slice. Callers never
//! see the difference: `len`, `get` and `iter` behave identically for both.

use std::fmt;
use std::rc::Rc;

use crate::heap::ValueId;

/// Maximum number of items stored inline.
pub const INLINE_CAPACITY: usize = 2;

/// Ordered sequence of value references.
#[derive(Clone)]
pub enum List {
    /// 1-2 items stored in the node.
    ///
    /// Items beyond `count` are `ValueId::INVALID`.
    Inline {
        count: u8,
        items: [ValueId; INLINE_CAPACITY],
    },

    /// 0 or 3+ items stored out of line.
    External(Rc<[ValueId]>),
}

impl List {
    /// Build a list, choosing the storage by length.
    pub fn from_items(items: &[ValueId]) -> Self {
        match *items {
            [only] => List::single(only),
            [first, second] => List::pair(first, second),
            _ => List::External(Rc::from(items)),
        }
    }

    pub fn empty() -> Self {
        List::External(Rc::from([]))
    }

    #[inline]
    pub const fn single(item: ValueId) -> Self {
        List::Inline {
            count: 1,
            items: [item, ValueId::INVALID],
        }
    }

    #[inline]
    pub const fn pair(first: ValueId, second: ValueId) -> Self {
        List::Inline {
            count: 2,
            items: [first, second],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<ValueId> {
        self.as_slice().get(index).copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ValueId> + ExactSizeIterator + '_ {
        self.as_slice().iter().copied()
    }

    /// The valid elements, whatever the backing storage.
    #[inline]
    pub fn as_slice(&self) -> &[ValueId] {
        match self {
            List::Inline { count, items } => &items[..usize::from(*count)],
            List::External(items) => items,
        }
    }

    /// Whether the elements are stored in the node itself.
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self, List::Inline { .. })
    }
}

impl From<Vec<ValueId>> for List {
    fn from(items: Vec<ValueId>) -> Self {
        if items.len() <= INLINE_CAPACITY && !items.is_empty() {
            List::from_items(&items)
        } else {
            List::External(Rc::from(items))
        }
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
