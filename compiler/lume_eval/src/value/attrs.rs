//! Attribute sets.

use std::fmt;

use lume_ir::{Name, Span, StringInterner};
use rustc_hash::FxHashMap;

use crate::heap::ValueId;

/// One attribute: the value node and where it was defined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub value: ValueId,
    pub span: Span,
}

/// Mapping from attribute name to value node.
///
/// Lookup is by interned name. Iteration order of the map is unspecified;
/// [`Bindings::sorted`] gives the order used for every rendering.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    map: FxHashMap<Name, Attr>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Bindings {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, name: Name, value: ValueId, span: Span) {
        self.map.insert(name, Attr { value, span });
    }

    #[inline]
    pub fn get(&self, name: Name) -> Option<&Attr> {
        self.map.get(&name)
    }

    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        self.map.contains_key(&name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Attributes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Name, &Attr)> + '_ {
        self.map.iter().map(|(&name, attr)| (name, attr))
    }

    /// Attributes sorted by the text of their names.
    pub fn sorted<'a>(&'a self, interner: &StringInterner) -> Vec<(&'static str, &'a Attr)> {
        let mut attrs: Vec<_> = self
            .map
            .iter()
            .map(|(&name, attr)| (interner.lookup(name), attr))
            .collect();
        attrs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        attrs
    }
}

impl FromIterator<(Name, Attr)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (Name, Attr)>>(iter: T) -> Self {
        Bindings {
            map: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.map.iter().map(|(name, attr)| (name, attr.value)))
            .finish()
    }
}
