//! String values and their context.
//!
//! A string's context is the set of provenance tags it carries. Contexts are
//! kept sorted so that every rendering of them is deterministic, and they are
//! merged whenever strings are combined.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Ordered set of provenance tags.
///
/// Cloning is cheap; the set is copied on the first write to a shared clone.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StringContext(Rc<BTreeSet<String>>);

impl StringContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        Rc::make_mut(&mut self.0).insert(tag.into());
    }

    /// Add every tag of `other`.
    pub fn merge(&mut self, other: &StringContext) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.0 = Rc::clone(&other.0);
            return;
        }
        let set = Rc::make_mut(&mut self.0);
        set.extend(other.0.iter().cloned());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for StringContext {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        StringContext(Rc::new(iter.into_iter().map(Into::into).collect()))
    }
}

impl fmt::Debug for StringContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// String payload plus context.
#[derive(Clone, PartialEq, Eq)]
pub struct StringValue {
    chars: Rc<str>,
    context: StringContext,
}

impl StringValue {
    pub fn new(chars: impl Into<Rc<str>>) -> Self {
        StringValue {
            chars: chars.into(),
            context: StringContext::default(),
        }
    }

    pub fn with_context(chars: impl Into<Rc<str>>, context: StringContext) -> Self {
        StringValue {
            chars: chars.into(),
            context,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.chars
    }

    #[inline]
    pub fn context(&self) -> &StringContext {
        &self.context
    }

    #[inline]
    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }
}

impl fmt::Debug for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{:?}", self.as_str())
        } else {
            write!(f, "{:?} {:?}", self.as_str(), self.context)
        }
    }
}
