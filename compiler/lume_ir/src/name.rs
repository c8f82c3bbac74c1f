//! Interned string identifier.

use std::fmt;

/// Interned string identifier.
///
/// A plain 32-bit index into the [`StringInterner`](crate::StringInterner)
/// that produced it. Equality and hashing are integer operations, which is
/// what attribute-set lookup relies on.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Name;
    crate::static_assert_size!(Name, 4);
}
