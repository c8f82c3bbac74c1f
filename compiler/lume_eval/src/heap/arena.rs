//! Generational slot arena.
//!
//! Ids are `(index, generation)` pairs. Removing an entry bumps the slot's
//! generation and puts the index on a free list, so an id held past its
//! entry's collection no longer resolves.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Id types handed out by an [`Arena`].
pub trait ArenaId: Copy {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(self) -> usize;
    fn generation(self) -> u32;
}

macro_rules! define_arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            /// Placeholder that never resolves to a live entry.
            pub const INVALID: $name = $name {
                index: u32::MAX,
                generation: u32::MAX,
            };

            /// Get the raw slot index.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.index
            }

            /// Generation of the slot this id was issued for.
            #[inline]
            pub const fn generation(self) -> u32 {
                self.generation
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.index != u32::MAX
            }
        }

        impl ArenaId for $name {
            #[inline]
            fn from_parts(index: u32, generation: u32) -> Self {
                $name { index, generation }
            }

            #[inline]
            fn index(self) -> usize {
                self.index as usize
            }

            #[inline]
            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl Hash for $name {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                (u64::from(self.index) << 32 | u64::from(self.generation)).hash(state);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "({}v{})"), self.index, self.generation)
                } else {
                    write!(f, concat!($prefix, "::INVALID"))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_arena_id!(
    /// Stable handle to a value node.
    ///
    /// Every alias of a node holds the same `ValueId`; forcing replaces the
    /// node's contents behind it.
    ValueId,
    "ValueId"
);

define_arena_id!(
    /// Stable handle to an environment frame.
    EnvId,
    "EnvId"
);

/// The arena's backing storage could not grow.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArenaFull;

struct Slot<T> {
    generation: u32,
    entry: Option<T>,
}

/// Slot storage with a free list.
pub struct Arena<T, I> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    _id: PhantomData<fn() -> I>,
}

impl<T, I: ArenaId> Arena<T, I> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            _id: PhantomData,
        }
    }

    /// Store `value`, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: T) -> Result<I, ArenaFull> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.entry.is_none(), "free list pointed at a live slot");
            slot.entry = Some(value);
            self.live += 1;
            return Ok(I::from_parts(index, slot.generation));
        }

        // u32::MAX is reserved for the INVALID id.
        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|&index| index != u32::MAX)
            .ok_or(ArenaFull)?;
        self.slots.try_reserve(1).map_err(|_| ArenaFull)?;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(value),
        });
        self.live += 1;
        Ok(I::from_parts(index, 0))
    }

    #[inline]
    pub fn get(&self, id: I) -> Option<&T> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entry.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entry.as_mut())
    }

    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Remove the entry behind `id`, invalidating every copy of the id.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        // A slot whose generation wrapped could alias an ancient id; retire it.
        if slot.generation != 0 {
            if let Ok(index) = u32::try_from(id.index()) {
                self.free.push(index);
            }
        }
        Some(value)
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Ids of all live entries, in slot order.
    pub fn ids(&self) -> Vec<I> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.entry.is_some())
            .filter_map(|(index, slot)| {
                u32::try_from(index)
                    .ok()
                    .map(|index| I::from_parts(index, slot.generation))
            })
            .collect()
    }
}

impl<T, I: ArenaId> Default for Arena<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, I> fmt::Debug for Arena<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("slots", &self.slots.len())
            .field("live", &self.live)
            .field("free", &self.free.len())
            .finish()
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{EnvId, ValueId};
    lume_ir::static_assert_size!(ValueId, 8);
    lume_ir::static_assert_size!(EnvId, 8);
}
