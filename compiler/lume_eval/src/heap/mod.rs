//! Node heap.
//!
//! Owns every value node and environment frame. Allocation hands out stable
//! ids; a node's content may be replaced any number of times while its id
//! stays the same. Nodes are only ever reclaimed by [`Heap::sweep`], driven
//! by the collector in `state::gc`.
//!
//! Fresh frames are zero-filled: every slot starts unbound. A fresh output
//! node starts as `Value::Blackhole` until its producer writes it.

mod arena;
mod env;

use rustc_hash::FxHashSet;

pub use arena::{ArenaFull, ArenaId, EnvId, ValueId};
pub use env::Env;

use arena::Arena;

use crate::errors::{out_of_memory, EvalError};
use crate::value::{Bindings, Value};

/// Allocation counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub live_values: usize,
    pub live_envs: usize,
    /// Values and frames allocated since the heap was created.
    pub total_allocations: u64,
    pub collections: u64,
}

/// Value and environment storage.
#[derive(Debug)]
pub struct Heap {
    values: Arena<Value, ValueId>,
    envs: Arena<Env, EnvId>,
    max_values: Option<usize>,
    total_allocations: u64,
    collections: u64,
}

impl Heap {
    /// Create a heap holding at most `max_values` live value nodes.
    pub fn new(max_values: Option<usize>) -> Self {
        Heap {
            values: Arena::new(),
            envs: Arena::new(),
            max_values,
            total_allocations: 0,
            collections: 0,
        }
    }

    // Values

    /// Allocate a node holding `initial`.
    pub fn alloc_value(&mut self, initial: Value) -> Result<ValueId, EvalError> {
        if self
            .max_values
            .is_some_and(|max| self.values.len() >= max)
        {
            tracing::debug!(live = self.values.len(), "value heap limit reached");
            return Err(out_of_memory());
        }
        let id = self.values.insert(initial).map_err(|ArenaFull| out_of_memory())?;
        self.total_allocations += 1;
        Ok(id)
    }

    /// Allocate an output node that has not been written yet.
    #[inline]
    pub fn alloc_pending(&mut self) -> Result<ValueId, EvalError> {
        self.alloc_value(Value::Blackhole)
    }

    /// Content of node `id`.
    ///
    /// # Panics
    /// Panics if `id` is stale or was never issued by this heap.
    #[inline]
    pub fn value(&self, id: ValueId) -> &Value {
        self.values
            .get(id)
            .unwrap_or_else(|| panic!("dangling value id {id:?}"))
    }

    #[inline]
    pub fn try_value(&self, id: ValueId) -> Option<&Value> {
        self.values.get(id)
    }

    /// Replace the content of node `id`, returning the previous content.
    ///
    /// Whatever the old payload referenced is released with it.
    pub fn replace_value(&mut self, id: ValueId, value: Value) -> Value {
        let slot = self
            .values
            .get_mut(id)
            .unwrap_or_else(|| panic!("dangling value id {id:?}"));
        std::mem::replace(slot, value)
    }

    #[inline]
    pub fn set_value(&mut self, id: ValueId, value: Value) {
        drop(self.replace_value(id, value));
    }

    #[inline]
    pub fn contains_value(&self, id: ValueId) -> bool {
        self.values.contains(id)
    }

    // Environments

    /// Allocate a frame of `size` unbound slots.
    pub fn alloc_env(&mut self, parent: Option<EnvId>, size: usize) -> Result<EnvId, EvalError> {
        self.insert_env(Env::new(parent, size))
    }

    /// Allocate a `with` frame whose dynamic scope is the set in `attrs`.
    pub fn alloc_with_env(&mut self, parent: EnvId, attrs: ValueId) -> Result<EnvId, EvalError> {
        self.insert_env(Env::with_scope(parent, attrs))
    }

    fn insert_env(&mut self, env: Env) -> Result<EnvId, EvalError> {
        let id = self.envs.insert(env).map_err(|ArenaFull| out_of_memory())?;
        self.total_allocations += 1;
        Ok(id)
    }

    /// # Panics
    /// Panics if `id` is stale.
    #[inline]
    pub fn env(&self, id: EnvId) -> &Env {
        self.envs
            .get(id)
            .unwrap_or_else(|| panic!("dangling environment id {id:?}"))
    }

    #[inline]
    pub fn contains_env(&self, id: EnvId) -> bool {
        self.envs.contains(id)
    }

    /// Bind slot `index` of a frame under construction.
    ///
    /// # Panics
    /// Panics if the slot is out of range or already bound.
    pub fn bind(&mut self, env: EnvId, index: usize, value: ValueId) {
        self.envs
            .get_mut(env)
            .unwrap_or_else(|| panic!("dangling environment id {env:?}"))
            .bind(index, value);
    }

    /// Resolve a statically addressed variable.
    ///
    /// # Panics
    /// Panics if `depth` exceeds the chain, `index` exceeds the frame, or the
    /// slot is unbound. The tree builder guarantees none of these happen.
    pub fn lookup(&self, env: EnvId, depth: usize, index: usize) -> ValueId {
        self.lookup_bound(env, depth, index)
            .unwrap_or_else(|| panic!("unbound slot {index} at depth {depth}"))
    }

    /// Like [`Heap::lookup`], but `None` for a slot not bound yet.
    pub fn lookup_bound(&self, env: EnvId, depth: usize, index: usize) -> Option<ValueId> {
        let mut frame = self.env(env);
        for _ in 0..depth {
            let parent = frame
                .parent()
                .unwrap_or_else(|| panic!("environment depth {depth} exceeds the chain"));
            frame = self.env(parent);
        }
        assert!(
            index < frame.size(),
            "slot {index} out of range (frame size {})",
            frame.size()
        );
        frame.slot(index)
    }

    /// Frames from `env` outward.
    pub fn chain(&self, env: EnvId) -> impl Iterator<Item = (EnvId, &Env)> + '_ {
        std::iter::successors(Some(env), |&id| self.env(id).parent()).map(|id| (id, self.env(id)))
    }

    /// Convenience: allocate an attribute set node.
    pub fn alloc_attrs(&mut self, bindings: Bindings) -> Result<ValueId, EvalError> {
        self.alloc_value(Value::attrs(bindings))
    }

    // Collection

    /// Free every node and frame not in the marked sets.
    ///
    /// Returns the number of values and frames freed.
    pub(crate) fn sweep(
        &mut self,
        marked_values: &FxHashSet<ValueId>,
        marked_envs: &FxHashSet<EnvId>,
    ) -> (usize, usize) {
        let mut freed_values = 0;
        for id in self.values.ids() {
            if !marked_values.contains(&id) && self.values.remove(id).is_some() {
                freed_values += 1;
            }
        }
        let mut freed_envs = 0;
        for id in self.envs.ids() {
            if !marked_envs.contains(&id) && self.envs.remove(id).is_some() {
                freed_envs += 1;
            }
        }
        self.collections += 1;
        (freed_values, freed_envs)
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            live_values: self.values.len(),
            live_envs: self.envs.len(),
            total_allocations: self.total_allocations,
            collections: self.collections,
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(None)
    }
}
