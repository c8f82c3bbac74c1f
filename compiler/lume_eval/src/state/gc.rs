//! Mark-and-sweep collection.
//!
//! Live nodes are everything reachable from the registered roots and the
//! base frame. Collection only runs at quiescent points: while a force, a
//! call or an evaluation is in progress, intermediate nodes are reachable
//! only from the native stack, so a request made then is skipped.

use rustc_hash::FxHashSet;

use super::EvalState;
use crate::heap::{EnvId, ValueId};

/// Outcome of one collection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub freed_values: usize,
    pub freed_envs: usize,
    pub live_values: usize,
    pub live_envs: usize,
}

impl EvalState {
    /// Collect unreachable nodes and frames.
    ///
    /// Returns `None` when evaluation is in progress.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn collect_garbage(&mut self) -> Option<CollectStats> {
        if self.active > 0 || !self.call_stack.is_empty() {
            tracing::debug!(
                active = self.active,
                depth = self.call_stack.depth(),
                "collection requested during evaluation, skipped"
            );
            return None;
        }

        let (values, envs) = self.mark();
        let (freed_values, freed_envs) = self.heap.sweep(&values, &envs);
        let stats = self.heap.stats();

        tracing::debug!(
            freed_values,
            freed_envs,
            live_values = stats.live_values,
            live_envs = stats.live_envs,
            "collection finished"
        );
        Some(CollectStats {
            freed_values,
            freed_envs,
            live_values: stats.live_values,
            live_envs: stats.live_envs,
        })
    }

    fn mark(&mut self) -> (FxHashSet<ValueId>, FxHashSet<EnvId>) {
        let mut values = FxHashSet::default();
        let mut envs = FxHashSet::default();
        let mut value_work: Vec<ValueId> = self.roots.live();
        let mut env_work: Vec<EnvId> = vec![self.base_env];

        while !value_work.is_empty() || !env_work.is_empty() {
            while let Some(v) = value_work.pop() {
                if !values.insert(v) {
                    continue;
                }
                if let Some(value) = self.heap.try_value(v) {
                    value.for_each_ref(|child| value_work.push(child), |env| env_work.push(env));
                }
            }
            while let Some(e) = env_work.pop() {
                if !envs.insert(e) || !self.heap.contains_env(e) {
                    continue;
                }
                let frame = self.heap.env(e);
                env_work.extend(frame.parent());
                value_work.extend(frame.slots().iter().flatten().copied());
                value_work.extend(frame.dynamic_scope());
            }
        }
        (values, envs)
    }
}
