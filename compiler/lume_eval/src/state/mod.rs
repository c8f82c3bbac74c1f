//! The evaluator.
//!
//! `EvalState` owns the heap, the call stack, the root registry and the
//! settings, and drives unevaluated nodes to normal form. The work is split
//! by concern:
//!
//! - `force`: thunk forcing, type-asserting coercions, deep forcing
//! - `call`: function application
//! - `call_depth`: the RAII call-depth guard
//! - `lookup`: `with` scope resolution
//! - `compare`, `coerce`: equality and string coercion
//! - `gc`: mark-and-sweep collection at quiescent points

mod builder;
mod call;
mod call_depth;
mod coerce;
mod compare;
mod force;
mod gc;
mod lookup;

use std::rc::Rc;

use lume_ir::{Name, SharedInterner, Span};

pub use builder::EvalStateBuilder;
pub use call_depth::CallDepthGuard;
pub use gc::CollectStats;

use crate::diagnostics::CallStack;
use crate::errors::{interrupted, EvalError};
use crate::expr::SharedExpr;
use crate::heap::{EnvId, Heap, ValueId};
use crate::interrupt::InterruptHandle;
use crate::roots::{RootHandle, RootRegistry};
use crate::settings::EvalSettings;
use crate::value::Value;

/// Names the evaluator itself looks up.
#[derive(Copy, Clone, Debug)]
pub(crate) struct WellKnownNames {
    pub(crate) functor: Name,
    pub(crate) to_string: Name,
    pub(crate) out_path: Name,
}

impl WellKnownNames {
    fn new(interner: &SharedInterner) -> Self {
        WellKnownNames {
            functor: interner.intern("__functor"),
            to_string: interner.intern("__toString"),
            out_path: interner.intern("outPath"),
        }
    }
}

/// Evaluator state.
pub struct EvalState {
    heap: Heap,
    interner: SharedInterner,
    settings: EvalSettings,
    call_stack: CallStack,
    roots: RootRegistry,
    interrupt: InterruptHandle,
    /// Root frame; slots are filled by the host via [`EvalState::bind_base`].
    base_env: EnvId,
    pub(crate) names: WellKnownNames,
    /// Forces, calls and evaluations in progress.
    active: usize,
}

impl EvalState {
    /// Evaluator with default interner and an empty base frame.
    pub fn new(settings: EvalSettings) -> Result<Self, EvalError> {
        EvalStateBuilder::new().settings(settings).build()
    }

    pub fn builder() -> EvalStateBuilder {
        EvalStateBuilder::new()
    }

    #[inline]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    #[inline]
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    #[inline]
    pub fn settings(&self) -> &EvalSettings {
        &self.settings
    }

    /// A handle the host can trigger to stop evaluation.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    #[inline]
    pub fn base_env(&self) -> EnvId {
        self.base_env
    }

    /// Bind slot `index` of the base frame.
    ///
    /// # Panics
    /// Panics if the slot is out of range or already bound.
    pub fn bind_base(&mut self, index: usize, value: ValueId) {
        let base = self.base_env;
        self.heap.bind(base, index, value);
    }

    /// Current depth of the call stack.
    #[inline]
    pub fn call_depth(&self) -> usize {
        self.call_stack.depth()
    }

    #[inline]
    pub fn alloc_value(&mut self, value: Value) -> Result<ValueId, EvalError> {
        self.heap.alloc_value(value)
    }

    /// Content of node `v`.
    #[inline]
    pub fn value(&self, v: ValueId) -> &Value {
        self.heap.value(v)
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Keep `v` alive across collections while the handle is held.
    pub fn register_root(&mut self, v: ValueId) -> RootHandle {
        self.roots.register(v)
    }

    /// Node for `expr` in `env`: the expression's shortcut if it has one,
    /// otherwise a new thunk.
    pub fn maybe_thunk(&mut self, expr: &SharedExpr, env: EnvId) -> Result<ValueId, EvalError> {
        if let Some(node) = expr.thunk_shortcut(self, env)? {
            return Ok(node);
        }
        self.heap.alloc_value(Value::Thunk {
            env,
            expr: Rc::clone(expr),
        })
    }

    /// Evaluate `expr` in `env` into a fresh node.
    #[tracing::instrument(level = "debug", skip_all, fields(span = ?expr.span()))]
    pub fn eval_expr(&mut self, expr: &SharedExpr, env: EnvId) -> Result<ValueId, EvalError> {
        let out = self.heap.alloc_pending()?;
        self.active += 1;
        let result = expr.eval(self, env, out);
        self.active -= 1;
        result.map(|()| out)
    }

    /// Fail with `Interrupted` if the host asked to stop.
    pub(crate) fn check_interrupt(&self, span: Span) -> Result<(), EvalError> {
        if self.interrupt.is_triggered() {
            tracing::debug!("interrupt observed");
            return Err(interrupted().with_span(span));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EvalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalState")
            .field("heap", &self.heap.stats())
            .field("settings", &self.settings)
            .field("call_depth", &self.call_stack.depth())
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
