//! `EvalStateBuilder` for creating evaluators with various configurations.

use lume_ir::SharedInterner;

use super::{EvalState, WellKnownNames};
use crate::diagnostics::CallStack;
use crate::errors::EvalError;
use crate::heap::Heap;
use crate::interrupt::InterruptHandle;
use crate::roots::RootRegistry;
use crate::settings::EvalSettings;

/// Builder for [`EvalState`].
///
/// Hosts that build expression trees pass the interner they intern names
/// with, so `Var` and `Select` names resolve against the same table.
#[derive(Debug, Default)]
pub struct EvalStateBuilder {
    settings: Option<EvalSettings>,
    interner: Option<SharedInterner>,
    interrupt: Option<InterruptHandle>,
    base_env_size: usize,
}

impl EvalStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn settings(mut self, settings: EvalSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Share an existing interner.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Use a host-owned interrupt flag.
    #[must_use]
    pub fn interrupt(mut self, handle: InterruptHandle) -> Self {
        self.interrupt = Some(handle);
        self
    }

    /// Number of slots in the base frame (builtins, host bindings).
    #[must_use]
    pub fn base_env_size(mut self, size: usize) -> Self {
        self.base_env_size = size;
        self
    }

    pub fn build(self) -> Result<EvalState, EvalError> {
        let settings = self.settings.unwrap_or_default();
        let interner = self.interner.unwrap_or_default();
        let mut heap = Heap::new(settings.max_heap_values());
        let base_env = heap.alloc_env(None, self.base_env_size)?;
        let names = WellKnownNames::new(&interner);

        tracing::debug!(
            max_call_depth = settings.max_call_depth(),
            max_heap_values = ?settings.max_heap_values(),
            "evaluator created"
        );

        Ok(EvalState {
            heap,
            call_stack: CallStack::new(settings.max_call_depth()),
            interner,
            settings,
            roots: RootRegistry::new(),
            interrupt: self.interrupt.unwrap_or_default(),
            base_env,
            names,
            active: 0,
        })
    }
}
