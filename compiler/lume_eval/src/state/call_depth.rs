//! RAII call-depth guard.
//!
//! [`CallDepthGuard`] pushes a frame on creation and pops it when dropped,
//! on every exit path including `?` and unwinding. The guard holds
//! `&mut EvalState` and implements `Deref`/`DerefMut`, so the nested
//! evaluation runs through the guard itself.

use std::ops::{Deref, DerefMut};

use lume_ir::Span;

use super::EvalState;
use crate::diagnostics::{CallFrame, FrameLabel};
use crate::errors::EvalError;

/// Keeps one call-stack frame pushed while alive.
pub struct CallDepthGuard<'s> {
    state: &'s mut EvalState,
}

impl Drop for CallDepthGuard<'_> {
    fn drop(&mut self) {
        self.state.call_stack.pop();
    }
}

impl Deref for CallDepthGuard<'_> {
    type Target = EvalState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for CallDepthGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl CallDepthGuard<'_> {
    /// Attach the current backtrace to `err` while this frame is still live.
    pub fn attach_backtrace(&self, err: EvalError) -> EvalError {
        self.state
            .call_stack
            .attach_backtrace(err, &self.state.interner)
    }
}

impl EvalState {
    /// Enter a nested frame.
    ///
    /// Fails with `StackOverflow` at `span` when the stack is full, without
    /// changing the depth.
    pub fn call_depth_guard(
        &mut self,
        label: FrameLabel,
        span: Span,
    ) -> Result<CallDepthGuard<'_>, EvalError> {
        self.call_stack.push(CallFrame {
            label,
            call_span: (!span.is_dummy()).then_some(span),
        })?;
        Ok(CallDepthGuard { state: self })
    }

    /// Run `f` inside a nested frame.
    ///
    /// Errors raised inside get the backtrace at the innermost frame.
    pub fn with_frame<T>(
        &mut self,
        label: FrameLabel,
        span: Span,
        f: impl FnOnce(&mut EvalState) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        let mut guard = self.call_depth_guard(label, span)?;
        let result = f(&mut guard);
        result.map_err(|err| guard.attach_backtrace(err))
    }
}
