//! Cooperative cancellation.
//!
//! The host keeps a clone of the evaluator's [`InterruptHandle`] and may
//! trigger it from any thread. The evaluator polls it at the top of every
//! thunk force and fails with `Interrupted`; the usual restore-on-failure
//! rule leaves no node blackholed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared interrupt flag.
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that evaluation stop at the next safe point.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Reset the flag before starting a new evaluation.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
