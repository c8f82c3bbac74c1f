//! Native stack growth for deep forcing.
//!
//! Forcing a thunk recurses through `Expr::eval`, which may force further
//! thunks. The call-depth guard bounds that recursion logically; this keeps
//! the OS stack from running out first on long but legal chains.

/// Run `f`, growing the native stack first if less than the red zone remains.
///
/// On WASM targets `stacker` is unavailable and `f` runs directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (128KB red zone).
    const RED_ZONE: usize = 128 * 1024;

    /// Stack space to allocate when growing (1MB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
