//! Lume Eval - lazy evaluation core for the Lume language.
//!
//! This crate provides the value model and the machinery that drives
//! suspended computations to normal form.
//!
//! # Architecture
//!
//! - `heap`: generational arenas of value nodes and environment frames
//! - `value`: the tagged [`Value`] stored in each node
//! - `state`: [`EvalState`], which forces thunks, applies functions,
//!   guards call depth and collects garbage
//! - `expr`: the [`Expr`] collaborator trait and reference expression nodes
//! - `errors`: [`EvalError`] and its constructors
//!
//! Nodes are updated in place. Forcing a node writes its normal form into the
//! node itself, so every holder of the `ValueId` observes the result and the
//! work is done at most once.

pub mod diagnostics;
pub mod errors;
pub mod expr;
pub mod heap;
pub mod interrupt;
mod json;
mod print;
pub mod roots;
pub mod settings;
mod stack;
pub mod state;
pub mod value;

pub use diagnostics::{CallFrame, FrameLabel};
pub use errors::{EvalBacktrace, EvalError, EvalErrorKind, EvalNote};
pub use expr::{Expr, LambdaDef, SharedExpr};
pub use heap::{EnvId, Heap, HeapStats, ValueId};
pub use interrupt::InterruptHandle;
pub use print::ValuePrinter;
pub use roots::RootHandle;
pub use settings::{EvalSettings, EvalSettingsBuilder, SettingsError};
pub use state::{CallDepthGuard, CollectStats, EvalState, EvalStateBuilder};
pub use value::{
    Attr, Bindings, ExternalValue, List, NormalType, PrimOp, PrimOpFn, StringContext, StringValue,
    Value,
};

/// Result alias used by evaluator entry points.
pub type EvalResult<T = ()> = Result<T, EvalError>;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and only the first call has any
/// effect. Hosts with their own subscriber should not call this.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
