//! Lume IR - positions and names shared across the evaluator.
//!
//! This crate contains the small, `Copy` data types every other Lume crate
//! passes around:
//! - [`Span`] for source positions attached to diagnostics
//! - [`Name`] for interned identifiers (attribute names, variables)
//! - [`StringInterner`] / [`SharedInterner`] for turning strings into `Name`s
//!
//! Expression trees are not defined here; the evaluator consumes them through
//! its `Expr` collaborator trait.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod name;
mod span;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::{Span, SpanError};
