//! Builtin functions.

use std::fmt;

use lume_ir::Span;

use crate::errors::EvalError;
use crate::heap::ValueId;
use crate::state::EvalState;

/// Native implementation of a builtin.
///
/// Receives exactly `arity` unforced argument nodes and writes its result
/// into the output node.
pub type PrimOpFn = fn(&mut EvalState, &[ValueId], Span, ValueId) -> Result<(), EvalError>;

/// A builtin function of fixed arity.
pub struct PrimOp {
    pub name: &'static str,
    pub arity: usize,
    pub fun: PrimOpFn,
}

impl PrimOp {
    pub const fn new(name: &'static str, arity: usize, fun: PrimOpFn) -> Self {
        PrimOp { name, arity, fun }
    }
}

impl fmt::Debug for PrimOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimOp")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
