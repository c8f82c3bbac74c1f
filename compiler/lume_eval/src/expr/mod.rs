//! Expression collaborator.
//!
//! The evaluator does not own a syntax tree. Anything implementing [`Expr`]
//! can be suspended in a thunk and evaluated on demand; the nodes in
//! [`nodes`] are a small reference set used by hosts that build trees
//! directly and by the crate's own tests.
//!
//! Expression nodes must not hold `ValueId`s or `EnvId`s: the collector does
//! not trace through them.

pub mod nodes;

use std::fmt;
use std::rc::Rc;

use lume_ir::{Name, Span};

use crate::errors::EvalError;
use crate::heap::{EnvId, ValueId};
use crate::state::EvalState;

/// An evaluable expression.
pub trait Expr: fmt::Debug {
    /// Evaluate in `env`, writing the result into `out`.
    ///
    /// On success `out` holds a value in normal form. On failure `out` may
    /// be left in any state; the caller owns recovery.
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError>;

    /// Source position, used for diagnostics.
    fn span(&self) -> Span;

    /// A node to use instead of allocating a thunk for this expression.
    ///
    /// Variables return the node already bound to them; literals allocate
    /// their value directly.
    fn thunk_shortcut(
        &self,
        state: &mut EvalState,
        env: EnvId,
    ) -> Result<Option<ValueId>, EvalError> {
        let _ = (state, env);
        Ok(None)
    }

    /// Evaluation performs no function application.
    fn is_trivial(&self) -> bool {
        false
    }
}

/// Shared handle to an expression node.
pub type SharedExpr = Rc<dyn Expr>;

/// A lambda's definition, shared by every closure created from it.
///
/// The call frame holds the plain argument (if named) in slot 0, followed
/// by the formals in declaration order.
#[derive(Debug)]
pub struct LambdaDef {
    /// Name the lambda was bound to, for diagnostics.
    pub name: Option<Name>,
    /// `x` in `x: body` or `{ ... }@x: body`.
    pub arg: Option<Name>,
    pub formals: Option<Formals>,
    pub body: SharedExpr,
    pub span: Span,
}

impl LambdaDef {
    /// Number of slots in the call frame.
    pub fn frame_size(&self) -> usize {
        usize::from(self.arg.is_some()) + self.formals.as_ref().map_or(0, |f| f.entries.len())
    }

    /// Slot of the first formal.
    #[inline]
    pub(crate) fn formals_offset(&self) -> usize {
        usize::from(self.arg.is_some())
    }
}

/// Destructured attribute-set parameter: `{ a, b ? 1, ... }`.
#[derive(Debug, Default)]
pub struct Formals {
    pub entries: Vec<Formal>,
    /// Whether attributes beyond `entries` are accepted.
    pub ellipsis: bool,
}

impl Formals {
    pub fn has(&self, name: Name) -> bool {
        self.entries.iter().any(|formal| formal.name == name)
    }
}

#[derive(Debug)]
pub struct Formal {
    pub name: Name,
    /// Evaluated in the call frame when the argument set lacks `name`.
    pub default: Option<SharedExpr>,
}
