//! Dynamic (`with`) scope resolution.

use lume_ir::{Name, Span};

use super::EvalState;
use crate::diagnostics::FrameLabel;
use crate::errors::{undefined_variable, EvalError};
use crate::heap::{EnvId, ValueId};

impl EvalState {
    /// Find `name` in the `with` scopes enclosing `env`, innermost first.
    ///
    /// Each scope's attribute set is forced on the way, under a call-depth
    /// frame. Statically bound variables never come through here.
    pub fn lookup_with(&mut self, env: EnvId, name: Name, span: Span) -> Result<ValueId, EvalError> {
        let mut current = Some(env);
        while let Some(id) = current {
            let frame = self.heap.env(id);
            let (parent, scope) = (frame.parent(), frame.dynamic_scope());

            if let Some(scope) = scope {
                let attrs = self.with_frame(FrameLabel::DynamicScope, span, |state| {
                    state.force_attrs(
                        scope,
                        span,
                        "while evaluating the first subexpression of a with expression",
                    )
                })?;
                if let Some(attr) = attrs.get(name) {
                    return Ok(attr.value);
                }
            }
            current = parent;
        }
        Err(undefined_variable(self.interner.lookup(name)).with_span(span))
    }
}
