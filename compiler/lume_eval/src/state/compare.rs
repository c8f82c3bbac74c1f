//! Structural equality.

use std::rc::Rc;

use lume_ir::Span;

use super::EvalState;
use crate::diagnostics::FrameLabel;
use crate::errors::EvalError;
use crate::heap::ValueId;
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

impl EvalState {
    /// Compare two values, forcing as deep as needed.
    ///
    /// Integers and floats compare numerically across kinds. String context
    /// is ignored. Functions never compare equal. Each level of list or set
    /// nesting takes a call-depth frame, so cyclic values end in
    /// `StackOverflow`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "int/float comparison is defined on the float value"
    )]
    pub fn values_equal(&mut self, a: ValueId, b: ValueId, span: Span) -> Result<bool, EvalError> {
        self.force_value(a, span)?;
        self.force_value(b, span)?;

        let (lhs, rhs) = (self.heap.value(a).clone(), self.heap.value(b).clone());
        match (&lhs, &rhs) {
            (Value::Int(x), Value::Int(y)) => Ok(x == y),
            (Value::Int(x), Value::Float(y)) => Ok((*x as f64) == *y),
            (Value::Float(x), Value::Int(y)) => Ok(*x == (*y as f64)),
            (Value::Float(x), Value::Float(y)) => Ok(x == y),
            (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
            (Value::Null, Value::Null) => Ok(true),
            (Value::String(x), Value::String(y)) => Ok(x.as_str() == y.as_str()),
            (Value::Path(x), Value::Path(y)) => Ok(x == y),
            (Value::List(x), Value::List(y)) => {
                if x.len() != y.len() {
                    return Ok(false);
                }
                self.with_frame(FrameLabel::Comparison, span, |state| {
                    for (l, r) in x.iter().zip(y.iter()) {
                        if !ensure_sufficient_stack(|| state.values_equal(l, r, span))? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                })
            }
            (Value::Attrs(x), Value::Attrs(y)) => {
                if Rc::ptr_eq(x, y) {
                    return Ok(true);
                }
                if x.len() != y.len() {
                    return Ok(false);
                }
                self.with_frame(FrameLabel::Comparison, span, |state| {
                    for (name, attr) in x.iter() {
                        let Some(other) = y.get(name) else {
                            return Ok(false);
                        };
                        if !ensure_sufficient_stack(|| state.values_equal(attr.value, other.value, span))? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                })
            }
            (Value::External(x), Value::External(y)) => Ok(x.equals(y.as_ref())),
            _ => Ok(false),
        }
    }
}
