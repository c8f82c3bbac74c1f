//! String coercion.

use lume_ir::Span;

use super::EvalState;
use crate::diagnostics::FrameLabel;
use crate::errors::{not_coercible, EvalError};
use crate::heap::ValueId;
use crate::stack::ensure_sufficient_stack;
use crate::value::{StringContext, Value};

impl EvalState {
    /// Coerce `v` to a string, merging any context into `context`.
    ///
    /// Strings, paths, sets with `__toString` or `outPath` and externals
    /// always coerce. With `coerce_more`, so do integers, floats, booleans
    /// (`"1"` / `""`), null (`""`) and lists (elements joined by spaces).
    pub fn coerce_to_string(
        &mut self,
        v: ValueId,
        span: Span,
        context: &mut StringContext,
        coerce_more: bool,
    ) -> Result<String, EvalError> {
        self.force_value(v, span)?;

        let value = self.heap.value(v).clone();
        match value {
            Value::String(s) => {
                context.merge(s.context());
                Ok(s.as_str().to_string())
            }
            Value::Path(p) => Ok(p.to_string()),
            Value::Attrs(attrs) => {
                if let Some(to_string) = attrs.get(self.names.to_string).copied() {
                    return self.with_frame(FrameLabel::Coercion, span, |state| {
                        let result = state.heap.alloc_pending()?;
                        state.call_function(to_string.value, v, result, span)?;
                        ensure_sufficient_stack(|| {
                            state.coerce_to_string(result, span, context, coerce_more)
                        })
                    });
                }
                if let Some(out_path) = attrs.get(self.names.out_path).copied() {
                    return self.with_frame(FrameLabel::Coercion, span, |state| {
                        ensure_sufficient_stack(|| {
                            state.coerce_to_string(out_path.value, span, context, coerce_more)
                        })
                    });
                }
                Err(not_coercible("a set").with_span(span))
            }
            Value::External(ext) => ext
                .coerce_to_string(context, coerce_more)
                .map_err(|err| err.or_span(span)),
            Value::Int(n) if coerce_more => Ok(n.to_string()),
            Value::Float(x) if coerce_more => Ok(x.to_string()),
            Value::Bool(b) if coerce_more => Ok(String::from(if b { "1" } else { "" })),
            Value::Null if coerce_more => Ok(String::new()),
            Value::List(list) if coerce_more => self.with_frame(FrameLabel::Coercion, span, |state| {
                let mut buf = String::new();
                for (index, item) in list.iter().enumerate() {
                    let part = ensure_sufficient_stack(|| {
                        state.coerce_to_string(item, span, context, coerce_more)
                    })
                    .map_err(|err| {
                        err.with_context(
                            span,
                            format!("while evaluating one element of the list at index {index}"),
                        )
                    })?;
                    buf.push_str(&part);
                    // Empty nested lists do not get a separator.
                    let empty_list = state
                        .heap
                        .value(item)
                        .as_list()
                        .is_some_and(|inner| inner.is_empty());
                    if index + 1 < list.len() && !empty_list {
                        buf.push(' ');
                    }
                }
                Ok(buf)
            }),
            other => Err(not_coercible(&other.show_type()).with_span(span)),
        }
    }
}
