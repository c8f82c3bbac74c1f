//! JSON rendering of values.
//!
//! Attribute keys come out sorted. Strings contribute their context to the
//! caller's accumulator, so a consumer of the JSON text knows what it
//! depends on.

use lume_ir::Span;
use serde_json::{Map, Number};

use crate::diagnostics::FrameLabel;
use crate::errors::{not_representable, EvalError};
use crate::heap::ValueId;
use crate::stack::ensure_sufficient_stack;
use crate::state::EvalState;
use crate::value::{StringContext, Value};

impl EvalState {
    /// Serialize `v` to JSON.
    ///
    /// With `strict`, nodes are forced as they are reached; otherwise an
    /// unforced node is an error. Sets with `__toString` or `outPath`
    /// serialize as their string coercion. Nested sets and lists each take
    /// a call-depth frame.
    pub fn to_json(
        &mut self,
        v: ValueId,
        strict: bool,
        context: &mut StringContext,
        span: Span,
    ) -> Result<serde_json::Value, EvalError> {
        if strict {
            self.force_value(v, span)?;
        }

        let value = self.value(v).clone();
        match value {
            Value::Int(n) => Ok(serde_json::Value::from(n)),
            Value::Float(x) => Number::from_f64(x)
                .map(serde_json::Value::Number)
                .ok_or_else(|| not_representable("a non-finite float", "JSON").with_span(span)),
            Value::Bool(b) => Ok(serde_json::Value::Bool(b)),
            Value::Null => Ok(serde_json::Value::Null),
            Value::String(s) => {
                context.merge(s.context());
                Ok(serde_json::Value::String(s.as_str().to_string()))
            }
            Value::Path(p) => Ok(serde_json::Value::String(p.to_string())),
            Value::Attrs(attrs) => {
                if attrs.contains(self.names.to_string) {
                    let s = self.coerce_to_string(v, span, context, false)?;
                    return Ok(serde_json::Value::String(s));
                }
                if let Some(attr) = attrs.get(self.names.out_path).copied() {
                    return self.with_frame(FrameLabel::Serialization, span, |state| {
                        ensure_sufficient_stack(|| state.to_json(attr.value, strict, context, attr.span))
                    });
                }

                let sorted: Vec<_> = attrs
                    .sorted(self.interner())
                    .into_iter()
                    .map(|(name, attr)| (name, *attr))
                    .collect();
                self.with_frame(FrameLabel::Serialization, span, |state| {
                    let mut object = Map::new();
                    for (name, attr) in sorted {
                        let json =
                            ensure_sufficient_stack(|| state.to_json(attr.value, strict, context, attr.span))
                                .map_err(|err| {
                                    err.with_context(attr.span, format!("while evaluating attribute '{name}'"))
                                })?;
                        object.insert(name.to_string(), json);
                    }
                    Ok(serde_json::Value::Object(object))
                })
            }
            Value::List(list) => self.with_frame(FrameLabel::Serialization, span, |state| {
                let mut array = Vec::with_capacity(list.len());
                for (index, item) in list.iter().enumerate() {
                    let json = ensure_sufficient_stack(|| state.to_json(item, strict, context, span))
                        .map_err(|err| {
                            err.with_context(span, format!("while evaluating list element at index {index}"))
                        })?;
                    array.push(json);
                }
                Ok(serde_json::Value::Array(array))
            }),
            Value::External(ext) => ext.to_json(strict, context).map_err(|err| err.or_span(span)),
            other => Err(not_representable(&other.show_type(), "JSON").with_span(span)),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
