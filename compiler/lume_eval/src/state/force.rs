//! Forcing.
//!
//! A node moves through `Thunk | App` → `Blackhole` → forced. The only
//! backward step is `Blackhole` → `Thunk`, taken when the thunk's
//! expression fails: the node is restored so a later force can retry and
//! diagnostics can still see where it was defined. A node found in
//! `Blackhole` is being forced by an enclosing frame, so reaching it again
//! is a cycle.

use std::rc::Rc;

use lume_ir::Span;
use rustc_hash::FxHashSet;

use super::EvalState;
use crate::diagnostics::FrameLabel;
use crate::errors::{infinite_recursion, type_mismatch, EvalError};
use crate::heap::ValueId;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Bindings, List, NormalType, StringValue, Value};

impl EvalState {
    /// Drive `v` to normal form in place.
    ///
    /// Idempotent: forcing a forced node does nothing. `span` is attached to
    /// errors that do not carry a position yet.
    pub fn force_value(&mut self, v: ValueId, span: Span) -> Result<(), EvalError> {
        let (env, expr) = match self.heap.value(v) {
            Value::Thunk { env, expr } => (*env, Rc::clone(expr)),
            Value::App { left, right } => {
                let (left, right) = (*left, *right);
                return self.call_function(left, right, v, span);
            }
            Value::Blackhole => return Err(infinite_recursion().with_span(span)),
            _ => return Ok(()),
        };

        tracing::trace!(node = ?v, "forcing thunk");
        self.heap.set_value(v, Value::Blackhole);

        self.active += 1;
        let result = self
            .check_interrupt(span)
            .and_then(|()| ensure_sufficient_stack(|| expr.eval(self, env, v)));
        self.active -= 1;

        if let Err(err) = result {
            self.heap.set_value(v, Value::Thunk { env, expr });
            return Err(err.or_span(span));
        }
        debug_assert!(
            !self.heap.value(v).is_blackhole(),
            "expression at {:?} did not write its result",
            expr.span()
        );
        Ok(())
    }

    /// Type mismatch at `span`, rendering the offending value.
    #[cold]
    pub(super) fn type_error(&self, v: ValueId, expected: NormalType, span: Span, context: &str) -> EvalError {
        let value = self.heap.value(v);
        type_mismatch(expected, value.normal_type(), &self.print_value(v))
            .with_span(span)
            .with_context(span, context)
    }

    /// Force `v` and require an attribute set.
    ///
    /// On a mismatch the node stays forced to whatever it evaluated to.
    pub fn force_attrs(
        &mut self,
        v: ValueId,
        span: Span,
        context: &str,
    ) -> Result<Rc<Bindings>, EvalError> {
        self.force_value(v, span)?;
        match self.heap.value(v) {
            Value::Attrs(attrs) => Ok(Rc::clone(attrs)),
            _ => Err(self.type_error(v, NormalType::Attrs, span, context)),
        }
    }

    /// Force `v` and require a list.
    pub fn force_list(&mut self, v: ValueId, span: Span, context: &str) -> Result<List, EvalError> {
        self.force_value(v, span)?;
        match self.heap.value(v) {
            Value::List(list) => Ok(list.clone()),
            _ => Err(self.type_error(v, NormalType::List, span, context)),
        }
    }

    pub fn force_int(&mut self, v: ValueId, span: Span, context: &str) -> Result<i64, EvalError> {
        self.force_value(v, span)?;
        match self.heap.value(v) {
            Value::Int(n) => Ok(*n),
            _ => Err(self.type_error(v, NormalType::Int, span, context)),
        }
    }

    pub fn force_bool(&mut self, v: ValueId, span: Span, context: &str) -> Result<bool, EvalError> {
        self.force_value(v, span)?;
        match self.heap.value(v) {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.type_error(v, NormalType::Bool, span, context)),
        }
    }

    /// Force `v` and require a string; the context travels with it.
    pub fn force_string(
        &mut self,
        v: ValueId,
        span: Span,
        context: &str,
    ) -> Result<StringValue, EvalError> {
        self.force_value(v, span)?;
        match self.heap.value(v) {
            Value::String(s) => Ok(s.clone()),
            _ => Err(self.type_error(v, NormalType::String, span, context)),
        }
    }

    /// Force `v` and require something callable.
    ///
    /// Attribute sets with `__functor` are callable too.
    pub fn force_function(&mut self, v: ValueId, span: Span, context: &str) -> Result<(), EvalError> {
        self.force_value(v, span)?;
        let callable = match self.heap.value(v) {
            Value::Lambda { .. } | Value::PrimOp(_) | Value::PrimOpApp { .. } => true,
            Value::Attrs(attrs) => attrs.contains(self.names.functor),
            _ => false,
        };
        if callable {
            Ok(())
        } else {
            Err(self.type_error(v, NormalType::Function, span, context))
        }
    }

    /// Force `v` and everything reachable from it through attribute sets and
    /// lists. Each node is visited once, so cyclic values terminate.
    ///
    /// Attribute values are forced at their definition; list elements and
    /// `v` itself at `span`.
    pub fn force_value_deep(&mut self, v: ValueId, span: Span) -> Result<(), EvalError> {
        let mut seen = FxHashSet::default();
        self.force_deep(v, span, &mut seen)
    }

    fn force_deep(
        &mut self,
        v: ValueId,
        span: Span,
        seen: &mut FxHashSet<ValueId>,
    ) -> Result<(), EvalError> {
        if !seen.insert(v) {
            return Ok(());
        }
        self.force_value(v, span)?;

        match self.heap.value(v) {
            Value::Attrs(attrs) => {
                let attrs = Rc::clone(attrs);
                self.with_frame(FrameLabel::DeepForce, span, |state| {
                    let sorted: Vec<_> = attrs
                        .sorted(&state.interner)
                        .into_iter()
                        .map(|(name, attr)| (name, *attr))
                        .collect();
                    for (name, attr) in sorted {
                        let at = attr.span.or(span);
                        ensure_sufficient_stack(|| state.force_deep(attr.value, at, seen)).map_err(
                            |err| {
                                err.or_span(at).with_context(
                                    at,
                                    format!("while evaluating the attribute '{name}'"),
                                )
                            },
                        )?;
                    }
                    Ok(())
                })
            }
            Value::List(list) => {
                let list = list.clone();
                self.with_frame(FrameLabel::DeepForce, span, |state| {
                    for (index, item) in list.iter().enumerate() {
                        ensure_sufficient_stack(|| state.force_deep(item, span, seen)).map_err(
                            |err| {
                                err.or_span(span).with_context(
                                    span,
                                    format!("while evaluating list element at index {index}"),
                                )
                            },
                        )?;
                    }
                    Ok(())
                })
            }
            _ => Ok(()),
        }
    }
}
