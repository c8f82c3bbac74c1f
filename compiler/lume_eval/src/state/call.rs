//! Function application.
//!
//! `call_function` forces the function operand and writes the result of the
//! application into the output node:
//!
//! - lambda: new frame under a call-depth guard, arguments bound, body
//!   evaluated into the output
//! - builtin: arguments accumulate in `PrimOpApp` nodes until the arity is
//!   reached, then the native function runs
//! - attribute set with `__functor`: `set.__functor set arg`

use std::rc::Rc;

use lume_ir::Span;
use smallvec::SmallVec;

use super::EvalState;
use crate::diagnostics::FrameLabel;
use crate::errors::{missing_argument, type_mismatch, unexpected_argument, EvalError};
use crate::expr::LambdaDef;
use crate::heap::{EnvId, ValueId};
use crate::value::{NormalType, PrimOp, Value};

impl EvalState {
    /// Apply `fun` to `arg`, writing the result into `out`.
    #[tracing::instrument(level = "debug", skip_all, fields(depth = self.call_stack.depth()))]
    pub fn call_function(
        &mut self,
        fun: ValueId,
        arg: ValueId,
        out: ValueId,
        span: Span,
    ) -> Result<(), EvalError> {
        self.active += 1;
        let result = self.apply(fun, arg, out, span);
        self.active -= 1;
        result
    }

    /// Apply `fun` to each of `args` in turn, writing the final result into
    /// `out`. With no arguments `out` receives the forced `fun`.
    pub fn call_function_n(
        &mut self,
        fun: ValueId,
        args: &[ValueId],
        out: ValueId,
        span: Span,
    ) -> Result<(), EvalError> {
        let Some((&last, init)) = args.split_last() else {
            self.force_value(fun, span)?;
            let value = self.heap.value(fun).clone();
            self.heap.set_value(out, value);
            return Ok(());
        };
        let mut current = fun;
        for &arg in init {
            let partial = self.heap.alloc_pending()?;
            self.call_function(current, arg, partial, span)?;
            current = partial;
        }
        self.call_function(current, last, out, span)
    }

    fn apply(&mut self, fun: ValueId, arg: ValueId, out: ValueId, span: Span) -> Result<(), EvalError> {
        self.force_value(fun, span)?;
        let functor = self
            .heap
            .value(fun)
            .as_attrs()
            .and_then(|attrs| attrs.get(self.names.functor))
            .map(|attr| attr.value);
        if let Some(functor) = functor {
            return self.call_functor(functor, fun, arg, out, span);
        }

        match self.heap.value(fun) {
            Value::Lambda { env, def } => {
                let (env, def) = (*env, Rc::clone(def));
                self.call_lambda(env, &def, arg, out, span)
            }
            Value::PrimOp(op) => {
                let op = Rc::clone(op);
                if op.arity <= 1 {
                    (op.fun)(self, &[arg], span, out)
                } else {
                    self.heap
                        .set_value(out, Value::PrimOpApp { left: fun, right: arg });
                    Ok(())
                }
            }
            Value::PrimOpApp { .. } => self.apply_primop_app(fun, arg, out, span),
            other => {
                let actual = other.normal_type();
                Err(type_mismatch(NormalType::Function, actual, &self.print_value(fun))
                    .with_span(span)
                    .with_context(span, "while calling a function"))
            }
        }
    }

    /// `set.__functor set arg`.
    fn call_functor(
        &mut self,
        functor: ValueId,
        set: ValueId,
        arg: ValueId,
        out: ValueId,
        span: Span,
    ) -> Result<(), EvalError> {
        self.call_function_n(functor, &[set, arg], out, span)
            .map_err(|err| {
                err.with_context(
                    span,
                    "while calling a functor (an attribute set with a '__functor' attribute)",
                )
            })
    }

    /// Extend a partial builtin application by `arg`.
    fn apply_primop_app(
        &mut self,
        fun: ValueId,
        arg: ValueId,
        out: ValueId,
        span: Span,
    ) -> Result<(), EvalError> {
        // Walk the chain back to the builtin, collecting arguments last-first.
        let mut args: SmallVec<[ValueId; 4]> = SmallVec::new();
        args.push(arg);
        let mut node = fun;
        let op: Rc<PrimOp> = loop {
            match self.heap.value(node) {
                Value::PrimOpApp { left, right } => {
                    args.push(*right);
                    node = *left;
                }
                Value::PrimOp(op) => break Rc::clone(op),
                _ => {
                    return Err(self.type_error(
                        node,
                        NormalType::Function,
                        span,
                        "while applying a partially applied builtin",
                    ))
                }
            }
        };
        args.reverse();

        if args.len() < op.arity {
            self.heap
                .set_value(out, Value::PrimOpApp { left: fun, right: arg });
            return Ok(());
        }
        tracing::trace!(primop = op.name, "calling builtin");
        (op.fun)(self, &args, span, out)
    }

    fn call_lambda(
        &mut self,
        env: EnvId,
        def: &Rc<LambdaDef>,
        arg: ValueId,
        out: ValueId,
        span: Span,
    ) -> Result<(), EvalError> {
        self.with_frame(FrameLabel::Lambda(def.name), span, |state| {
            let frame = state.heap.alloc_env(Some(env), def.frame_size())?;
            state.bind_arguments(def, frame, arg, span)?;
            def.body.eval(state, frame, out)
        })
        .map_err(|err| {
            if err.is_fatal() {
                return err;
            }
            let context = match def.name {
                Some(name) => format!("while calling '{}'", self.interner.lookup(name)),
                None => "while calling anonymous lambda".to_string(),
            };
            err.with_context(def.span, context)
        })
    }

    /// Fill a lambda's frame: the plain argument, then the formals.
    fn bind_arguments(
        &mut self,
        def: &LambdaDef,
        frame: EnvId,
        arg: ValueId,
        span: Span,
    ) -> Result<(), EvalError> {
        let Some(formals) = &def.formals else {
            self.heap.bind(frame, 0, arg);
            return Ok(());
        };

        let attrs = self.force_attrs(
            arg,
            span,
            "while evaluating the value passed for the lambda argument",
        )?;
        if def.arg.is_some() {
            self.heap.bind(frame, 0, arg);
        }

        let offset = def.formals_offset();
        let mut used = 0;
        for (index, formal) in formals.entries.iter().enumerate() {
            let node = match (attrs.get(formal.name), &formal.default) {
                (Some(attr), _) => {
                    used += 1;
                    attr.value
                }
                (None, Some(default)) => self.maybe_thunk(default, frame)?,
                (None, None) => {
                    return Err(missing_argument(
                        &self.lambda_name(def),
                        self.interner.lookup(formal.name),
                    )
                    .with_span(span));
                }
            };
            self.heap.bind(frame, offset + index, node);
        }

        if !formals.ellipsis && used != attrs.len() {
            let mut extra: Vec<&str> = attrs
                .iter()
                .filter(|(name, _)| !formals.has(*name))
                .map(|(name, _)| self.interner.lookup(name))
                .collect();
            extra.sort_unstable();
            if let Some(first) = extra.first() {
                return Err(unexpected_argument(&self.lambda_name(def), first).with_span(span));
            }
        }
        Ok(())
    }

    fn lambda_name(&self, def: &LambdaDef) -> String {
        def.name.map_or_else(
            || "anonymous lambda".to_string(),
            |name| self.interner.lookup(name).to_string(),
        )
    }
}
