//! Reference expression nodes.
//!
//! Variables are pre-resolved: a statically bound variable carries the
//! `(depth, index)` of its slot, and a variable that can only come from a
//! `with` scope is looked up by name at run time. `let`, recursive sets and
//! lambda calls allocate frames; `with` frames count as one level of depth.

use std::rc::Rc;

use lume_ir::{Name, Span};
use smallvec::SmallVec;

use super::{Expr, LambdaDef, SharedExpr};
use crate::errors::{missing_attribute, thrown, EvalError};
use crate::heap::{EnvId, ValueId};
use crate::state::EvalState;
use crate::value::{Bindings, List, StringContext, Value};

/// A constant scalar.
#[derive(Debug)]
pub struct Literal {
    value: Value,
    span: Span,
}

impl Literal {
    pub fn int(n: i64, span: Span) -> Self {
        Literal {
            value: Value::Int(n),
            span,
        }
    }

    pub fn float(x: f64, span: Span) -> Self {
        Literal {
            value: Value::Float(x),
            span,
        }
    }

    pub fn bool(b: bool, span: Span) -> Self {
        Literal {
            value: Value::Bool(b),
            span,
        }
    }

    pub fn null(span: Span) -> Self {
        Literal {
            value: Value::Null,
            span,
        }
    }

    pub fn string(s: &str, span: Span) -> Self {
        Literal {
            value: Value::string(s),
            span,
        }
    }

    pub fn path(p: &str, span: Span) -> Self {
        Literal {
            value: Value::path(p),
            span,
        }
    }
}

impl Expr for Literal {
    fn eval(&self, state: &mut EvalState, _env: EnvId, out: ValueId) -> Result<(), EvalError> {
        state.heap_mut().set_value(out, self.value.clone());
        Ok(())
    }

    fn span(&self) -> Span {
        self.span
    }

    fn thunk_shortcut(
        &self,
        state: &mut EvalState,
        _env: EnvId,
    ) -> Result<Option<ValueId>, EvalError> {
        state.alloc_value(self.value.clone()).map(Some)
    }

    fn is_trivial(&self) -> bool {
        true
    }
}

/// How a variable is found.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VarKind {
    /// Slot `index` of the frame `depth` links up.
    Static { depth: usize, index: usize },
    /// Searched in the enclosing `with` scopes.
    Dynamic,
}

#[derive(Debug)]
pub struct Var {
    pub name: Name,
    pub kind: VarKind,
    pub span: Span,
}

impl Var {
    pub fn resolved(name: Name, depth: usize, index: usize, span: Span) -> Self {
        Var {
            name,
            kind: VarKind::Static { depth, index },
            span,
        }
    }

    pub fn dynamic(name: Name, span: Span) -> Self {
        Var {
            name,
            kind: VarKind::Dynamic,
            span,
        }
    }

    fn resolve(&self, state: &mut EvalState, env: EnvId) -> Result<ValueId, EvalError> {
        match self.kind {
            VarKind::Static { depth, index } => Ok(state.heap().lookup(env, depth, index)),
            VarKind::Dynamic => state.lookup_with(env, self.name, self.span),
        }
    }
}

impl Expr for Var {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let node = self.resolve(state, env)?;
        state.force_value(node, self.span)?;
        let value = state.heap().value(node).clone();
        state.heap_mut().set_value(out, value);
        Ok(())
    }

    fn span(&self) -> Span {
        self.span
    }

    fn thunk_shortcut(
        &self,
        state: &mut EvalState,
        env: EnvId,
    ) -> Result<Option<ValueId>, EvalError> {
        // Dynamic lookups may force a `with` set, so they stay lazy.
        match self.kind {
            VarKind::Static { depth, index } => Ok(state.heap().lookup_bound(env, depth, index)),
            VarKind::Dynamic => Ok(None),
        }
    }
}

/// `let b0 = e0; b1 = e1; ... in body`; every binding sees every other.
#[derive(Debug)]
pub struct Let {
    pub bindings: Vec<SharedExpr>,
    pub body: SharedExpr,
    pub span: Span,
}

impl Expr for Let {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let frame = state.heap_mut().alloc_env(Some(env), self.bindings.len())?;
        for (index, binding) in self.bindings.iter().enumerate() {
            let node = state.maybe_thunk(binding, frame)?;
            state.heap_mut().bind(frame, index, node);
        }
        self.body.eval(state, frame, out)
    }

    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug)]
pub struct ListExpr {
    pub items: Vec<SharedExpr>,
    pub span: Span,
}

impl Expr for ListExpr {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let items = self
            .items
            .iter()
            .map(|item| state.maybe_thunk(item, env))
            .collect::<Result<Vec<_>, _>>()?;
        state.heap_mut().set_value(out, Value::List(List::from(items)));
        Ok(())
    }

    fn span(&self) -> Span {
        self.span
    }

    fn is_trivial(&self) -> bool {
        true
    }
}

/// One `name = value;` entry of an attribute set.
#[derive(Debug)]
pub struct AttrDef {
    pub name: Name,
    pub value: SharedExpr,
    pub span: Span,
}

/// `{ ... }` or `rec { ... }`.
///
/// A recursive set evaluates its values in a new frame whose slots hold the
/// attributes in declaration order.
#[derive(Debug)]
pub struct AttrsExpr {
    pub recursive: bool,
    pub attrs: Vec<AttrDef>,
    pub span: Span,
}

impl Expr for AttrsExpr {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let scope = if self.recursive {
            state.heap_mut().alloc_env(Some(env), self.attrs.len())?
        } else {
            env
        };
        let mut bindings = Bindings::with_capacity(self.attrs.len());
        for (index, attr) in self.attrs.iter().enumerate() {
            let node = state.maybe_thunk(&attr.value, scope)?;
            if self.recursive {
                state.heap_mut().bind(scope, index, node);
            }
            bindings.insert(attr.name, node, attr.span);
        }
        state.heap_mut().set_value(out, Value::attrs(bindings));
        Ok(())
    }

    fn span(&self) -> Span {
        self.span
    }

    fn is_trivial(&self) -> bool {
        !self.recursive
    }
}

/// `subject.name` or `subject.name or default`.
#[derive(Debug)]
pub struct Select {
    pub subject: SharedExpr,
    pub name: Name,
    pub default: Option<SharedExpr>,
    pub span: Span,
}

impl Expr for Select {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let subject = state.eval_expr(&self.subject, env)?;
        let found = state
            .heap()
            .value(subject)
            .as_attrs()
            .map(|attrs| attrs.get(self.name).copied());
        let found = match found {
            Some(found) => found,
            None if self.default.is_some() => None,
            None => {
                state.force_attrs(subject, self.span, "while selecting an attribute")?;
                None
            }
        };
        match (found, &self.default) {
            (Some(attr), _) => {
                state.force_value(attr.value, self.span).map_err(|err| {
                    let name = state.interner().lookup(self.name);
                    err.with_context(attr.span, format!("while evaluating the attribute '{name}'"))
                })?;
                let value = state.heap().value(attr.value).clone();
                state.heap_mut().set_value(out, value);
                Ok(())
            }
            (None, Some(default)) => default.eval(state, env, out),
            (None, None) => {
                let name = state.interner().lookup(self.name);
                Err(missing_attribute(name).with_span(self.span))
            }
        }
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// A lambda expression; evaluates to a closure over the current frame.
#[derive(Debug)]
pub struct LambdaExpr(pub Rc<LambdaDef>);

impl Expr for LambdaExpr {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        state.heap_mut().set_value(
            out,
            Value::Lambda {
                env,
                def: Rc::clone(&self.0),
            },
        );
        Ok(())
    }

    fn span(&self) -> Span {
        self.0.span
    }

    fn is_trivial(&self) -> bool {
        true
    }
}

/// `fun arg0 arg1 ...`
#[derive(Debug)]
pub struct Call {
    pub fun: SharedExpr,
    pub args: SmallVec<[SharedExpr; 4]>,
    pub span: Span,
}

impl Expr for Call {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let fun = state.eval_expr(&self.fun, env)?;
        let args = self
            .args
            .iter()
            .map(|arg| state.maybe_thunk(arg, env))
            .collect::<Result<SmallVec<[ValueId; 4]>, _>>()?;
        state.call_function_n(fun, &args, out, self.span)
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// `with attrs; body`
#[derive(Debug)]
pub struct With {
    pub attrs: SharedExpr,
    pub body: SharedExpr,
    pub span: Span,
}

impl Expr for With {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let attrs = state.maybe_thunk(&self.attrs, env)?;
        let scope = state.heap_mut().alloc_with_env(env, attrs)?;
        self.body.eval(state, scope, out)
    }

    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug)]
pub struct If {
    pub cond: SharedExpr,
    pub then: SharedExpr,
    pub otherwise: SharedExpr,
    pub span: Span,
}

impl Expr for If {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let cond = state.eval_expr(&self.cond, env)?;
        let cond = state.force_bool(cond, self.cond.span(), "while evaluating a branch condition")?;
        let branch = if cond {
            &self.then
        } else {
            &self.otherwise
        };
        branch.eval(state, env, out)
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// String interpolation / concatenation; contexts of all parts are merged.
#[derive(Debug)]
pub struct ConcatStrings {
    pub parts: Vec<SharedExpr>,
    pub span: Span,
}

impl Expr for ConcatStrings {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let mut context = StringContext::new();
        let mut buf = String::new();
        for part in &self.parts {
            let node = state.eval_expr(part, env)?;
            let s = state
                .coerce_to_string(node, part.span(), &mut context, false)
                .map_err(|err| err.with_context(self.span, "while evaluating a string interpolation"))?;
            buf.push_str(&s);
        }
        state
            .heap_mut()
            .set_value(out, Value::string_with_context(buf, context));
        Ok(())
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// `lhs == rhs` (or `!=` when `negate`).
#[derive(Debug)]
pub struct Equals {
    pub lhs: SharedExpr,
    pub rhs: SharedExpr,
    pub negate: bool,
    pub span: Span,
}

impl Expr for Equals {
    fn eval(&self, state: &mut EvalState, env: EnvId, out: ValueId) -> Result<(), EvalError> {
        let lhs = state.maybe_thunk(&self.lhs, env)?;
        let rhs = state.maybe_thunk(&self.rhs, env)?;
        let equal = state.values_equal(lhs, rhs, self.span)?;
        state.heap_mut().set_value(out, Value::Bool(equal != self.negate));
        Ok(())
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// `throw "message"`
#[derive(Debug)]
pub struct Throw {
    pub message: SharedExpr,
    pub span: Span,
}

impl Expr for Throw {
    fn eval(&self, state: &mut EvalState, env: EnvId, _out: ValueId) -> Result<(), EvalError> {
        let message = state.eval_expr(&self.message, env)?;
        let message = state.force_string(
            message,
            self.message.span(),
            "while evaluating the error message passed to builtins.throw",
        )?;
        Err(thrown(message.as_str()).with_span(self.span))
    }

    fn span(&self) -> Span {
        self.span
    }
}
