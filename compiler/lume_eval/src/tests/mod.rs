//! Evaluation scenarios and the tree-building helpers they share.
//!
//! Helpers build expression trees by hand with pre-resolved variables, the
//! way a host front end would.


use std::cell::Cell;
use std::rc::Rc;

use lume_ir::{Name, Span};
use smallvec::SmallVec;

use crate::errors::{thrown, EvalError};
use crate::expr::nodes::{AttrDef, AttrsExpr, Call, LambdaExpr, Let, ListExpr, Literal, Var};
use crate::expr::{Expr, Formals, LambdaDef, SharedExpr};
use crate::heap::{EnvId, ValueId};
use crate::settings::EvalSettings;
use crate::state::EvalState;
use crate::value::Value;

pub(crate) fn new_state() -> EvalState {
    crate::init_tracing();
    EvalState::builder().build().unwrap()
}

pub(crate) fn state_with(settings: EvalSettings) -> EvalState {
    crate::init_tracing();
    EvalState::builder().settings(settings).build().unwrap()
}

pub(crate) fn sp(start: u32, end: u32) -> Span {
    Span::new(start, end)
}

pub(crate) fn int(n: i64) -> SharedExpr {
    Rc::new(Literal::int(n, sp(1, 2)))
}

pub(crate) fn string(s: &str) -> SharedExpr {
    Rc::new(Literal::string(s, sp(1, 2)))
}

/// Statically resolved variable at `(depth, index)`.
pub(crate) fn var(depth: usize, index: usize) -> SharedExpr {
    Rc::new(Var::resolved(Name::EMPTY, depth, index, sp(3, 4)))
}

pub(crate) fn let_in(bindings: Vec<SharedExpr>, body: SharedExpr) -> SharedExpr {
    Rc::new(Let {
        bindings,
        body,
        span: sp(5, 6),
    })
}

pub(crate) fn list(items: Vec<SharedExpr>) -> SharedExpr {
    Rc::new(ListExpr {
        items,
        span: sp(7, 8),
    })
}

pub(crate) fn attrs(state: &EvalState, entries: Vec<(&str, SharedExpr)>) -> SharedExpr {
    Rc::new(AttrsExpr {
        recursive: false,
        attrs: entries
            .into_iter()
            .map(|(name, value)| AttrDef {
                name: state.intern(name),
                value,
                span: sp(9, 10),
            })
            .collect(),
        span: sp(9, 12),
    })
}

pub(crate) fn lambda(
    name: Option<Name>,
    arg: Option<Name>,
    formals: Option<Formals>,
    body: SharedExpr,
) -> Rc<LambdaDef> {
    Rc::new(LambdaDef {
        name,
        arg,
        formals,
        body,
        span: sp(20, 30),
    })
}

pub(crate) fn lambda_expr(def: Rc<LambdaDef>) -> SharedExpr {
    Rc::new(LambdaExpr(def))
}

pub(crate) fn call(fun: SharedExpr, args: Vec<SharedExpr>) -> SharedExpr {
    Rc::new(Call {
        fun,
        args: SmallVec::from_vec(args),
        span: sp(40, 50),
    })
}

/// A thunk over `expr` in the base frame.
pub(crate) fn thunk(state: &mut EvalState, expr: SharedExpr) -> ValueId {
    let env = state.base_env();
    state.alloc_value(Value::Thunk { env, expr }).unwrap()
}

/// Counts its evaluations; yields `value`, or throws while `fail` is set.
#[derive(Debug)]
pub(crate) struct Effect {
    pub runs: Rc<Cell<u32>>,
    pub fail: Rc<Cell<bool>>,
    pub value: i64,
}

impl Effect {
    pub(crate) fn new(value: i64) -> (Rc<Effect>, Rc<Cell<u32>>, Rc<Cell<bool>>) {
        let runs = Rc::new(Cell::new(0));
        let fail = Rc::new(Cell::new(false));
        let effect = Rc::new(Effect {
            runs: Rc::clone(&runs),
            fail: Rc::clone(&fail),
            value,
        });
        (effect, runs, fail)
    }
}

impl Expr for Effect {
    fn eval(&self, state: &mut EvalState, _env: EnvId, out: ValueId) -> Result<(), EvalError> {
        self.runs.set(self.runs.get() + 1);
        if self.fail.get() {
            return Err(thrown("effect failed").with_span(self.span()));
        }
        state.heap_mut().set_value(out, Value::Int(self.value));
        Ok(())
    }

    fn span(&self) -> Span {
        sp(60, 61)
    }
}
