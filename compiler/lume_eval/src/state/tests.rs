use std::rc::Rc;

use lume_ir::Span;
use pretty_assertions::assert_eq;

use super::*;
use crate::diagnostics::FrameLabel;
use crate::errors::EvalErrorKind;
use crate::expr::nodes::{Literal, Var, With};
use crate::settings::EvalSettings;
use crate::tests::{attrs, int, lambda, list, new_state, sp, state_with, string, thunk, var};
use crate::value::{Bindings, NormalType, StringContext};

#[test]
fn builder_defaults() {
    let state = new_state();
    assert_eq!(state.settings().max_call_depth(), 10_000);
    assert_eq!(state.call_depth(), 0);
    let stats = state.heap().stats();
    assert_eq!(stats.live_values, 0);
    assert_eq!(stats.live_envs, 1);
}

#[test]
fn base_frame_bindings_resolve() {
    let mut state = EvalState::builder().base_env_size(2).build().unwrap();
    let v = state.alloc_value(Value::Int(7)).unwrap();
    state.bind_base(1, v);

    let out = state.eval_expr(&var(0, 1), state.base_env()).unwrap();
    assert_eq!(state.value(out).as_int(), Some(7));
}

#[test]
fn maybe_thunk_shortcuts() {
    let mut state = EvalState::builder().base_env_size(1).build().unwrap();
    let bound = state.alloc_value(Value::Int(1)).unwrap();
    state.bind_base(0, bound);
    let env = state.base_env();

    let literal = state.maybe_thunk(&int(5), env).unwrap();
    assert_eq!(state.value(literal).as_int(), Some(5));

    let variable = state.maybe_thunk(&var(0, 0), env).unwrap();
    assert_eq!(variable, bound);

    let suspended = state.maybe_thunk(&list(vec![int(1)]), env).unwrap();
    assert!(state.value(suspended).is_thunk());
}

#[test]
fn forcing_a_forced_node_is_a_no_op() {
    let mut state = new_state();
    let v = state.alloc_value(Value::string("a")).unwrap();
    state.force_value(v, Span::DUMMY).unwrap();
    assert_eq!(state.value(v).as_string().map(|s| s.as_str()), Some("a"));
}

#[test]
fn forced_thunk_is_written_in_place() {
    let mut state = new_state();
    let t = thunk(&mut state, int(3));
    state.force_value(t, Span::DUMMY).unwrap();
    assert_eq!(state.value(t).as_int(), Some(3));
}

#[test]
fn type_error_renders_value_and_context() {
    let mut state = new_state();
    let t = thunk(&mut state, string("a"));
    let err = state
        .force_int(t, sp(1, 5), "while evaluating the index")
        .unwrap_err();

    assert_eq!(
        err.kind,
        EvalErrorKind::TypeError {
            expected: NormalType::Int,
            actual: NormalType::String
        }
    );
    assert_eq!(err.message, "expected an integer but found a string: \"a\"");
    assert_eq!(err.span, Some(sp(1, 5)));
    assert_eq!(err.context(), Some("while evaluating the index"));
}

#[test]
fn force_function_accepts_functors() {
    let mut state = new_state();
    let f = state.alloc_value(Value::Null).unwrap();
    let mut bindings = Bindings::new();
    bindings.insert(state.intern("__functor"), f, Span::DUMMY);
    let set = state.alloc_value(Value::attrs(bindings)).unwrap();
    assert!(state.force_function(set, Span::DUMMY, "").is_ok());

    let plain = state.alloc_value(Value::attrs(Bindings::new())).unwrap();
    let err = state.force_function(plain, Span::DUMMY, "").unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::TypeError {
            expected: NormalType::Function,
            actual: NormalType::Attrs
        }
    ));
}

#[test]
fn numbers_compare_across_kinds() {
    let mut state = new_state();
    let one = state.alloc_value(Value::Int(1)).unwrap();
    let one_f = state.alloc_value(Value::Float(1.0)).unwrap();
    let two_f = state.alloc_value(Value::Float(2.0)).unwrap();
    assert!(state.values_equal(one, one_f, Span::DUMMY).unwrap());
    assert!(!state.values_equal(one, two_f, Span::DUMMY).unwrap());
}

#[test]
fn string_equality_ignores_context() {
    let mut state = new_state();
    let context: StringContext = ["drv"].into_iter().collect();
    let a = state
        .alloc_value(Value::string_with_context("x", context))
        .unwrap();
    let b = state.alloc_value(Value::string("x")).unwrap();
    assert!(state.values_equal(a, b, Span::DUMMY).unwrap());
}

#[test]
fn structural_equality_forces_elements() {
    let mut state = new_state();
    let lhs = thunk(&mut state, list(vec![int(1), int(2), int(3)]));
    let rhs = thunk(&mut state, list(vec![int(1), int(2), int(3)]));
    let shorter = thunk(&mut state, list(vec![int(1), int(2)]));
    assert!(state.values_equal(lhs, rhs, Span::DUMMY).unwrap());
    assert!(!state.values_equal(lhs, shorter, Span::DUMMY).unwrap());

    let a = attrs(&state, vec![("a", int(1)), ("b", string("x"))]);
    let b = attrs(&state, vec![("b", string("x")), ("a", int(1))]);
    let (a, b) = (thunk(&mut state, a), thunk(&mut state, b));
    assert!(state.values_equal(a, b, Span::DUMMY).unwrap());
}

#[test]
fn functions_never_compare_equal() {
    let mut state = new_state();
    let def = lambda(None, Some(state.intern("x")), None, int(0));
    let env = state.base_env();
    let f = state.alloc_value(Value::Lambda { env, def }).unwrap();
    assert!(!state.values_equal(f, f, Span::DUMMY).unwrap());
}

#[test]
fn coerce_more_scalars() {
    let mut state = new_state();
    let mut context = StringContext::new();
    let cases = [
        (Value::Int(42), "42"),
        (Value::Bool(true), "1"),
        (Value::Bool(false), ""),
        (Value::Null, ""),
    ];
    for (value, expected) in cases {
        let v = state.alloc_value(value).unwrap();
        let s = state
            .coerce_to_string(v, Span::DUMMY, &mut context, true)
            .unwrap();
        assert_eq!(s, expected);
    }
}

#[test]
fn booleans_need_coerce_more() {
    let mut state = new_state();
    let mut context = StringContext::new();
    let v = state.alloc_value(Value::Bool(true)).unwrap();
    let err = state
        .coerce_to_string(v, sp(2, 3), &mut context, false)
        .unwrap_err();
    assert_eq!(err.message, "cannot coerce a Boolean to a string");
    assert_eq!(err.span, Some(sp(2, 3)));
}

#[test]
fn lists_coerce_with_spaces() {
    let mut state = new_state();
    let mut context = StringContext::new();
    let v = thunk(&mut state, list(vec![int(1), list(vec![]), int(2)]));
    let s = state
        .coerce_to_string(v, Span::DUMMY, &mut context, true)
        .unwrap();
    assert_eq!(s, "1 2");
}

#[test]
fn sets_coerce_through_out_path() {
    let mut state = new_state();
    let mut context = StringContext::new();
    let set = attrs(&state, vec![("outPath", string("/store/x"))]);
    let v = thunk(&mut state, set);
    let s = state
        .coerce_to_string(v, Span::DUMMY, &mut context, false)
        .unwrap();
    assert_eq!(s, "/store/x");

    let empty = attrs(&state, vec![]);
    let empty = thunk(&mut state, empty);
    let err = state
        .coerce_to_string(empty, Span::DUMMY, &mut context, false)
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotCoercible {
            type_name: "a set".to_string()
        }
    );
}

#[test]
fn strings_contribute_context() {
    let mut state = new_state();
    let mut context = StringContext::new();
    let tagged: StringContext = ["b", "a"].into_iter().collect();
    let v = state
        .alloc_value(Value::string_with_context("s", tagged))
        .unwrap();
    state
        .coerce_to_string(v, Span::DUMMY, &mut context, false)
        .unwrap();
    assert_eq!(context.iter().collect::<Vec<_>>(), vec!["a", "b"]);
}

fn nest(state: &mut EvalState, remaining: usize) -> Result<usize, EvalError> {
    if remaining == 0 {
        return Ok(state.call_depth());
    }
    let mut guard = state.call_depth_guard(FrameLabel::DeepForce, Span::DUMMY)?;
    nest(&mut guard, remaining - 1)
}

#[test]
fn guards_nest_up_to_the_limit() {
    let mut state = state_with(EvalSettings::builder().max_call_depth(5).build().unwrap());
    assert_eq!(nest(&mut state, 5).unwrap(), 5);
    assert_eq!(state.call_depth(), 0);

    let err = nest(&mut state, 6).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 5 });
    assert_eq!(state.call_depth(), 0);
}

#[test]
fn with_frame_attaches_innermost_backtrace() {
    let mut state = new_state();
    let f = state.intern("f");
    let err = state
        .with_frame(FrameLabel::Lambda(Some(f)), sp(1, 2), |state| {
            state.with_frame(FrameLabel::DynamicScope, sp(3, 4), |_| {
                Err::<(), _>(EvalError::new("boom"))
            })
        })
        .unwrap_err();

    let backtrace = err.backtrace.unwrap();
    let names: Vec<_> = backtrace
        .frames()
        .iter()
        .map(|frame| frame.name.as_str()).collect();
    assert_eq!(names, vec!["'with' attribute set", "function 'f'"]);
    assert_eq!(state.call_depth(), 0);
}

#[test]
fn with_scopes_resolve_innermost_first() {
    let mut state = new_state();
    let x = state.intern("x");
    let outer = attrs(&state, vec![("x", int(1)), ("y", int(2))]);
    let inner = attrs(&state, vec![("x", int(10))]);
    let lookup_x: SharedExpr = Rc::new(Var::dynamic(x, sp(1, 2)));
    let lookup_y: SharedExpr = Rc::new(Var::dynamic(state.intern("y"), sp(1, 2)));

    let nested = |body: SharedExpr| -> SharedExpr {
        Rc::new(With {
            attrs: Rc::clone(&outer),
            body: Rc::new(With {
                attrs: Rc::clone(&inner),
                body,
                span: sp(5, 6),
            }),
            span: sp(5, 6),
        })
    };

    let base = state.base_env();
    let out = state.eval_expr(&nested(lookup_x), base).unwrap();
    assert_eq!(state.value(out).as_int(), Some(10));
    let out = state.eval_expr(&nested(lookup_y), base).unwrap();
    assert_eq!(state.value(out).as_int(), Some(2));
    assert_eq!(state.call_depth(), 0);
}

#[test]
fn unbound_dynamic_variable() {
    let mut state = new_state();
    let z: SharedExpr = Rc::new(Var::dynamic(state.intern("z"), sp(8, 9)));
    let body: SharedExpr = Rc::new(With {
        attrs: attrs(&state, vec![]),
        body: z,
        span: sp(1, 9),
    });
    let err = state.eval_expr(&body, state.base_env()).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "z".to_string()
        }
    );
    assert_eq!(err.span, Some(sp(8, 9)));
}

#[test]
fn with_of_non_set_is_a_type_error() {
    let mut state = new_state();
    let z: SharedExpr = Rc::new(Var::dynamic(state.intern("z"), sp(8, 9)));
    let body: SharedExpr = Rc::new(With {
        attrs: Rc::new(Literal::int(1, sp(2, 3))),
        body: z,
        span: sp(1, 9),
    });
    let err = state.eval_expr(&body, state.base_env()).unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::TypeError {
            expected: NormalType::Attrs,
            actual: NormalType::Int
        }
    ));
    assert_eq!(
        err.context(),
        Some("while evaluating the first subexpression of a with expression")
    );
}
