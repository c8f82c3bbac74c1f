use std::any::Any;
use std::rc::Rc;

use lume_ir::Span;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::errors::{EvalError, EvalErrorKind};
use crate::expr::nodes::{AttrDef, AttrsExpr};
use crate::expr::SharedExpr;
use crate::settings::EvalSettings;
use crate::tests::{
    attrs, int, lambda, lambda_expr, let_in, list, new_state, sp, state_with, string, thunk, var,
    Effect,
};
use crate::value::{ExternalValue, StringContext, Value};

#[test]
fn strict_conversion_forces_everything() {
    let mut state = new_state();
    let nested = list(vec![int(1), string("two")]);
    let set = attrs(&state, vec![("z", int(0)), ("a", nested)]);
    let t = thunk(&mut state, set);

    let mut context = StringContext::new();
    let json = state.to_json(t, true, &mut context, Span::DUMMY).unwrap();
    assert_eq!(json, json!({ "a": [1, "two"], "z": 0 }));
    assert_eq!(
        serde_json::to_string(&json).unwrap(),
        r#"{"a":[1,"two"],"z":0}"#
    );
}

#[test]
fn non_strict_conversion_rejects_thunks() {
    let mut state = new_state();
    let t = thunk(&mut state, int(1));
    let mut context = StringContext::new();
    let err = state
        .to_json(t, false, &mut context, sp(1, 2))
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotRepresentable {
            type_name: "a thunk".to_string(),
            format: "JSON".to_string()
        }
    );
}

#[test]
fn functions_are_not_representable() {
    let mut state = new_state();
    let f = lambda_expr(lambda(None, Some(state.intern("x")), None, int(0)));
    let set = attrs(&state, vec![("f", f)]);
    let t = thunk(&mut state, set);
    let mut context = StringContext::new();
    let err = state.to_json(t, true, &mut context, Span::DUMMY).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotRepresentable {
            type_name: "a function".to_string(),
            format: "JSON".to_string()
        }
    );
    assert_eq!(err.context(), Some("while evaluating attribute 'f'"));
}

#[test]
fn non_finite_floats_are_rejected() {
    let mut state = new_state();
    let v = state.alloc_value(Value::Float(f64::NAN)).unwrap();
    let mut context = StringContext::new();
    assert!(state.to_json(v, true, &mut context, Span::DUMMY).is_err());

    let v = state.alloc_value(Value::Float(0.25)).unwrap();
    let json = state.to_json(v, true, &mut context, Span::DUMMY).unwrap();
    assert_eq!(json, json!(0.25));
}

#[test]
fn out_path_replaces_the_set() {
    let mut state = new_state();
    let set = attrs(&state, vec![("outPath", string("/store/abc")), ("x", int(1))]);
    let t = thunk(&mut state, set);
    let mut context = StringContext::new();
    let json = state.to_json(t, true, &mut context, Span::DUMMY).unwrap();
    assert_eq!(json, json!("/store/abc"));
}

#[test]
fn string_context_is_collected() {
    let mut state = new_state();
    let tagged: StringContext = ["dep"].into_iter().collect();
    let s = state
        .alloc_value(Value::string_with_context("s", tagged))
        .unwrap();
    let v = state.alloc_value(Value::list(&[s, s])).unwrap();
    let mut context = StringContext::new();
    state.to_json(v, true, &mut context, Span::DUMMY).unwrap();
    assert_eq!(context.iter().collect::<Vec<_>>(), vec!["dep"]);
}

#[test]
fn element_failures_name_the_index() {
    let mut state = new_state();
    let (effect, _, fail) = Effect::new(0);
    fail.set(true);
    let effect: SharedExpr = effect;
    let t = thunk(&mut state, list(vec![int(1), effect]));
    let mut context = StringContext::new();
    let err = state.to_json(t, true, &mut context, Span::DUMMY).unwrap_err();
    assert_eq!(err.context(), Some("while evaluating list element at index 1"));
}

#[test]
fn recursive_sets_serialize_their_values() {
    // rec { a = 1; b = a; }
    let mut state = new_state();
    let a = state.intern("a");
    let b = state.intern("b");
    let set: SharedExpr = Rc::new(AttrsExpr {
        recursive: true,
        attrs: vec![
            AttrDef {
                name: a,
                value: int(1),
                span: sp(1, 2),
            },
            AttrDef {
                name: b,
                value: var(0, 0),
                span: sp(3, 4),
            },
        ],
        span: sp(0, 5),
    });
    let t = thunk(&mut state, set);
    let mut context = StringContext::new();
    let json = state.to_json(t, true, &mut context, Span::DUMMY).unwrap();
    assert_eq!(json, json!({ "a": 1, "b": 1 }));
}

#[test]
fn cyclic_sets_overflow() {
    // let a = { x = a; }; in a
    let settings = EvalSettings::builder().max_call_depth(64).build().unwrap();
    let mut state = state_with(settings);
    let a = attrs(&state, vec![("x", var(0, 0))]);
    let t = thunk(&mut state, let_in(vec![a], var(0, 0)));
    let mut context = StringContext::new();

    let err = state.to_json(t, true, &mut context, sp(1, 2)).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 64 });
    assert_eq!(err.context(), Some("while evaluating attribute 'x'"));
    assert_eq!(state.call_depth(), 0);
}

#[derive(Debug)]
struct Point(i64, i64);

impl ExternalValue for Point {
    fn show_type(&self) -> String {
        "a point".to_string()
    }

    fn type_of(&self) -> String {
        "point".to_string()
    }

    fn to_json(
        &self,
        _strict: bool,
        _context: &mut StringContext,
    ) -> Result<serde_json::Value, EvalError> {
        Ok(json!([self.0, self.1]))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn externals_serialize_themselves() {
    let mut state = new_state();
    let v = state.alloc_value(Value::external(Point(3, 4))).unwrap();
    let mut context = StringContext::new();
    let json = state.to_json(v, true, &mut context, Span::DUMMY).unwrap();
    assert_eq!(json, json!([3, 4]));
}
