use std::any::Any;

use lume_ir::Span;
use pretty_assertions::assert_eq;

use crate::settings::EvalSettings;
use crate::state::EvalState;
use crate::tests::{int, lambda, list, new_state, state_with, thunk};
use crate::value::{Bindings, ExternalValue, Value};

fn set(state: &mut EvalState, entries: &[(&str, Value)]) -> Value {
    let mut bindings = Bindings::new();
    for (name, value) in entries {
        let v = state.alloc_value(value.clone()).unwrap();
        bindings.insert(state.intern(name), v, Span::DUMMY);
    }
    Value::attrs(bindings)
}

fn print(state: &mut EvalState, value: Value) -> String {
    let v = state.alloc_value(value).unwrap();
    state.print_value(v)
}

#[test]
fn scalars() {
    let mut state = new_state();
    assert_eq!(print(&mut state, Value::Int(-3)), "-3");
    assert_eq!(print(&mut state, Value::Float(1.5)), "1.5");
    assert_eq!(print(&mut state, Value::Bool(true)), "true");
    assert_eq!(print(&mut state, Value::Null), "null");
    assert_eq!(print(&mut state, Value::path("/etc/hosts")), "/etc/hosts");
}

#[test]
fn strings_are_escaped() {
    let mut state = new_state();
    assert_eq!(
        print(&mut state, Value::string("a\"b\\c\n\t${x} $y")),
        r#""a\"b\\c\n\t\${x} $y""#
    );
}

#[test]
fn sets_print_sorted() {
    let mut state = new_state();
    let value = set(
        &mut state,
        &[("b", Value::Int(2)), ("a", Value::string("x"))],
    );
    assert_eq!(print(&mut state, value), r#"{ a = "x"; b = 2; }"#);
    assert_eq!(print(&mut state, Value::attrs(Bindings::new())), "{ }");
}

#[test]
fn lists_and_unforced_elements() {
    let mut state = new_state();
    let t = thunk(&mut state, list(vec![int(1), list(vec![])]));
    assert_eq!(state.print_value(t), "«thunk»");

    state.force_value(t, Span::DUMMY).unwrap();
    assert_eq!(state.print_value(t), "[ 1 «thunk» ]");
    assert_eq!(print(&mut state, Value::list(&[])), "[ ]");
}

#[test]
fn shared_sets_print_once() {
    let mut state = new_state();
    let inner = set(&mut state, &[("a", Value::Int(1))]);
    let inner = state.alloc_value(inner).unwrap();
    let outer = Value::list(&[inner, inner]);
    assert_eq!(print(&mut state, outer), "[ { a = 1; } «repeated» ]");
}

#[test]
fn depth_is_bounded() {
    let settings = EvalSettings::builder().max_print_depth(1).build().unwrap();
    let mut state = state_with(settings);
    let one = state.alloc_value(Value::Int(1)).unwrap();
    let inner = state.alloc_value(Value::list(&[one])).unwrap();
    assert_eq!(print(&mut state, Value::list(&[inner])), "[ [ … ] ]");
}

#[test]
fn special_nodes() {
    let mut state = new_state();
    let pending = state.heap_mut().alloc_pending().unwrap();
    assert_eq!(state.print_value(pending), "«potential infinite recursion»");

    let def = lambda(Some(state.intern("f")), None, None, int(0));
    let env = state.base_env();
    assert_eq!(
        print(&mut state, Value::Lambda { env, def }),
        "«lambda f @ 20..30»"
    );
}

#[derive(Debug)]
struct Opaque;

impl ExternalValue for Opaque {
    fn show_type(&self) -> String {
        "an opaque value".to_string()
    }

    fn type_of(&self) -> String {
        "opaque".to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn externals_print_themselves() {
    let mut state = new_state();
    assert_eq!(print(&mut state, Value::external(Opaque)), "<EXTERNAL opaque>");
}
