use super::*;
use pretty_assertions::assert_eq;

#[test]
fn kind_display_is_default_message() {
    let err = recursion_limit_exceeded(64);
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 64 });
    assert_eq!(
        err.message,
        "stack overflow; max-call-depth exceeded (limit: 64)"
    );
}

#[test]
fn type_mismatch_renders_value() {
    let err = type_mismatch(NormalType::Attrs, NormalType::Int, "42");
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeError {
            expected: NormalType::Attrs,
            actual: NormalType::Int,
        }
    );
    assert_eq!(err.message, "expected a set but found an integer: 42");
}

#[test]
fn or_span_keeps_innermost_position() {
    let err = infinite_recursion()
        .or_span(Span::new(3, 4))
        .or_span(Span::new(10, 20));
    assert_eq!(err.span, Some(Span::new(3, 4)));
}

#[test]
fn dummy_span_is_not_attached() {
    let err = thrown("boom").with_span(Span::DUMMY);
    assert_eq!(err.span, None);
    let err = err.or_span(Span::new(1, 2));
    assert_eq!(err.span, Some(Span::new(1, 2)));
}

#[test]
fn context_is_innermost_note() {
    let err = missing_attribute("foo")
        .with_context(Span::new(1, 5), "while evaluating the attribute 'bar'")
        .with_context(Span::new(0, 9), "while calling a function");
    assert_eq!(err.context(), Some("while evaluating the attribute 'bar'"));
    assert_eq!(err.notes.len(), 2);
}

#[test]
fn first_backtrace_wins() {
    let inner = EvalBacktrace::new(vec![BacktraceFrame {
        name: "inner".to_string(),
        span: None,
    }]);
    let outer = EvalBacktrace::new(vec![]);
    let err = out_of_memory()
        .with_backtrace(inner.clone())
        .with_backtrace(outer);
    assert_eq!(err.backtrace, Some(inner));
}

#[test]
fn fatal_kinds() {
    assert!(out_of_memory().is_fatal());
    assert!(recursion_limit_exceeded(1).is_fatal());
    assert!(!infinite_recursion().is_fatal());
    assert!(!EvalError::new("custom").is_fatal());
}

#[test]
fn custom_error_message() {
    let err = EvalError::new("division by zero");
    assert_eq!(
        err.kind,
        EvalErrorKind::Custom {
            message: "division by zero".to_string()
        }
    );
    assert_eq!(err.to_string(), "error: division by zero");
}

#[test]
fn display_includes_notes_and_backtrace() {
    let err = undefined_variable("x")
        .with_span(Span::new(4, 5))
        .with_context(Span::new(0, 8), "while evaluating a 'with' scope")
        .with_backtrace(EvalBacktrace::new(vec![BacktraceFrame {
            name: "function 'f'".to_string(),
            span: Some(Span::new(0, 8)),
        }]));
    assert_eq!(
        err.to_string(),
        "error: undefined variable 'x' at 4..5\n  … while evaluating a 'with' scope at 0..8\n\
         stack backtrace:\n  0: function 'f' at 0..8\n"
    );
}
