//! Value printing for diagnostics.
//!
//! The printer never forces. Unevaluated nodes render as placeholders, a
//! set or list reached twice renders as `«repeated»`, and nesting beyond
//! `max_print_depth` renders as `…`, so any graph prints in bounded time.

use std::fmt::Write;

use lume_ir::StringInterner;
use rustc_hash::FxHashSet;

use crate::heap::{Heap, ValueId};
use crate::state::EvalState;
use crate::value::Value;

/// Renders value graphs without forcing them.
pub struct ValuePrinter<'a> {
    heap: &'a Heap,
    interner: &'a StringInterner,
    max_depth: usize,
    seen: FxHashSet<ValueId>,
    out: String,
}

impl<'a> ValuePrinter<'a> {
    pub fn new(heap: &'a Heap, interner: &'a StringInterner, max_depth: usize) -> Self {
        ValuePrinter {
            heap,
            interner,
            max_depth,
            seen: FxHashSet::default(),
            out: String::new(),
        }
    }

    /// Render `v`.
    pub fn print(mut self, v: ValueId) -> String {
        self.value(v, 0);
        self.out
    }

    fn value(&mut self, v: ValueId, depth: usize) {
        let Some(value) = self.heap.try_value(v) else {
            self.out.push_str("«dangling»");
            return;
        };
        match value {
            Value::Int(n) => {
                let _ = write!(self.out, "{n}");
            }
            Value::Float(x) => {
                let _ = write!(self.out, "{x}");
            }
            Value::Bool(b) => {
                let _ = write!(self.out, "{b}");
            }
            Value::Null => self.out.push_str("null"),
            Value::String(s) => escape_string(&mut self.out, s.as_str()),
            Value::Path(p) => self.out.push_str(p),
            Value::Attrs(attrs) => {
                if depth >= self.max_depth {
                    self.out.push_str("{ … }");
                    return;
                }
                if !self.seen.insert(v) {
                    self.out.push_str("«repeated»");
                    return;
                }
                if attrs.is_empty() {
                    self.out.push_str("{ }");
                    return;
                }
                self.out.push_str("{ ");
                for (name, attr) in attrs.sorted(self.interner) {
                    self.out.push_str(name);
                    self.out.push_str(" = ");
                    self.value(attr.value, depth + 1);
                    self.out.push_str("; ");
                }
                self.out.push('}');
            }
            Value::List(list) => {
                if depth >= self.max_depth {
                    self.out.push_str("[ … ]");
                    return;
                }
                if !self.seen.insert(v) {
                    self.out.push_str("«repeated»");
                    return;
                }
                self.out.push_str("[ ");
                for item in list.iter() {
                    self.value(item, depth + 1);
                    self.out.push(' ');
                }
                self.out.push(']');
            }
            Value::Thunk { .. } | Value::App { .. } => self.out.push_str("«thunk»"),
            Value::Blackhole => self.out.push_str("«potential infinite recursion»"),
            Value::Lambda { def, .. } => {
                let _ = match def.name {
                    Some(name) => write!(
                        self.out,
                        "«lambda {} @ {}»",
                        self.interner.lookup(name),
                        def.span
                    ),
                    None => write!(self.out, "«lambda @ {}»", def.span),
                };
            }
            Value::PrimOp(op) => {
                let _ = write!(self.out, "«primop {}»", op.name);
            }
            Value::PrimOpApp { .. } => {
                let name = self.primop_name(v).unwrap_or("?");
                let _ = write!(self.out, "«partially applied primop {name}»");
            }
            Value::External(ext) => self.out.push_str(&ext.print()),
        }
    }

    fn primop_name(&self, mut v: ValueId) -> Option<&'static str> {
        loop {
            match self.heap.try_value(v)? {
                Value::PrimOpApp { left, .. } => v = *left,
                Value::PrimOp(op) => return Some(op.name),
                _ => return None,
            }
        }
    }
}

/// Quote `s` the way the language writes string literals.
fn escape_string(out: &mut String, s: &str) {
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out.push('"');
}

impl EvalState {
    /// Render `v` for a diagnostic, without forcing anything.
    pub fn print_value(&self, v: ValueId) -> String {
        ValuePrinter::new(self.heap(), self.interner(), self.settings().max_print_depth()).print(v)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
