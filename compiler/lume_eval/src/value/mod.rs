//! Runtime values.
//!
//! A [`Value`] is the content of one heap node. Nodes are addressed by
//! [`ValueId`] and shared by every holder of the id; forcing a node replaces
//! its `Value` in place, which is how results are memoized.
//!
//! Unevaluated forms (`Thunk`, `App`) and the in-progress sentinel
//! (`Blackhole`) are ordinary variants. [`Value::normal_type`] reports all
//! three as [`NormalType::Thunk`] without forcing anything.

mod attrs;
mod external;
mod list;
mod primop;
mod string;

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

pub use attrs::{Attr, Bindings};
pub use external::ExternalValue;
pub use list::{List, INLINE_CAPACITY};
pub use primop::{PrimOp, PrimOpFn};
pub use string::{StringContext, StringValue};

use crate::expr::{LambdaDef, SharedExpr};
use crate::heap::{EnvId, ValueId};

/// Content of a heap node.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    String(StringValue),
    /// Filesystem-path-shaped scalar; never carries context.
    Path(Rc<str>),
    Attrs(Rc<Bindings>),
    List(List),

    /// Suspended computation: `expr` evaluated in `env`.
    Thunk { env: EnvId, expr: SharedExpr },
    /// Suspended application of `left` to `right`, neither forced.
    App { left: ValueId, right: ValueId },
    /// Closure over `env`.
    Lambda { env: EnvId, def: Rc<LambdaDef> },
    PrimOp(Rc<PrimOp>),
    /// Partial application of a builtin; `left` is the function so far.
    PrimOpApp { left: ValueId, right: ValueId },

    /// The node is being forced.
    ///
    /// Also the content of a freshly allocated output node that has not
    /// been written yet.
    Blackhole,

    External(Rc<dyn ExternalValue>),
}

/// A value's type as observed without forcing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NormalType {
    /// Not yet in normal form: thunk, application or blackhole.
    Thunk,
    Int,
    Float,
    Bool,
    String,
    Path,
    Null,
    Attrs,
    List,
    Function,
    External,
}

impl NormalType {
    /// Diagnostic phrase, e.g. "a set".
    pub fn describe(self) -> &'static str {
        match self {
            NormalType::Thunk => "a thunk",
            NormalType::Int => "an integer",
            NormalType::Float => "a float",
            NormalType::Bool => "a Boolean",
            NormalType::String => "a string",
            NormalType::Path => "a path",
            NormalType::Null => "null",
            NormalType::Attrs => "a set",
            NormalType::List => "a list",
            NormalType::Function => "a function",
            NormalType::External => "an external value",
        }
    }
}

impl fmt::Display for NormalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

// Factory methods

impl Value {
    /// String without context.
    #[inline]
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(StringValue::new(s))
    }

    #[inline]
    pub fn string_with_context(s: impl Into<Rc<str>>, context: StringContext) -> Self {
        Value::String(StringValue::with_context(s, context))
    }

    #[inline]
    pub fn path(p: impl Into<Rc<str>>) -> Self {
        Value::Path(p.into())
    }

    #[inline]
    pub fn attrs(bindings: Bindings) -> Self {
        Value::Attrs(Rc::new(bindings))
    }

    #[inline]
    pub fn list(items: &[ValueId]) -> Self {
        Value::List(List::from_items(items))
    }

    #[inline]
    pub fn primop(op: PrimOp) -> Self {
        Value::PrimOp(Rc::new(op))
    }

    #[inline]
    pub fn external(value: impl ExternalValue + 'static) -> Self {
        Value::External(Rc::new(value))
    }
}

// Inspection

impl Value {
    pub fn normal_type(&self) -> NormalType {
        match self {
            Value::Int(_) => NormalType::Int,
            Value::Float(_) => NormalType::Float,
            Value::Bool(_) => NormalType::Bool,
            Value::Null => NormalType::Null,
            Value::String(_) => NormalType::String,
            Value::Path(_) => NormalType::Path,
            Value::Attrs(_) => NormalType::Attrs,
            Value::List(_) => NormalType::List,
            Value::Thunk { .. } | Value::App { .. } | Value::Blackhole => NormalType::Thunk,
            Value::Lambda { .. } | Value::PrimOp(_) | Value::PrimOpApp { .. } => {
                NormalType::Function
            }
            Value::External(_) => NormalType::External,
        }
    }

    /// Whether the node holds a concrete (forced) value.
    #[inline]
    pub fn is_forced(&self) -> bool {
        self.normal_type() != NormalType::Thunk
    }

    #[inline]
    pub fn is_thunk(&self) -> bool {
        matches!(self, Value::Thunk { .. })
    }

    #[inline]
    pub fn is_blackhole(&self) -> bool {
        matches!(self, Value::Blackhole)
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        self.normal_type() == NormalType::Function
    }

    /// The list payload.
    ///
    /// # Panics
    /// Panics if the value is not a list.
    pub fn list_items(&self) -> &List {
        match self {
            Value::List(list) => list,
            other => panic!("list_items() on {}", other.show_type()),
        }
    }

    /// Forcing this value needs no function application.
    pub fn is_trivial(&self) -> bool {
        match self {
            Value::App { .. } | Value::Blackhole => false,
            Value::Thunk { expr, .. } => expr.is_trivial(),
            _ => true,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&StringValue> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_attrs(&self) -> Option<&Rc<Bindings>> {
        match self {
            Value::Attrs(attrs) => Some(attrs),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Diagnostic phrase, more specific than [`NormalType::describe`].
    pub fn show_type(&self) -> Cow<'static, str> {
        match self {
            Value::Thunk { .. } => Cow::Borrowed("a thunk"),
            Value::App { .. } => Cow::Borrowed("a function application"),
            Value::Blackhole => Cow::Borrowed("a black hole"),
            Value::PrimOp(_) => Cow::Borrowed("a built-in function"),
            Value::PrimOpApp { .. } => Cow::Borrowed("a partially applied built-in function"),
            Value::External(ext) => Cow::Owned(ext.show_type()),
            other => Cow::Borrowed(other.normal_type().describe()),
        }
    }

    /// Short type name as reported by the language's `typeOf`.
    pub fn type_of(&self) -> Cow<'static, str> {
        match self {
            Value::Int(_) => Cow::Borrowed("int"),
            Value::Float(_) => Cow::Borrowed("float"),
            Value::Bool(_) => Cow::Borrowed("bool"),
            Value::Null => Cow::Borrowed("null"),
            Value::String(_) => Cow::Borrowed("string"),
            Value::Path(_) => Cow::Borrowed("path"),
            Value::Attrs(_) => Cow::Borrowed("set"),
            Value::List(_) => Cow::Borrowed("list"),
            Value::Lambda { .. } | Value::PrimOp(_) | Value::PrimOpApp { .. } => {
                Cow::Borrowed("lambda")
            }
            Value::External(ext) => Cow::Owned(ext.type_of()),
            Value::Thunk { .. } | Value::App { .. } | Value::Blackhole => Cow::Borrowed("thunk"),
        }
    }

    /// Visit every node and frame this value references.
    pub(crate) fn for_each_ref(&self, mut value: impl FnMut(ValueId), mut env: impl FnMut(EnvId)) {
        match self {
            Value::Attrs(attrs) => attrs.iter().for_each(|(_, attr)| value(attr.value)),
            Value::List(list) => list.iter().for_each(value),
            Value::Thunk { env: e, .. } | Value::Lambda { env: e, .. } => env(*e),
            Value::App { left, right } | Value::PrimOpApp { left, right } => {
                value(*left);
                value(*right);
            }
            Value::Int(_)
            | Value::Float(_)
            | Value::Bool(_)
            | Value::Null
            | Value::String(_)
            | Value::Path(_)
            | Value::PrimOp(_)
            | Value::Blackhole
            | Value::External(_) => {}
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Null => write!(f, "Null"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Path(p) => write!(f, "Path({p:?})"),
            Value::Attrs(attrs) => write!(f, "Attrs({attrs:?})"),
            Value::List(list) => write!(f, "List({list:?})"),
            Value::Thunk { env, expr } => write!(f, "Thunk({env:?}, @{:?})", expr.span()),
            Value::App { left, right } => write!(f, "App({left:?}, {right:?})"),
            Value::Lambda { env, def } => write!(f, "Lambda({env:?}, @{:?})", def.span),
            Value::PrimOp(op) => write!(f, "PrimOp({})", op.name),
            Value::PrimOpApp { left, right } => write!(f, "PrimOpApp({left:?}, {right:?})"),
            Value::Blackhole => write!(f, "Blackhole"),
            Value::External(ext) => write!(f, "External({ext:?})"),
        }
    }
}
