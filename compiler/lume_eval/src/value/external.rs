//! Plugin values.
//!
//! Hosts can inject values the evaluator knows nothing about. Each capability
//! has an explicit default, so a plugin only implements what it supports.

use std::any::Any;
use std::fmt;

use crate::errors::{not_coercible, not_representable, EvalError};
use crate::value::StringContext;

/// A value implemented outside the evaluator.
pub trait ExternalValue: fmt::Debug {
    /// Phrase used in diagnostics, e.g. "a store handle".
    fn show_type(&self) -> String;

    /// Short type name, e.g. "store-handle".
    fn type_of(&self) -> String;

    /// Rendering used by the value printer.
    fn print(&self) -> String {
        format!("<EXTERNAL {}>", self.type_of())
    }

    /// Coerce to a string, adding any provenance to `context`.
    fn coerce_to_string(
        &self,
        context: &mut StringContext,
        coerce_more: bool,
    ) -> Result<String, EvalError> {
        let _ = (context, coerce_more);
        Err(not_coercible(&self.show_type()))
    }

    /// Structural equality with another external value.
    fn equals(&self, other: &dyn ExternalValue) -> bool {
        let _ = other;
        false
    }

    /// Structured serialization.
    fn to_json(
        &self,
        strict: bool,
        context: &mut StringContext,
    ) -> Result<serde_json::Value, EvalError> {
        let _ = (strict, context);
        Err(not_representable(&self.show_type(), "JSON"))
    }

    /// Downcasting support for `equals` implementations.
    fn as_any(&self) -> &dyn Any;
}
