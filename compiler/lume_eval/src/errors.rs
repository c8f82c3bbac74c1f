//! Evaluation errors.
//!
//! Every failure that leaves the evaluator is an [`EvalError`]: a structured
//! [`EvalErrorKind`], the rendered message, the source position where it was
//! raised, context notes added while it propagated, and the call backtrace at
//! the raise site.
//!
//! Factory functions (e.g. [`infinite_recursion`]) are the public way to build
//! errors; they fill both `kind` and `message`.

use std::fmt;

use lume_ir::Span;

use crate::value::NormalType;

/// Typed error category.
///
/// `TypeError`, `InfiniteRecursion`, `StackOverflow` and `OutOfMemory` are
/// raised by the evaluator core itself. The remaining kinds are raised by
/// expression evaluation and are only propagated by the core.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("expected {expected} but found {actual}")]
    TypeError {
        expected: NormalType,
        actual: NormalType,
    },

    #[error("infinite recursion encountered")]
    InfiniteRecursion,

    #[error("stack overflow; max-call-depth exceeded (limit: {depth})")]
    StackOverflow { depth: usize },

    #[error("out of memory")]
    OutOfMemory,

    #[error("evaluation interrupted")]
    Interrupted,

    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("attribute '{name}' missing")]
    MissingAttribute { name: String },

    #[error("function '{function}' called without required argument '{name}'")]
    MissingArgument { function: String, name: String },

    #[error("function '{function}' called with unexpected argument '{name}'")]
    UnexpectedArgument { function: String, name: String },

    /// Raised by the language's own `throw`.
    #[error("{message}")]
    Thrown { message: String },

    #[error("cannot coerce {type_name} to a string")]
    NotCoercible { type_name: String },

    #[error("cannot convert {type_name} to {format}")]
    NotRepresentable { type_name: String, format: String },

    /// Catch-all for failures without a structured kind.
    #[error("{message}")]
    Custom { message: String },
}

/// Context note attached while an error propagates.
///
/// Notes are ordered innermost first, e.g. "while evaluating the attribute
/// 'name'" followed by "while calling a function".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
    pub span: Option<Span>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: (!span.is_dummy()).then_some(span),
        }
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function name, or a description of the nested evaluation.
    pub name: String,
    /// Source location of the call site.
    pub span: Option<Span>,
}

/// Snapshot of the call stack at an error site, most recent call first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}", frame.name)?;
            if let Some(span) = frame.span {
                write!(f, " at {span}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable error message.
    ///
    /// Usually `kind.to_string()`; type errors append a rendering of the
    /// offending value.
    pub message: String,
    /// Source location where the error occurred.
    pub span: Option<Span>,
    /// Context notes, innermost first.
    pub notes: Vec<EvalNote>,
    /// Call stack backtrace at the error site.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_kind(EvalErrorKind::Custom {
            message: message.clone(),
        })
        .with_message(message)
    }

    /// Create an error from a structured kind; the message is the kind's
    /// `Display` output.
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
            notes: Vec::new(),
            backtrace: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a source span, replacing any existing one.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if !span.is_dummy() {
            self.span = Some(span);
        }
        self
    }

    /// Attach `span` only if the error has no position yet.
    #[must_use]
    pub fn or_span(self, span: Span) -> Self {
        if self.span.is_some() {
            self
        } else {
            self.with_span(span)
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    /// Add a "while ..." context note at `span`.
    #[must_use]
    pub fn with_context(self, span: Span, context: impl Into<String>) -> Self {
        self.with_note(EvalNote::with_span(context, span))
    }

    /// Attach a backtrace unless an inner frame already did.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    /// The innermost context phrase, if any.
    pub fn context(&self) -> Option<&str> {
        self.notes.first().map(|note| note.message.as_str())
    }

    /// Errors that end the current top-level evaluation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            EvalErrorKind::OutOfMemory | EvalErrorKind::StackOverflow { .. }
        )
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        for note in &self.notes {
            write!(f, "\n  … {}", note.message)?;
            if let Some(span) = note.span {
                write!(f, " at {span}")?;
            }
        }
        if let Some(backtrace) = &self.backtrace {
            write!(f, "\n{backtrace}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

// Core errors

/// Type mismatch at a coercion boundary; `rendered` is the printed value.
#[cold]
pub fn type_mismatch(expected: NormalType, actual: NormalType, rendered: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeError { expected, actual })
        .with_message(format!("expected {expected} but found {actual}: {rendered}"))
}

/// A node was forced while it was already being forced.
#[cold]
pub fn infinite_recursion() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InfiniteRecursion)
}

/// Maximum call depth exceeded.
#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth: limit })
}

/// The heap refused an allocation.
#[cold]
pub fn out_of_memory() -> EvalError {
    EvalError::from_kind(EvalErrorKind::OutOfMemory)
}

/// The host requested cancellation.
#[cold]
pub fn interrupted() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Interrupted)
}

// Evaluation errors

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn missing_attribute(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingAttribute {
        name: name.to_string(),
    })
}

#[cold]
pub fn missing_argument(function: &str, name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingArgument {
        function: function.to_string(),
        name: name.to_string(),
    })
}

#[cold]
pub fn unexpected_argument(function: &str, name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnexpectedArgument {
        function: function.to_string(),
        name: name.to_string(),
    })
}

/// User-raised error.
#[cold]
pub fn thrown(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Thrown {
        message: message.to_string(),
    })
}

#[cold]
pub fn not_coercible(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCoercible {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_representable(type_name: &str, format: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotRepresentable {
        type_name: type_name.to_string(),
        format: format.to_string(),
    })
}

#[cfg(test)]
mod tests;
