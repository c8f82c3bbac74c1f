//! Call-depth tracking.
//!
//! `CallStack` is the evaluator's nesting counter. Each function call, each
//! `with` attribute-set force and each level of a graph walk (deep forcing,
//! comparison, serialization, coercion) pushes a [`CallFrame`]; the frames double as the backtrace attached to errors
//! raised inside them. The depth limit is checked before pushing, so a
//! refused push leaves the depth unchanged.
//!
//! Pushing and popping go through `CallDepthGuard` (see `state::call_depth`)
//! so every exit path pops.

use lume_ir::{Name, Span, StringInterner};

use crate::errors::{recursion_limit_exceeded, BacktraceFrame, EvalBacktrace, EvalError};

/// What a frame was pushed for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameLabel {
    /// A lambda call; `None` for an anonymous lambda.
    Lambda(Option<Name>),
    /// Forcing the attribute set of a `with` scope.
    DynamicScope,
    /// One level of deep forcing.
    DeepForce,
    /// One level of structural comparison.
    Comparison,
    /// One level of JSON serialization.
    Serialization,
    /// One level of string coercion through `__toString`, `outPath` or a list.
    Coercion,
}

/// A single frame in the live call stack.
#[derive(Copy, Clone, Debug)]
pub struct CallFrame {
    pub label: FrameLabel,
    /// Where the call was made, not where the function was defined.
    pub call_span: Option<Span>,
}

impl CallFrame {
    fn describe(&self, interner: &StringInterner) -> String {
        match self.label {
            FrameLabel::Lambda(Some(name)) => format!("function '{}'", interner.lookup(name)),
            FrameLabel::Lambda(None) => "anonymous function".to_string(),
            FrameLabel::DynamicScope => "'with' attribute set".to_string(),
            FrameLabel::DeepForce => "deep evaluation".to_string(),
            FrameLabel::Comparison => "comparison".to_string(),
            FrameLabel::Serialization => "JSON serialization".to_string(),
            FrameLabel::Coercion => "string coercion".to_string(),
        }
    }
}

/// Live call stack with a depth limit.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a call frame, checking the depth limit.
    ///
    /// Returns a `StackOverflow` error if the stack is full. The frame is
    /// NOT pushed on overflow.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if self.frames.len() >= self.max_depth {
            let err = recursion_limit_exceeded(self.max_depth);
            return Err(match frame.call_span {
                Some(span) => err.with_span(span),
                None => err,
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pop the most recent call frame.
    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    /// Current call depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Snapshot of the stack, most recent call first.
    pub fn capture(&self, interner: &StringInterner) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|frame| BacktraceFrame {
                name: frame.describe(interner),
                span: frame.call_span,
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a backtrace to `err` unless the stack is empty or an inner
    /// frame already attached one.
    pub fn attach_backtrace(&self, err: EvalError, interner: &StringInterner) -> EvalError {
        if self.frames.is_empty() || err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture(interner))
    }
}
