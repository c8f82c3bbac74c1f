//! Evaluator settings.
//!
//! `EvalSettings` carries the limits the evaluator consults: the maximum
//! call depth for the depth guard, an optional cap on live value nodes, and
//! how deep the diagnostic printer descends.

use std::fmt;

/// Default bound on nested calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Default nesting bound for values rendered into diagnostics.
pub const DEFAULT_MAX_PRINT_DEPTH: usize = 8;

/// Error when building settings with an invalid limit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("max-call-depth must be a positive integer")]
    ZeroCallDepth,
    #[error("max-heap-values must be a positive integer when set")]
    ZeroHeapLimit,
}

/// Limits consulted during evaluation.
#[derive(Clone, PartialEq, Eq)]
pub struct EvalSettings {
    max_call_depth: usize,
    max_heap_values: Option<usize>,
    max_print_depth: usize,
}

impl EvalSettings {
    pub fn builder() -> EvalSettingsBuilder {
        EvalSettingsBuilder::default()
    }

    /// Maximum number of nested call-depth frames.
    #[inline]
    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Cap on live value nodes, `None` for unlimited.
    ///
    /// Environments are not counted.
    #[inline]
    pub fn max_heap_values(&self) -> Option<usize> {
        self.max_heap_values
    }

    #[inline]
    pub fn max_print_depth(&self) -> usize {
        self.max_print_depth
    }
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_heap_values: None,
            max_print_depth: DEFAULT_MAX_PRINT_DEPTH,
        }
    }
}

impl fmt::Debug for EvalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalSettings")
            .field("max_call_depth", &self.max_call_depth)
            .field("max_heap_values", &self.max_heap_values)
            .field("max_print_depth", &self.max_print_depth)
            .finish()
    }
}

/// Builder for [`EvalSettings`].
#[derive(Clone, Debug, Default)]
pub struct EvalSettingsBuilder {
    max_call_depth: Option<usize>,
    max_heap_values: Option<usize>,
    max_print_depth: Option<usize>,
}

impl EvalSettingsBuilder {
    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = Some(depth);
        self
    }

    /// Limit the number of live value nodes the heap will hold.
    #[must_use]
    pub fn max_heap_values(mut self, limit: usize) -> Self {
        self.max_heap_values = Some(limit);
        self
    }

    #[must_use]
    pub fn max_print_depth(mut self, depth: usize) -> Self {
        self.max_print_depth = Some(depth);
        self
    }

    pub fn build(self) -> Result<EvalSettings, SettingsError> {
        let max_call_depth = self.max_call_depth.unwrap_or(DEFAULT_MAX_CALL_DEPTH);
        if max_call_depth == 0 {
            return Err(SettingsError::ZeroCallDepth);
        }
        if self.max_heap_values == Some(0) {
            return Err(SettingsError::ZeroHeapLimit);
        }
        Ok(EvalSettings {
            max_call_depth,
            max_heap_values: self.max_heap_values,
            max_print_depth: self.max_print_depth.unwrap_or(DEFAULT_MAX_PRINT_DEPTH),
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let settings = EvalSettings::default();
        assert_eq!(settings.max_call_depth(), 10_000);
        assert_eq!(settings.max_heap_values(), None);
        assert_eq!(settings.max_print_depth(), 8);
        assert_eq!(EvalSettings::builder().build().unwrap(), settings);
    }

    #[test]
    fn builder_overrides() {
        let settings = EvalSettings::builder()
            .max_call_depth(32)
            .max_heap_values(1024)
            .max_print_depth(2)
            .build()
            .unwrap();
        assert_eq!(settings.max_call_depth(), 32);
        assert_eq!(settings.max_heap_values(), Some(1024));
        assert_eq!(settings.max_print_depth(), 2);
    }

    #[test]
    fn zero_limits_rejected() {
        assert_eq!(
            EvalSettings::builder().max_call_depth(0).build(),
            Err(SettingsError::ZeroCallDepth)
        );
        assert_eq!(
            EvalSettings::builder().max_heap_values(0).build(),
            Err(SettingsError::ZeroHeapLimit)
        );
    }
}
