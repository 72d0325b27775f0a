//! # Function Errors
//!
//! Function calls report failures as a single [`FuncError`] carrying
//! practitioner-facing text and, when the failure is tied to one argument,
//! that argument's position. [`FunctionErrors`] accumulates errors while a
//! call is processed and folds them into one with [`FunctionErrors::into_func_error`].

use std::fmt;

use provkit_core::Diagnostics;
use thiserror::Error;

/// An error returned from a function call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{text}")]
pub struct FuncError {
    /// Practitioner-facing message.
    pub text: String,
    /// Zero-based position of the argument at fault, if any.
    pub function_argument: Option<i64>,
}

impl FuncError {
    /// An error not tied to any argument.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            function_argument: None,
        }
    }

    /// An error tied to the argument at `position`.
    pub fn argument(position: i64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            function_argument: Some(position),
        }
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.function_argument.is_none()
    }

    /// Combine errors into one.
    ///
    /// Absent and empty errors are skipped. Texts of the rest are joined with
    /// newlines and the first argument position present wins. Returns `None`
    /// when nothing remains.
    pub fn concat<I>(errors: I) -> Option<FuncError>
    where
        I: IntoIterator<Item = Option<FuncError>>,
    {
        let mut texts = Vec::new();
        let mut function_argument = None;
        for err in errors.into_iter().flatten() {
            if err.is_empty() {
                continue;
            }
            if !err.text.is_empty() {
                texts.push(err.text);
            }
            if function_argument.is_none() {
                function_argument = err.function_argument;
            }
        }
        if texts.is_empty() && function_argument.is_none() {
            return None;
        }
        Some(FuncError {
            text: texts.join("\n"),
            function_argument,
        })
    }

    /// Fold the error diagnostics into one error.
    ///
    /// Each error becomes `summary: detail`. Warnings have no error form and
    /// are logged instead.
    pub fn from_diagnostics(diags: &Diagnostics) -> Option<FuncError> {
        for warning in diags.warnings() {
            tracing::warn!(
                summary = %warning.summary,
                detail = %warning.detail,
                "warning: call function"
            );
        }
        FuncError::concat(
            diags
                .errors()
                .map(|d| Some(FuncError::new(format!("{}: {}", d.summary, d.detail)))),
        )
    }
}

/// An ordered, de-duplicated collection of function errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionErrors(Vec<FuncError>);

impl FunctionErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `err` unless an equal error is already present.
    pub fn add_error(&mut self, err: FuncError) {
        if !self.contains(&err) {
            self.0.push(err);
        }
    }

    pub fn add_argument_error(&mut self, position: i64, text: impl Into<String>) {
        self.add_error(FuncError::argument(position, text));
    }

    pub fn append(&mut self, other: FunctionErrors) {
        for err in other.0 {
            self.add_error(err);
        }
    }

    pub fn contains(&self, err: &FuncError) -> bool {
        self.0.contains(err)
    }

    /// Whether any non-empty error is present.
    pub fn has_error(&self) -> bool {
        self.0.iter().any(|err| !err.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FuncError> {
        self.0.iter()
    }

    pub fn from_diagnostics(diags: &Diagnostics) -> Self {
        let mut errors = Self::new();
        if let Some(err) = FuncError::from_diagnostics(diags) {
            errors.add_error(err);
        }
        errors
    }

    /// Fold the collection into one error with [`FuncError::concat`].
    pub fn into_func_error(self) -> Option<FuncError> {
        FuncError::concat(self.0.into_iter().map(Some))
    }
}

impl From<FuncError> for FunctionErrors {
    fn from(err: FuncError) -> Self {
        Self(vec![err])
    }
}

impl fmt::Display for FunctionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for err in &self.0 {
            writeln!(f, "{}", err.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provkit_core::Diagnostic;

    #[test]
    fn test_concat_nothing() {
        assert_eq!(FuncError::concat([]), None);
        assert_eq!(FuncError::concat([None, None]), None);
        assert_eq!(FuncError::concat([Some(FuncError::default()), None]), None);
    }

    #[test]
    fn test_concat_joins_texts() {
        let err = FuncError::concat([
            Some(FuncError::new("first")),
            None,
            Some(FuncError::default()),
            Some(FuncError::new("second")),
        ]);
        assert_eq!(err, Some(FuncError::new("first\nsecond")));
    }

    #[test]
    fn test_concat_first_argument_wins() {
        let err = FuncError::concat([
            Some(FuncError::new("plain")),
            Some(FuncError::argument(2, "two")),
            Some(FuncError::argument(0, "zero")),
        ])
        .unwrap();
        assert_eq!(err.text, "plain\ntwo\nzero");
        assert_eq!(err.function_argument, Some(2));
    }

    #[test]
    fn test_concat_argument_without_text() {
        let err = FuncError::concat([
            Some(FuncError::new("")),
            Some(FuncError::argument(1, "")),
        ])
        .unwrap();
        assert_eq!(err, FuncError::argument(1, ""));
    }

    #[test]
    fn test_display_is_text() {
        assert_eq!(FuncError::argument(3, "bad input").to_string(), "bad input");
    }

    #[test]
    fn test_from_diagnostics() {
        let mut diags = Diagnostics::new();
        diags.add_error("One", "first problem");
        diags.add_warning("Careful", "only logged");
        diags.add_error("Two", "second problem");
        assert_eq!(
            FuncError::from_diagnostics(&diags),
            Some(FuncError::new("One: first problem\nTwo: second problem"))
        );

        let warnings_only: Diagnostics = Diagnostic::warning("Careful", "only logged").into();
        assert_eq!(FuncError::from_diagnostics(&warnings_only), None);
        assert_eq!(FuncError::from_diagnostics(&Diagnostics::new()), None);
    }

    #[test]
    fn test_function_errors_deduplicate() {
        let mut errors = FunctionErrors::new();
        errors.add_error(FuncError::new("a"));
        errors.add_argument_error(0, "b");
        errors.add_error(FuncError::new("a"));
        errors.add_argument_error(0, "b");
        errors.add_argument_error(1, "b");
        assert_eq!(errors.len(), 3);

        let mut other = FunctionErrors::from(FuncError::new("a"));
        other.add_error(FuncError::new("c"));
        errors.append(other);
        assert_eq!(
            errors.iter().map(|e| e.text.as_str()).collect::<Vec<_>>(),
            ["a", "b", "b", "c"]
        );
    }

    #[test]
    fn test_function_errors_has_error() {
        let mut errors = FunctionErrors::new();
        assert!(!errors.has_error());
        errors.add_error(FuncError::default());
        assert!(!errors.has_error());
        errors.add_argument_error(0, "oops");
        assert!(errors.has_error());
        assert!(errors.contains(&FuncError::argument(0, "oops")));
    }

    #[test]
    fn test_function_errors_display_and_fold() {
        assert_eq!(FunctionErrors::new().to_string(), "");
        let mut errors = FunctionErrors::new();
        errors.add_error(FuncError::new("one"));
        errors.add_argument_error(4, "two");
        assert_eq!(errors.to_string(), "one\ntwo\n");
        assert_eq!(
            errors.into_func_error(),
            Some(FuncError::argument(4, "one\ntwo"))
        );
    }
}
