//! Structured error types shared across EOS crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`EosError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code, `crate.reason`.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Offending identifiers (names, option keys, variables).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            f.write_str(" | context: [")?;
            let mut first = true;
            for (key, value) in &self.context {
                if !first {
                    f.write_str(", ")?;
                }
                first = false;
                write!(f, "{key}={value}")?;
            }
            f.write_str("]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the EOS engine.
///
/// Every failure is reported fail-fast through one of these families; no
/// component substitutes a default for an unresolved name, option or variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum EosError {
    /// A qualified name matches no registered observable, parameter or constraint.
    #[error("name error: {0}")]
    Name(ErrorInfo),
    /// Malformed qualified name or expression.
    #[error("syntax error: {0}")]
    Syntax(ErrorInfo),
    /// Unsupported option value or unresolved required option.
    #[error("option error: {0}")]
    Option(ErrorInfo),
    /// Undeclared kinematic variable or conflicting alias.
    #[error("kinematic error: {0}")]
    Kinematic(ErrorInfo),
    /// Parameter write outside its declared range.
    #[error("range error: {0}")]
    Range(ErrorInfo),
    /// Failure surfaced by a numerical routine.
    #[error("numeric error: {0}")]
    Numeric(ErrorInfo),
    /// Invariant violation inside the engine.
    #[error("internal error: {0}")]
    Internal(ErrorInfo),
    /// Serialization, schema and I/O errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

/// Discriminant of [`EosError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`EosError::Name`].
    Name,
    /// See [`EosError::Syntax`].
    Syntax,
    /// See [`EosError::Option`].
    Option,
    /// See [`EosError::Kinematic`].
    Kinematic,
    /// See [`EosError::Range`].
    Range,
    /// See [`EosError::Numeric`].
    Numeric,
    /// See [`EosError::Internal`].
    Internal,
    /// See [`EosError::Serde`].
    Serde,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Name => "name",
            ErrorKind::Syntax => "syntax",
            ErrorKind::Option => "option",
            ErrorKind::Kinematic => "kinematic",
            ErrorKind::Range => "range",
            ErrorKind::Numeric => "numeric",
            ErrorKind::Internal => "internal",
            ErrorKind::Serde => "serde",
        };
        f.write_str(label)
    }
}

impl EosError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            EosError::Name(info)
            | EosError::Syntax(info)
            | EosError::Option(info)
            | EosError::Kinematic(info)
            | EosError::Range(info)
            | EosError::Numeric(info)
            | EosError::Internal(info)
            | EosError::Serde(info) => info,
        }
    }

    /// Returns the error family.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EosError::Name(_) => ErrorKind::Name,
            EosError::Syntax(_) => ErrorKind::Syntax,
            EosError::Option(_) => ErrorKind::Option,
            EosError::Kinematic(_) => ErrorKind::Kinematic,
            EosError::Range(_) => ErrorKind::Range,
            EosError::Numeric(_) => ErrorKind::Numeric,
            EosError::Internal(_) => ErrorKind::Internal,
            EosError::Serde(_) => ErrorKind::Serde,
        }
    }

    /// Shorthand for the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Wraps a YAML parse failure.
    pub fn yaml(code: &str, err: serde_yaml::Error) -> Self {
        let mut info = ErrorInfo::new(code, err.to_string());
        if let Some(location) = err.location() {
            info = info
                .with_context("line", location.line().to_string())
                .with_context("column", location.column().to_string());
        }
        EosError::Serde(info)
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(code: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        EosError::Serde(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }
}
