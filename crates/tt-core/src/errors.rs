//! Structured error types shared across the reconstruction crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`RecoError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (table names, indices, values).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for event reconstruction.
///
/// Kinematic dead ends are not errors and never show up here; they are reported as
/// reconstruction statuses. Everything in this enum either stops setup or aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RecoError {
    /// Invalid or incomplete configuration detected at setup time.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Malformed probability density table.
    #[error("density error: {0}")]
    Density(ErrorInfo),
    /// Upstream data violates a precondition of the reconstruction.
    #[error("precondition violated: {0}")]
    Precondition(ErrorInfo),
    /// Serialization and I/O errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl RecoError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RecoError::Config(info)
            | RecoError::Density(info)
            | RecoError::Precondition(info)
            | RecoError::Serde(info) => info,
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        RecoError::Config(ErrorInfo::new(code, message))
    }

    /// Shorthand for a density table error.
    pub fn density(code: &str, message: impl Into<String>) -> Self {
        RecoError::Density(ErrorInfo::new(code, message))
    }

    /// Shorthand for a precondition violation.
    pub fn precondition(code: &str, message: impl Into<String>) -> Self {
        RecoError::Precondition(ErrorInfo::new(code, message))
    }

    /// Wraps an I/O or (de)serialization failure.
    pub fn serde(code: &str, err: impl ToString) -> Self {
        RecoError::Serde(ErrorInfo::new(code, err.to_string()))
    }
}
