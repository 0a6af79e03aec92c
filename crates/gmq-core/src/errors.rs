//! Structured error types shared across GMQ crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`GmqError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (record names, masses, bounds, etc.).
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

/// Canonical error type for the quantization engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum GmqError {
    /// Mass is non-positive, non-finite, or maps to a non-finite exponent.
    #[error("invalid mass: {0}")]
    InvalidMass(ErrorInfo),
    /// Reference particle is absent or has a non-positive mass.
    #[error("missing reference: {0}")]
    MissingReference(ErrorInfo),
    /// Exact decomposition found nothing and the caller required a solution.
    #[error("empty search result: {0}")]
    EmptySearchResult(ErrorInfo),
    /// Malformed least-squares input.
    #[error("fit error: {0}")]
    Fit(ErrorInfo),
    /// Invalid plan, search box or window configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Record store failures.
    #[error("store error: {0}")]
    Store(ErrorInfo),
    /// Serialization and schema errors.
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

impl GmqError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            GmqError::InvalidMass(info)
            | GmqError::MissingReference(info)
            | GmqError::EmptySearchResult(info)
            | GmqError::Fit(info)
            | GmqError::Config(info)
            | GmqError::Store(info)
            | GmqError::Serde(info) => info,
        }
    }

    /// Short family label used when errors are flattened into batch reports.
    pub fn family(&self) -> &'static str {
        match self {
            GmqError::InvalidMass(_) => "invalid-mass",
            GmqError::MissingReference(_) => "missing-reference",
            GmqError::EmptySearchResult(_) => "empty-search-result",
            GmqError::Fit(_) => "fit",
            GmqError::Config(_) => "config",
            GmqError::Store(_) => "store",
            GmqError::Serde(_) => "serde",
        }
    }
}

/// Builds an [`GmqError::InvalidMass`] carrying the offending value.
pub fn invalid_mass(code: &str, message: impl Into<String>, mass: f64) -> GmqError {
    GmqError::InvalidMass(ErrorInfo::new(code, message).with_context("mass", mass.to_string()))
}

/// Builds a [`GmqError::Config`] error.
pub fn config_error(code: &str, message: impl Into<String>) -> GmqError {
    GmqError::Config(ErrorInfo::new(code, message))
}

/// Per-record failure captured by batch operations that keep going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Name of the record (or sample label) that failed.
    pub name: String,
    /// Pipeline stage that rejected the record.
    pub stage: String,
    /// Structured error describing the failure.
    pub error: GmqError,
}

impl RecordFailure {
    /// Creates a failure entry.
    pub fn new(name: impl Into<String>, stage: impl Into<String>, error: GmqError) -> Self {
        Self {
            name: name.into(),
            stage: stage.into(),
            error,
        }
    }
}
