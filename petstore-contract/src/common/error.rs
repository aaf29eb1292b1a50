//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! Every kind a contract scenario can fail with. None of them is retried or
//! recovered: a scenario returning `Err` is a failed contract.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::schema::Violation;

/// Maximum number of body characters echoed back in status errors
const BODY_EXCERPT_CHARS: usize = 200;

/// Contract harness error type
#[derive(Debug, Error)]
pub enum ContractError {
    /// Connection level failure (refused, reset, DNS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Request did not complete within the configured bound
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Body was not the JSON the caller asked for
    #[error("Parse error: {0}")]
    Parse(String),

    /// Status code differs from the expectation
    #[error("Unexpected status for {context}: expected {expected}, got {actual} (body: {body})")]
    UnexpectedStatus {
        /// Request or phase that produced the status
        context: String,
        /// Expected HTTP status
        expected: u16,
        /// Actual HTTP status
        actual: u16,
        /// Leading part of the response body
        body: String,
    },

    /// Response failed structural validation
    #[error("Schema violation: {}", ViolationList(.0))]
    SchemaViolation(Vec<Violation>),

    /// Echoed field differs from the submitted value
    #[error("Field mismatch on `{field}`: expected {expected}, got {actual}")]
    FieldMismatch {
        /// Field name (`body` for literal text bodies)
        field: String,
        /// Submitted or expected value
        expected: Value,
        /// Value found in the response
        actual: Value,
    },

    /// Fixture entity could not be created
    #[error("Fixture setup failed for {kind}: {reason}")]
    FixtureSetup {
        /// Entity kind (`pet`, `order`)
        kind: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ContractError {
    /// Build an `UnexpectedStatus`, trimming the body to a short excerpt.
    pub fn unexpected_status(
        context: impl Into<String>,
        expected: u16,
        actual: u16,
        body: &str,
    ) -> Self {
        let body = if body.chars().count() > BODY_EXCERPT_CHARS {
            let mut excerpt: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
            excerpt.push('…');
            excerpt
        } else {
            body.to_string()
        };
        Self::UnexpectedStatus {
            context: context.into(),
            expected,
            actual,
            body,
        }
    }

    /// Build a `FieldMismatch`
    pub fn field_mismatch(field: impl Into<String>, expected: Value, actual: Value) -> Self {
        Self::FieldMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Short machine-friendly label of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Parse(_) => "parse",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::SchemaViolation(_) => "schema_violation",
            Self::FieldMismatch { .. } => "field_mismatch",
            Self::FixtureSetup { .. } => "fixture_setup",
            Self::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for ContractError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

struct ViolationList<'a>(&'a [Violation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

/// Result type alias (harness)
pub type HarnessResult<T> = Result<T, ContractError>;
