//! JSONスキーマ検証
//!
//! Structural conformance of response documents. The pet schema is bundled
//! from `schemas/pet.schema.json` (draft 7) and compiled once per validator.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;

use crate::common::{ContractError, HarnessResult};

/// Bundled pet schema source
pub const PET_SCHEMA_JSON: &str = include_str!("../../schemas/pet.schema.json");

/// Category of a schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Required key absent (key name)
    MissingField(String),
    /// Value has the wrong JSON type
    WrongType,
    /// Value outside the enumerated set
    NotInEnum,
    /// Any other keyword failure
    Other,
}

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer of the offending value (`""` for the document root)
    pub path: String,
    /// 違反の種類
    pub kind: ViolationKind,
    /// Validator message
    pub message: String,
}

impl Violation {
    fn from_error(error: ValidationError<'_>) -> Self {
        let kind = match &error.kind {
            ValidationErrorKind::Required { property } => ViolationKind::MissingField(
                property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string()),
            ),
            ValidationErrorKind::Type { .. } => ViolationKind::WrongType,
            ValidationErrorKind::Enum { .. } => ViolationKind::NotInEnum,
            _ => ViolationKind::Other,
        };
        Self {
            path: error.instance_path.to_string(),
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            self.path.as_str()
        };
        write!(f, "{}: {}", path, self.message)
    }
}

/// Compiled schema
pub struct SchemaValidator {
    name: String,
    compiled: JSONSchema,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile an arbitrary draft 7 schema
    pub fn new(name: impl Into<String>, schema: &Value) -> HarnessResult<Self> {
        let name = name.into();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| ContractError::Config(format!("Invalid schema `{name}`: {e}")))?;
        Ok(Self { name, compiled })
    }

    /// The bundled pet schema
    pub fn pet() -> HarnessResult<Self> {
        let schema: Value = serde_json::from_str(PET_SCHEMA_JSON)
            .map_err(|e| ContractError::Config(format!("Bundled pet schema is not JSON: {e}")))?;
        Self::new("pet", &schema)
    }

    /// Schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every violation of `document`; empty when it conforms
    pub fn violations(&self, document: &Value) -> Vec<Violation> {
        match self.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(Violation::from_error).collect(),
        }
    }

    /// `Ok` when `document` conforms, otherwise [`ContractError::SchemaViolation`]
    pub fn validate(&self, document: &Value) -> HarnessResult<()> {
        let violations = self.violations(document);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ContractError::SchemaViolation(violations))
        }
    }
}
