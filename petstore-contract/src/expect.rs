//! Response expectations
//!
//! Each check returns the typed error naming the status or field that
//! diverged, so a scenario can `?` straight through it.

use serde::Serialize;
use serde_json::Value;

use crate::client::ApiResponse;
use crate::common::{ContractError, HarnessResult};

/// Status code must equal `expected`
pub fn status(response: &ApiResponse, expected: u16) -> HarnessResult<()> {
    if response.status == expected {
        Ok(())
    } else {
        Err(ContractError::unexpected_status(
            response.context(),
            expected,
            response.status,
            &response.text,
        ))
    }
}

/// Raw body must equal `expected` exactly (plain-text endpoints)
pub fn text(response: &ApiResponse, expected: &str) -> HarnessResult<()> {
    if response.text == expected {
        Ok(())
    } else {
        Err(ContractError::field_mismatch(
            "body",
            Value::String(expected.to_string()),
            Value::String(response.text.clone()),
        ))
    }
}

/// `document[field]` must equal `expected`; a missing field reads as `null`
pub fn field(document: &Value, name: &str, expected: &Value) -> HarnessResult<()> {
    let actual = document.get(name).unwrap_or(&Value::Null);
    if actual == expected {
        Ok(())
    } else {
        Err(ContractError::field_mismatch(
            name,
            expected.clone(),
            actual.clone(),
        ))
    }
}

/// Every top-level field of `submitted` must come back unchanged in `document`
///
/// Fields the service adds on its own are ignored. The first divergent field
/// (in key order) is reported.
pub fn echoes<T: Serialize + ?Sized>(submitted: &T, document: &Value) -> HarnessResult<()> {
    let submitted = serde_json::to_value(submitted)?;
    match submitted {
        Value::Object(fields) => {
            for (name, expected) in &fields {
                field(document, name, expected)?;
            }
            Ok(())
        }
        other => {
            if &other == document {
                Ok(())
            } else {
                Err(ContractError::field_mismatch("(document)", other, document.clone()))
            }
        }
    }
}

/// Whole document must equal `expected`
pub fn document(document: &Value, expected: &Value) -> HarnessResult<()> {
    if document == expected {
        Ok(())
    } else {
        Err(ContractError::field_mismatch(
            "(document)",
            expected.clone(),
            document.clone(),
        ))
    }
}
