//! レスポンス型

use std::sync::OnceLock;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::{ContractError, HarnessResult};

/// Body of a response, chosen by content type
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// `application/json` (or `+json`) body
    Json(Value),
    /// Anything else, e.g. the plain-text `Pet deleted`
    Text(String),
}

/// One completed request/response pair
///
/// Non-2xx statuses are ordinary values here; callers check `status`
/// themselves.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Request method
    pub method: Method,
    /// Path relative to the base URL
    pub path: String,
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Raw body text
    pub text: String,
    /// Round-trip time in milliseconds
    pub elapsed_ms: u128,
    json: OnceLock<Result<Value, String>>,
}

impl ApiResponse {
    /// Wrap a received response
    pub fn new(
        method: Method,
        path: impl Into<String>,
        status: u16,
        content_type: Option<String>,
        text: String,
        elapsed_ms: u128,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            content_type,
            text,
            elapsed_ms,
            json: OnceLock::new(),
        }
    }

    /// `METHOD /path` label used in error messages and logs
    pub fn context(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the content type announces JSON
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }

    /// Parsed JSON body, computed on first use and cached.
    ///
    /// Fails with [`ContractError::Parse`] when the body is not JSON.
    pub fn json_value(&self) -> HarnessResult<&Value> {
        self.json
            .get_or_init(|| serde_json::from_str(&self.text).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| {
                ContractError::Parse(format!("{} returned a non-JSON body: {e}", self.context()))
            })
    }

    /// Deserialize the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        serde_json::from_str(&self.text).map_err(|e| {
            ContractError::Parse(format!(
                "{} body does not match {}: {e}",
                self.context(),
                std::any::type_name::<T>()
            ))
        })
    }

    /// Body branched on content type
    ///
    /// A JSON content type with a malformed body is a parse error, not text.
    pub fn body(&self) -> HarnessResult<ResponseBody> {
        if self.is_json() {
            Ok(ResponseBody::Json(self.json_value()?.clone()))
        } else {
            Ok(ResponseBody::Text(self.text.clone()))
        }
    }
}
