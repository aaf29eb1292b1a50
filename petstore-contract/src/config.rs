//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to deprecated variable names with warning logs, and the harness settings
//! built from them.

use std::str::FromStr;
use std::time::Duration;

use crate::common::{ContractError, HarnessResult};
use crate::types::Inventory;

/// Base URL of the shared demo pet store
pub const DEFAULT_BASE_URL: &str = "http://5.181.109.28:9090/api/v3";

/// デフォルトのリクエストタイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Identifier assumed never to be allocated by the service
pub const DEFAULT_MISSING_ID: i64 = 9999;

/// Order identifier used by the order scenarios
pub const DEFAULT_ORDER_ID: i64 = 1;

/// Inventory of the fixed demo dataset
pub const DEFAULT_EXPECTED_INVENTORY: &str = "approved=57,delivered=50";

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use petstore_contract::config::get_env_with_fallback;
///
/// let base_url = get_env_with_fallback("PETSTORE_BASE_URL", "BASE_URL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Unparsable values fall back to `default` with a warning.
pub fn get_env_with_fallback_parse<T: FromStr>(new_name: &str, old_name: &str, default: T) -> T {
    match get_env_with_fallback(new_name, old_name) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    variable = new_name,
                    value = %raw,
                    "Ignoring unparsable environment variable"
                );
                default
            }
        },
        None => default,
    }
}

/// What the inventory scenario compares the snapshot against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryExpectation {
    /// Snapshot must equal this mapping exactly
    Exact(Inventory),
    /// Only the shape is checked: labels mapped to non-negative counts
    ShapeOnly,
}

impl FromStr for InventoryExpectation {
    type Err = String;

    /// `off` / `none` / `shape` disable the literal check; otherwise a comma
    /// separated `label=count` list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if matches!(
            raw.to_ascii_lowercase().as_str(),
            "off" | "none" | "shape" | ""
        ) {
            return Ok(Self::ShapeOnly);
        }

        let mut expected = Inventory::new();
        for pair in raw.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (label, count) = pair
                .split_once('=')
                .ok_or_else(|| format!("Invalid inventory entry: `{pair}`"))?;
            let label = label.trim();
            if label.is_empty() {
                return Err(format!("Inventory label cannot be empty: `{pair}`"));
            }
            let count: i64 = count
                .trim()
                .parse()
                .map_err(|e| format!("Invalid inventory count in `{pair}`: {e}"))?;
            expected.insert(label.to_string(), count);
        }
        Ok(Self::Exact(expected))
    }
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the service under test (no trailing slash)
    pub base_url: String,
    /// Bound applied to every request
    pub request_timeout: Duration,
    /// Identifier used by the "absent entity" scenarios
    pub missing_id: i64,
    /// Identifier used by the order scenarios
    pub order_id: i64,
    /// Inventory expectation
    pub expected_inventory: InventoryExpectation,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            missing_id: DEFAULT_MISSING_ID,
            order_id: DEFAULT_ORDER_ID,
            expected_inventory: default_inventory_expectation(),
        }
    }
}

impl HarnessConfig {
    /// Load harness configuration from environment variables.
    ///
    /// An unparsable `PETSTORE_EXPECTED_INVENTORY` is a
    /// [`ContractError::Config`]; numeric settings fall back to their
    /// defaults with a warning.
    pub fn from_env() -> HarnessResult<Self> {
        let base_url = get_env_with_fallback_or("PETSTORE_BASE_URL", "BASE_URL", DEFAULT_BASE_URL);
        let timeout_secs = get_env_with_fallback_parse(
            "PETSTORE_TIMEOUT_SECS",
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        );
        let missing_id = get_env_with_fallback_parse(
            "PETSTORE_MISSING_ID",
            "PETSTORE_MISSING_ID",
            DEFAULT_MISSING_ID,
        );
        let order_id =
            get_env_with_fallback_parse("PETSTORE_ORDER_ID", "PETSTORE_ORDER_ID", DEFAULT_ORDER_ID);
        let expected_inventory = match std::env::var("PETSTORE_EXPECTED_INVENTORY") {
            Ok(raw) => raw.parse().map_err(|e| {
                ContractError::Config(format!("PETSTORE_EXPECTED_INVENTORY: {e}"))
            })?,
            Err(_) => default_inventory_expectation(),
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url),
            request_timeout: Duration::from_secs(timeout_secs),
            missing_id,
            order_id,
            expected_inventory,
        })
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the inventory expectation
    pub fn with_expected_inventory(mut self, expectation: InventoryExpectation) -> Self {
        self.expected_inventory = expectation;
        self
    }
}

fn default_inventory_expectation() -> InventoryExpectation {
    // 定数なのでパースは失敗しない
    DEFAULT_EXPECTED_INVENTORY
        .parse()
        .unwrap_or(InventoryExpectation::ShapeOnly)
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
