//! ロギング初期化ユーティリティ
//!
//! `PETSTORE_LOG_LEVEL`、未設定なら `RUST_LOG` からフィルタを構築する。

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Harness-specific filter variable
const LOG_LEVEL_ENV: &str = "PETSTORE_LOG_LEVEL";

/// Default filter directive
const DEFAULT_LOG_LEVEL: &str = "info";

/// Filter directive in effect: `PETSTORE_LOG_LEVEL`, then `RUST_LOG`, then `info`
fn log_directive() -> String {
    std::env::var(LOG_LEVEL_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_new(log_directive()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global tracing subscriber.
///
/// Fails when a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter())
        .try_init()
}

/// Install a subscriber whose output is captured by the test harness.
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(env_filter())
        .try_init();
}
