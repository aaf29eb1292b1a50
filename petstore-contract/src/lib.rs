//! Pet-store contract harness
//!
//! 外部ペットストアREST APIの契約テストハーネス。
//! Scenarios drive a pet-store service through [`client::PetstoreClient`],
//! check statuses, echoed fields and the pet JSON schema, and report each
//! phase to a [`report::ReportSink`].

#![warn(missing_docs)]

/// 共通型定義（エラー型）
pub mod common;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 型定義
pub mod types;

/// HTTPクライアント
pub mod client;

/// JSONスキーマ検証
pub mod schema;

/// レスポンス検証ヘルパー
pub mod expect;

/// フェーズレポート
pub mod report;

/// エンティティフィクスチャ
pub mod fixture;

/// 契約シナリオ
pub mod scenarios;

pub use common::{ContractError, HarnessResult};
pub use scenarios::{run_scenario, run_scenarios, run_suite, ScenarioContext, SuiteReport};
