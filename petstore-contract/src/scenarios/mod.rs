//! Contract scenarios
//!
//! Each scenario is an async function taking a [`ScenarioContext`] and
//! returning `Ok(())` when the service honoured the contract. Scenarios run
//! one request at a time and stop at the first divergence.

pub mod pet;
pub mod store;

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn, Instrument};

use crate::client::PetstoreClient;
use crate::common::{ContractError, HarnessResult};
use crate::config::HarnessConfig;
use crate::report::{SharedSink, Steps, TracingSink};
use crate::schema::SchemaValidator;

/// Every scenario, in suite order
pub const SCENARIOS: &[&str] = &[
    "delete_absent_pet",
    "update_absent_pet",
    "fetch_absent_pet",
    "create_minimal_pet",
    "create_full_pet",
    "fetch_pet_by_id",
    "update_pet",
    "delete_pet",
    "place_order",
    "fetch_order_by_id",
    "delete_order",
    "fetch_absent_order",
    "get_inventory",
];

/// Everything a scenario needs
#[derive(Clone)]
pub struct ScenarioContext {
    /// ハーネス設定
    pub config: HarnessConfig,
    /// HTTPクライアント
    pub client: PetstoreClient,
    /// Compiled pet schema
    pub schema: Arc<SchemaValidator>,
    /// Phase event sink
    pub sink: SharedSink,
}

impl ScenarioContext {
    /// Build a context reporting to the tracing subscriber
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        let client = PetstoreClient::new(&config)?;
        let schema = Arc::new(SchemaValidator::pet()?);
        Ok(Self {
            config,
            client,
            schema,
            sink: Arc::new(TracingSink),
        })
    }

    /// Build a context from environment variables
    pub fn from_env() -> HarnessResult<Self> {
        Self::new(HarnessConfig::from_env()?)
    }

    /// Replace the phase event sink
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Phase narrator for `scenario`
    pub fn steps(&self, scenario: &str) -> Steps {
        Steps::new(scenario, self.sink.clone())
    }
}

/// Names of every scenario, in suite order
pub fn scenario_names() -> &'static [&'static str] {
    SCENARIOS
}

/// Run one scenario by name; `None` for an unknown name
pub async fn run_scenario(ctx: &ScenarioContext, name: &str) -> Option<HarnessResult<()>> {
    let span = tracing::info_span!("scenario", name);
    async {
        match name {
            "delete_absent_pet" => Some(pet::delete_absent_pet(ctx).await),
            "update_absent_pet" => Some(pet::update_absent_pet(ctx).await),
            "fetch_absent_pet" => Some(pet::fetch_absent_pet(ctx).await),
            "create_minimal_pet" => Some(pet::create_minimal_pet(ctx).await),
            "create_full_pet" => Some(pet::create_full_pet(ctx).await),
            "fetch_pet_by_id" => Some(pet::fetch_pet_by_id(ctx).await),
            "update_pet" => Some(pet::update_pet(ctx).await),
            "delete_pet" => Some(pet::delete_pet(ctx).await),
            "place_order" => Some(store::place_order(ctx).await),
            "fetch_order_by_id" => Some(store::fetch_order_by_id(ctx).await),
            "delete_order" => Some(store::delete_order(ctx).await),
            "fetch_absent_order" => Some(store::fetch_absent_order(ctx).await),
            "get_inventory" => Some(store::get_inventory(ctx).await),
            _ => None,
        }
    }
    .instrument(span)
    .await
}

/// Failure of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioFailure {
    /// Error kind label (see `ContractError::kind`)
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// シナリオ名
    pub name: &'static str,
    /// `None` when the scenario passed
    pub failure: Option<ScenarioFailure>,
    /// 所要時間（ミリ秒）
    pub elapsed_ms: u64,
}

impl ScenarioResult {
    /// Whether the scenario passed
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Outcome of a whole suite run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    /// Per-scenario results, in run order
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    /// Number of passed scenarios
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    /// Number of failed scenarios
    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// No scenario failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Results of failed scenarios
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    /// Result of one scenario
    pub fn get(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Run every scenario sequentially
pub async fn run_suite(ctx: &ScenarioContext) -> SuiteReport {
    run_scenarios(ctx, SCENARIOS).await
}

/// Run the named scenarios sequentially
///
/// A name without a scenario behind it is reported as a failed `config`
/// result rather than skipped.
pub async fn run_scenarios(ctx: &ScenarioContext, names: &[&'static str]) -> SuiteReport {
    let mut report = SuiteReport::default();

    for &name in names {
        let started = Instant::now();
        let result = run_scenario(ctx, name).await.unwrap_or_else(|| {
            Err(ContractError::Config(format!("unknown scenario `{name}`")))
        });
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let failure = match result {
            Ok(()) => {
                info!(scenario = name, elapsed_ms, "Scenario passed");
                None
            }
            Err(e) => {
                warn!(scenario = name, elapsed_ms, kind = e.kind(), error = %e, "Scenario failed");
                Some(ScenarioFailure {
                    kind: e.kind(),
                    message: e.to_string(),
                })
            }
        };
        report.results.push(ScenarioResult {
            name,
            failure,
            elapsed_ms,
        });
    }

    info!(
        passed = report.passed(),
        failed = report.failed(),
        "Suite finished"
    );
    report
}
