//! フェーズレポート
//!
//! Scenarios are narrated as named phases ("send create request", "check
//! status", ...). Every finished phase is published to a [`ReportSink`] as a
//! [`PhaseEvent`]; assertion logic never depends on what the sink does.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::common::HarnessResult;

/// イベントバスのチャネル容量
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Outcome of one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum PhaseOutcome {
    /// Phase completed
    Passed,
    /// Phase failed with the given message
    Failed(String),
}

impl PhaseOutcome {
    /// Whether the phase passed
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Finished phase
#[derive(Debug, Clone, Serialize)]
pub struct PhaseEvent {
    /// シナリオ名
    pub scenario: String,
    /// フェーズ名
    pub phase: String,
    /// 結果
    #[serde(flatten)]
    pub outcome: PhaseOutcome,
    /// 所要時間（ミリ秒）
    pub elapsed_ms: u64,
    /// 完了時刻
    pub finished_at: DateTime<Utc>,
}

/// Receiver of phase events
pub trait ReportSink: Send + Sync {
    /// Record one finished phase
    fn record(&self, event: PhaseEvent);
}

/// Shared sink handle
pub type SharedSink = Arc<dyn ReportSink>;

/// Writes phase events to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn record(&self, event: PhaseEvent) {
        match &event.outcome {
            PhaseOutcome::Passed => info!(
                scenario = %event.scenario,
                phase = %event.phase,
                elapsed_ms = event.elapsed_ms,
                "Phase passed"
            ),
            PhaseOutcome::Failed(reason) => warn!(
                scenario = %event.scenario,
                phase = %event.phase,
                elapsed_ms = event.elapsed_ms,
                reason = %reason,
                "Phase failed"
            ),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<PhaseEvent>>>,
}

impl MemorySink {
    /// 新しいシンクを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first
    pub fn events(&self) -> Vec<PhaseEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Events of one scenario
    pub fn events_for(&self, scenario: &str) -> Vec<PhaseEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.scenario == scenario)
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn record(&self, event: PhaseEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

/// Broadcasts phase events to any number of subscribers
#[derive(Clone)]
pub struct PhaseEventBus {
    sender: broadcast::Sender<PhaseEvent>,
}

impl Default for PhaseEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseEventBus {
    /// 新しいイベントバスを作成
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// イベントバスを購読
    pub fn subscribe(&self) -> broadcast::Receiver<PhaseEvent> {
        self.sender.subscribe()
    }

    /// 現在の購読者数を取得
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ReportSink for PhaseEventBus {
    fn record(&self, event: PhaseEvent) {
        // 購読者がいない場合は送信に失敗するが、無視する
        let _ = self.sender.send(event);
    }
}

/// Fans one event out to several sinks
pub struct FanoutSink {
    sinks: Vec<SharedSink>,
}

impl FanoutSink {
    /// Combine sinks
    pub fn new(sinks: Vec<SharedSink>) -> Self {
        Self { sinks }
    }
}

impl ReportSink for FanoutSink {
    fn record(&self, event: PhaseEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}

/// Phase narrator for one scenario
#[derive(Clone)]
pub struct Steps {
    scenario: String,
    sink: SharedSink,
}

impl Steps {
    /// Narrate `scenario` into `sink`
    pub fn new(scenario: impl Into<String>, sink: SharedSink) -> Self {
        Self {
            scenario: scenario.into(),
            sink,
        }
    }

    /// シナリオ名
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Run an async phase and report its outcome
    pub async fn step<T, F>(&self, phase: &str, fut: F) -> HarnessResult<T>
    where
        F: Future<Output = HarnessResult<T>>,
    {
        let started = Instant::now();
        let result = fut.await;
        self.emit(phase, started, &result);
        result
    }

    /// Run a synchronous phase (typically assertions) and report its outcome
    pub fn check<T>(&self, phase: &str, f: impl FnOnce() -> HarnessResult<T>) -> HarnessResult<T> {
        let started = Instant::now();
        let result = f();
        self.emit(phase, started, &result);
        result
    }

    fn emit<T>(&self, phase: &str, started: Instant, result: &HarnessResult<T>) {
        let outcome = match result {
            Ok(_) => PhaseOutcome::Passed,
            Err(e) => PhaseOutcome::Failed(e.to_string()),
        };
        self.sink.record(PhaseEvent {
            scenario: self.scenario.clone(),
            phase: phase.to_string(),
            outcome,
            elapsed_ms: started.elapsed().as_millis() as u64,
            finished_at: Utc::now(),
        });
    }
}
