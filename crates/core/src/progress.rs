use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::FolioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Fallback,
    FastScroll,
    Verify,
    FinalSweep,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub phase: Phase,
    pub message: String,
    /// Rough completion estimate in percent, when one is known
    pub percent: Option<f64>,
}

impl Progress {
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
            percent: None,
        }
    }

    pub fn with_percent(mut self, percent: f64) -> Self {
        self.percent = Some(percent.clamp(0.0, 100.0));
        self
    }

    /// Error-state update shown when a run aborts.
    pub fn failed(error: &FolioError) -> Self {
        Self::new(Phase::Failed, format!("Error: {}", error.message))
    }
}

/// Receives live progress from a running job.
///
/// Sinks are cosmetic; they cannot fail the run.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, progress: &Progress);
}

pub struct NoopProgress;

#[async_trait]
impl ProgressSink for NoopProgress {
    async fn report(&self, _progress: &Progress) {}
}

/// Writes every update to the `tracing` log.
pub struct LogProgress;

#[async_trait]
impl ProgressSink for LogProgress {
    async fn report(&self, progress: &Progress) {
        match progress.percent {
            Some(p) => info!(phase = ?progress.phase, "{} ({:.0}%)", progress.message, p),
            None => info!(phase = ?progress.phase, "{}", progress.message),
        }
    }
}

/// Passes `result` through unchanged, reporting a failure to `sink` first.
pub async fn report_failure<T, P>(sink: &P, result: Result<T, FolioError>) -> Result<T, FolioError>
where
    P: ProgressSink + ?Sized,
{
    if let Err(e) = &result {
        sink.report(&Progress::failed(e)).await;
    }
    result
}
