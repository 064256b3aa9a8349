use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ContentPredicate, FolioError};

/// Iteration limits and delays for one verifier run.
///
/// Delays are upper bounds: a host with a readiness signal may return from a
/// settle early, never late.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyBudgets {
    /// CSS selector that discovers page-like elements
    pub page_selector: String,
    pub predicate: ContentPredicate,
    pub max_fallback_attempts: usize,
    pub fallback_stable_checks: usize,
    pub fallback_step_ms: u64,
    pub min_batch_size: usize,
    pub batch_divisor: usize,
    pub batch_delay_ms: u64,
    pub load_settle_ms: u64,
    pub max_rounds: usize,
    pub retry_delay_ms: u64,
    pub round_settle_ms: u64,
    /// Pauses after the bottom, top and bottom scrolls of the final sweep
    pub sweep_delays_ms: [u64; 3],
}

impl Default for VerifyBudgets {
    fn default() -> Self {
        Self {
            page_selector: "[class*='page']".to_string(),
            predicate: ContentPredicate::default(),
            max_fallback_attempts: 200,
            fallback_stable_checks: 3,
            fallback_step_ms: 200,
            min_batch_size: 20,
            batch_divisor: 5,
            batch_delay_ms: 50,
            load_settle_ms: 500,
            max_rounds: 3,
            retry_delay_ms: 300,
            round_settle_ms: 300,
            sweep_delays_ms: [300, 200, 300],
        }
    }
}

impl VerifyBudgets {
    pub fn fast() -> Self {
        Self {
            max_fallback_attempts: 100,
            fallback_step_ms: 100,
            load_settle_ms: 300,
            max_rounds: 2,
            retry_delay_ms: 150,
            round_settle_ms: 150,
            sweep_delays_ms: [150, 100, 150],
            ..Self::default()
        }
    }

    pub fn patient() -> Self {
        Self {
            max_fallback_attempts: 400,
            fallback_step_ms: 400,
            batch_delay_ms: 150,
            load_settle_ms: 1500,
            max_rounds: 5,
            retry_delay_ms: 800,
            round_settle_ms: 600,
            sweep_delays_ms: [600, 400, 600],
            ..Self::default()
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.page_selector = selector.into();
        self
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FolioError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FolioError::io_error(format!("Failed to read budgets: {}", e))
                .with_context(serde_json::json!({ "path": path.display().to_string() }))
        })?;
        let budgets: Self = serde_json::from_str(&raw)
            .map_err(|e| FolioError::config_error(format!("Invalid budgets file: {}", e)))?;
        budgets.validate()?;
        Ok(budgets)
    }

    pub fn validate(&self) -> Result<(), FolioError> {
        if self.page_selector.trim().is_empty() {
            return Err(FolioError::config_error("page_selector must not be empty"));
        }
        if self.min_batch_size == 0 || self.batch_divisor == 0 {
            return Err(FolioError::config_error(
                "min_batch_size and batch_divisor must be at least 1",
            ));
        }
        Ok(())
    }

    /// `max(min_batch_size, total / batch_divisor)`
    pub fn batch_size(&self, total: usize) -> usize {
        self.min_batch_size.max(total / self.batch_divisor.max(1)).max(1)
    }

    /// Longest a run over at most `max_pages` elements can spend waiting.
    ///
    /// Sum of every delay times its iteration ceiling; host call latency is
    /// not included.
    pub fn worst_case_duration(&self, max_pages: usize) -> Duration {
        let batches = max_pages.div_ceil(self.batch_size(max_pages)) as u64;
        let fallback = self.max_fallback_attempts as u64 * self.fallback_step_ms;
        let fast_scroll = batches * self.batch_delay_ms + self.load_settle_ms;
        let rounds = self.max_rounds as u64
            * (max_pages as u64 * self.retry_delay_ms + self.round_settle_ms);
        let sweep: u64 = self.sweep_delays_ms.iter().sum();
        Duration::from_millis(fallback + fast_scroll + rounds + sweep)
    }

    pub fn fallback_step(&self) -> Duration {
        Duration::from_millis(self.fallback_step_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn load_settle(&self) -> Duration {
        Duration::from_millis(self.load_settle_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn round_settle(&self) -> Duration {
        Duration::from_millis(self.round_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_floor_and_ratio() {
        let b = VerifyBudgets::default();
        assert_eq!(b.batch_size(0), 20);
        assert_eq!(b.batch_size(47), 20);
        assert_eq!(b.batch_size(100), 20);
        assert_eq!(b.batch_size(104), 20);
        assert_eq!(b.batch_size(105), 21);
        assert_eq!(b.batch_size(1000), 200);
    }

    #[test]
    fn worst_case_adds_every_budget() {
        let b = VerifyBudgets::default();
        // 200*200 + (3 batches*50 + 500) + 3*(47*300 + 300) + 800
        let expected = 40_000 + 650 + 3 * (14_100 + 300) + 800;
        assert_eq!(b.worst_case_duration(47), Duration::from_millis(expected));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let b: VerifyBudgets = serde_json::from_str(r#"{ "max_rounds": 5, "predicate": { "min_height": 50 } }"#).unwrap();
        assert_eq!(b.max_rounds, 5);
        assert_eq!(b.predicate.min_height, 50.0);
        assert_eq!(b.predicate.min_text_length, 50);
        assert_eq!(b.page_selector, "[class*='page']");
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let b = VerifyBudgets { batch_divisor: 0, ..VerifyBudgets::default() };
        assert!(b.validate().is_err());
        assert!(VerifyBudgets::default().with_selector(" ").validate().is_err());
    }

    #[test]
    fn presets_keep_classification_rules() {
        assert_eq!(VerifyBudgets::fast().predicate, ContentPredicate::default());
        assert!(VerifyBudgets::patient().max_rounds > VerifyBudgets::default().max_rounds);
    }
}
