use chromiumoxide::page::Page;
use folio_core::FolioError;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use crate::shared::{js, to_folio_error, SessionTiming, SettleMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observation {
    Changed,
    Quiet,
}

/// Exponential backoff over DOM mutation checks.
///
/// Tracks how long the page has been quiet and how long to wait before the
/// next check: every quiet check doubles the interval up to `max`, any change
/// resets it.
#[derive(Debug)]
struct QuietTracker {
    initial: Duration,
    max: Duration,
    interval: Duration,
    quiet_since: Instant,
}

impl QuietTracker {
    fn new(initial: Duration, max: Duration, now: Instant) -> Self {
        Self {
            initial,
            max,
            interval: initial,
            quiet_since: now,
        }
    }

    fn observe(&mut self, observation: Observation, now: Instant) {
        match observation {
            Observation::Changed => {
                self.quiet_since = now;
                self.interval = self.initial;
            }
            Observation::Quiet => {
                self.interval = (self.interval * 2).min(self.max);
            }
        }
    }

    fn quiet_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.quiet_since)
    }
}

pub struct WaitStrategy {
    config: SessionTiming,
}

impl WaitStrategy {
    pub fn new(config: SessionTiming) -> Self {
        Self { config }
    }

    /// Waits at most `budget` for the page to render.
    ///
    /// In observed mode this returns as soon as no DOM mutation has been seen
    /// for the quiet window. Budgets not longer than the quiet window, and
    /// pages where the counter cannot be read, fall back to a plain sleep.
    pub async fn settle(&self, page: &Page, budget: Duration) -> Result<(), FolioError> {
        if self.config.settle_mode == SettleMode::Fixed || budget <= self.config.quiet_window {
            sleep(budget).await;
            return Ok(());
        }

        let start = Instant::now();
        let deadline = start + budget;
        let Some(mut last) = self.mutation_count(page).await else {
            sleep(deadline.saturating_duration_since(Instant::now())).await;
            return Ok(());
        };

        let mut tracker = QuietTracker::new(self.config.poll_initial, self.config.poll_max, start);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            sleep(tracker.interval.min(remaining)).await;

            let Some(count) = self.mutation_count(page).await else {
                sleep(deadline.saturating_duration_since(Instant::now())).await;
                return Ok(());
            };

            let now = Instant::now();
            if count != last {
                last = count;
                tracker.observe(Observation::Changed, now);
            } else {
                tracker.observe(Observation::Quiet, now);
                if tracker.quiet_for(now) >= self.config.quiet_window {
                    debug!(
                        budget_ms = budget.as_millis() as u64,
                        waited_ms = now.duration_since(start).as_millis() as u64,
                        "page settled early"
                    );
                    return Ok(());
                }
            }
        }
    }

    async fn mutation_count(&self, page: &Page) -> Option<u64> {
        let js = js::build_js_call(js::wait::MUTATION_COUNT, &[]);
        match page.evaluate(js).await {
            Ok(result) => result.into_value::<u64>().ok(),
            Err(e) => {
                warn!("Mutation counter unavailable: {}", e);
                None
            }
        }
    }

    /// Polls until the document is complete with no pending resources for
    /// five checks in a row. Gives up quietly after `timeout`.
    pub async fn wait_for_stable(&self, page: &Page, timeout: Duration) -> Result<(), FolioError> {
        let start = Instant::now();
        let mut stable_checks = 0;
        let required_stable_checks = 5;

        debug!("Waiting for page to stabilize...");

        loop {
            let js = js::build_js_call(js::wait::CHECK_LOADING, &[]);

            let result = match page.evaluate(js).await {
                Ok(r) => r,
                Err(e) => {
                    let err_str = e.to_string();
                    if err_str.contains("Cannot find context") || err_str.contains("Execution context was destroyed") {
                        debug!("Page context changed (navigating), waiting...");
                        stable_checks = 0;
                        sleep(Duration::from_millis(1000)).await;
                        continue;
                    }
                    return Err(to_folio_error(e, "WaitForStable"));
                }
            };

            if let Some(obj) = result.value().and_then(|v| v.as_object()) {
                let ready = obj.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                let active = obj.get("activeRequests").and_then(|v| v.as_u64()).unwrap_or(0);

                if ready && active == 0 {
                    stable_checks += 1;
                    if stable_checks >= required_stable_checks {
                        info!("Page stabilized ({}ms)", start.elapsed().as_millis());
                        return Ok(());
                    }
                } else {
                    if stable_checks > 0 {
                        debug!(ready, active, "Page activity detected, resetting");
                    }
                    stable_checks = 0;
                }
            }

            if start.elapsed() > timeout {
                warn!("Page stabilization timeout, continuing anyway");
                return Ok(());
            }

            sleep(self.config.check_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_until_capped() {
        let start = Instant::now();
        let mut t = QuietTracker::new(Duration::from_millis(25), Duration::from_millis(150), start);
        let intervals: Vec<u64> = (0..4)
            .map(|_| {
                t.observe(Observation::Quiet, start);
                t.interval.as_millis() as u64
            })
            .collect();
        assert_eq!(intervals, vec![50, 100, 150, 150]);
    }

    #[tokio::test(start_paused = true)]
    async fn changes_reset_interval_and_quiet_time() {
        let start = Instant::now();
        let mut t = QuietTracker::new(Duration::from_millis(25), Duration::from_millis(400), start);
        t.observe(Observation::Quiet, start);
        t.observe(Observation::Quiet, start);

        tokio::time::advance(Duration::from_millis(120)).await;
        let now = Instant::now();
        assert_eq!(t.quiet_for(now), Duration::from_millis(120));

        t.observe(Observation::Changed, now);
        assert_eq!(t.interval, Duration::from_millis(25));
        assert_eq!(t.quiet_for(now), Duration::ZERO);
    }
}
