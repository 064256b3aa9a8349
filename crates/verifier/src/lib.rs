//! Drives lazily rendered pages into a loaded state.
//!
//! [`LoadVerifier::run`] works in four strictly ordered phases:
//!
//! 1. fallback scroll, only when no page element exists yet
//! 2. fast batch scroll over every discovered page
//! 3. up to `max_rounds` verification rounds that retry unloaded pages one by one
//! 4. a bottom/top/bottom settle sweep followed by the final classification
//!
//! Pages that never load are reported, not treated as an error. The run holds
//! no resources, so dropping the future at any settle point cancels it.

use std::ops::Range;

use folio_core::{
    DocumentHost, FolioError, LoadReport, LoadStatus, Phase, Progress, ProgressSink, ScrollEdge,
    VerificationRound, VerifyBudgets,
};
use tracing::{debug, info, warn};

/// Splits `0..total` into consecutive ranges of at most `size` elements.
pub fn batch_ranges(total: usize, size: usize) -> impl Iterator<Item = Range<usize>> {
    let size = size.max(1);
    (0..total)
        .step_by(size)
        .map(move |start| start..(start + size).min(total))
}

pub struct LoadVerifier {
    budgets: VerifyBudgets,
}

impl LoadVerifier {
    pub fn new(budgets: VerifyBudgets) -> Self {
        Self { budgets }
    }

    pub async fn run<H, P>(&self, host: &H, progress: &P) -> Result<LoadReport, FolioError>
    where
        H: DocumentHost + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let mut total = host.discover().await?;
        info!("Found {} pages initially", total);

        if total == 0 {
            total = self.fallback_scroll(host, progress).await?;
        }

        let mut rounds = 0;
        if total > 0 {
            total = self.fast_scroll(host, progress, total).await?;
            rounds = self.verify_rounds(host, progress, total).await?.len();
        } else {
            warn!("No pages found after fallback scroll");
        }

        let status = self.final_sweep(host, progress).await?;
        Ok(LoadReport::from_status(&status, rounds))
    }

    /// Classifies every page currently in the document.
    pub async fn classify<H>(&self, host: &H) -> Result<LoadStatus, FolioError>
    where
        H: DocumentHost + ?Sized,
    {
        let samples = host.sample_pages().await?;
        Ok(LoadStatus::classify(&samples, &self.budgets.predicate))
    }

    /// Scrolls to the bottom until the scroll height stops growing, then
    /// discovers again. Some viewers only create page markers after scrolling.
    async fn fallback_scroll<H, P>(&self, host: &H, progress: &P) -> Result<usize, FolioError>
    where
        H: DocumentHost + ?Sized,
        P: ProgressSink + ?Sized,
    {
        progress
            .report(&Progress::new(Phase::Fallback, "No pages found, trying fallback scroll..."))
            .await;

        let mut last_height = host.scroll_height().await?;
        let mut stable = 0;
        for attempt in 0..self.budgets.max_fallback_attempts {
            host.scroll_to(ScrollEdge::Bottom).await?;
            host.settle(self.budgets.fallback_step()).await?;

            let height = host.scroll_height().await?;
            if (height - last_height).abs() < 0.5 {
                stable += 1;
                if stable >= self.budgets.fallback_stable_checks {
                    debug!(attempt, height, "scroll height stable");
                    break;
                }
            } else {
                stable = 0;
            }
            last_height = height;
        }

        let total = host.discover().await?;
        info!("Found {} pages after fallback scroll", total);
        Ok(total)
    }

    /// Brings every page into view batch by batch and returns the page total,
    /// which grows when the list materialized more pages meanwhile.
    async fn fast_scroll<H, P>(&self, host: &H, progress: &P, total: usize) -> Result<usize, FolioError>
    where
        H: DocumentHost + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let size = self.budgets.batch_size(total);
        debug!(total, size, "fast scroll");

        for range in batch_ranges(total, size) {
            let message = format!("Fast Scroll: Pages {}-{} of {}...", range.start + 1, range.end, total);
            let percent = range.start as f64 / total as f64 * 50.0;
            progress
                .report(&Progress::new(Phase::FastScroll, message).with_percent(percent))
                .await;

            host.scroll_batch(range).await?;
            host.settle(self.budgets.batch_delay()).await?;
        }

        host.settle(self.budgets.load_settle()).await?;

        let count = host.page_count().await?;
        if count > total {
            info!("Found {} new pages after fast scroll", count - total);
            return host.discover().await;
        }
        Ok(total)
    }

    /// Retries only the unloaded pages, one at a time, until none are left or
    /// the round budget runs out.
    async fn verify_rounds<H, P>(
        &self,
        host: &H,
        progress: &P,
        total: usize,
    ) -> Result<Vec<VerificationRound>, FolioError>
    where
        H: DocumentHost + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let mut rounds = Vec::new();

        for round in 1..=self.budgets.max_rounds {
            let status = self.classify(host).await?;

            if status.is_complete() {
                let message = format!("All {} pages loaded!", status.total());
                progress.report(&Progress::new(Phase::Verify, message)).await;
                rounds.push(VerificationRound {
                    round,
                    status,
                    retried: Vec::new(),
                });
                break;
            }

            let missing = status.unloaded().len();
            info!(round, missing, total, "retrying unloaded pages");
            let message = format!("Round {}: Reloading {} missing pages...", round, missing);
            let percent = 50.0 + (round - 1) as f64 * 15.0;
            progress
                .report(&Progress::new(Phase::Verify, message).with_percent(percent))
                .await;

            let mut retried = Vec::with_capacity(missing);
            for &index in status.unloaded() {
                if host.scroll_page_into_view(index).await? {
                    host.settle(self.budgets.retry_delay()).await?;
                    retried.push(index);
                } else {
                    debug!(index, "page gone before retry");
                }
            }

            host.settle(self.budgets.round_settle()).await?;
            host.discover().await?;

            rounds.push(VerificationRound {
                round,
                status,
                retried,
            });
        }

        Ok(rounds)
    }

    async fn final_sweep<H, P>(&self, host: &H, progress: &P) -> Result<LoadStatus, FolioError>
    where
        H: DocumentHost + ?Sized,
        P: ProgressSink + ?Sized,
    {
        progress
            .report(&Progress::new(Phase::FinalSweep, "Final verification..."))
            .await;

        let edges = [ScrollEdge::Bottom, ScrollEdge::Top, ScrollEdge::Bottom];
        for (edge, delay_ms) in edges.into_iter().zip(self.budgets.sweep_delays_ms) {
            host.scroll_to(edge).await?;
            host.settle(std::time::Duration::from_millis(delay_ms)).await?;
        }

        let status = self.classify(host).await?;
        let message = format!("Ready! Loaded {}/{} pages.", status.loaded().len(), status.total());
        progress
            .report(&Progress::new(Phase::Done, message).with_percent(100.0))
            .await;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_cover_every_index_once() {
        let ranges: Vec<_> = batch_ranges(47, 20).collect();
        assert_eq!(ranges, vec![0..20, 20..40, 40..47]);
    }

    #[test]
    fn no_batches_for_empty_container() {
        assert_eq!(batch_ranges(0, 20).count(), 0);
    }

    #[test]
    fn zero_size_does_not_panic() {
        assert_eq!(batch_ranges(3, 0).count(), 3);
    }
}
