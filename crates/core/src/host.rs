use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;

use crate::{FolioError, PageSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEdge {
    Top,
    Bottom,
}

/// Everything the load verifier needs from the page it works on.
///
/// Hosts keep a snapshot of page elements: [`discover`](Self::discover)
/// refreshes it and the scroll-by-index calls resolve against it, while
/// [`page_count`](Self::page_count) and [`sample_pages`](Self::sample_pages)
/// always query fresh. Query failures inside the page (bad selectors, missing
/// nodes) should come back as "nothing found"; an `Err` means the host itself
/// is gone.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Re-queries page elements, replaces the snapshot and returns its size.
    async fn discover(&self) -> Result<usize, FolioError>;

    /// Counts page elements without touching the snapshot.
    async fn page_count(&self) -> Result<usize, FolioError>;

    async fn sample_pages(&self) -> Result<Vec<PageSample>, FolioError>;

    /// Scrolls one snapshot element into view. `false` if the index is gone.
    async fn scroll_page_into_view(&self, index: usize) -> Result<bool, FolioError>;

    /// Scrolls every snapshot element in `range` into view, in order.
    async fn scroll_batch(&self, range: Range<usize>) -> Result<(), FolioError> {
        for index in range {
            self.scroll_page_into_view(index).await?;
        }
        Ok(())
    }

    async fn scroll_height(&self) -> Result<f64, FolioError>;

    async fn scroll_to(&self, edge: ScrollEdge) -> Result<(), FolioError>;

    /// Gives the page a chance to render. Must return within `budget`.
    async fn settle(&self, budget: Duration) -> Result<(), FolioError>;
}
