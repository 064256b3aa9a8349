use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::page::Page;
use folio_core::{DocumentHost, FolioError, PageSample, ScrollEdge};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::wait::WaitStrategy;
use crate::shared::{js, to_folio_error};

/// [`DocumentHost`] backed by a live Chromium tab.
pub struct ChromiumHost {
    page: Page,
    selector: String,
    wait: WaitStrategy,
}

impl ChromiumHost {
    pub fn new(page: Page, selector: impl Into<String>, wait: WaitStrategy) -> Self {
        Self {
            page,
            selector: selector.into(),
            wait,
        }
    }

    async fn call<T: DeserializeOwned>(&self, func: &str, args: &[Value], action: &str) -> Result<T, FolioError> {
        let result = self
            .page
            .evaluate(js::build_js_call(func, args))
            .await
            .map_err(|e| to_folio_error(e, action))?;
        result
            .into_value::<T>()
            .map_err(|e| FolioError::script_error(format!("{} returned unexpected value: {}", action, e)))
    }
}

#[async_trait]
impl DocumentHost for ChromiumHost {
    async fn discover(&self) -> Result<usize, FolioError> {
        let count: usize = self.call(js::pages::DISCOVER, &[json!(self.selector)], "Discover").await?;
        debug!(selector = %self.selector, count, "discovered pages");
        Ok(count)
    }

    async fn page_count(&self) -> Result<usize, FolioError> {
        self.call(js::pages::COUNT, &[json!(self.selector)], "Count").await
    }

    async fn sample_pages(&self) -> Result<Vec<PageSample>, FolioError> {
        self.call(js::pages::SAMPLE, &[json!(self.selector)], "Sample").await
    }

    async fn scroll_page_into_view(&self, index: usize) -> Result<bool, FolioError> {
        self.call(js::pages::SCROLL_PAGE, &[json!(index)], "Scroll").await
    }

    async fn scroll_batch(&self, range: Range<usize>) -> Result<(), FolioError> {
        let scrolled: usize = self
            .call(js::pages::SCROLL_BATCH, &[json!(range.start), json!(range.end)], "ScrollBatch")
            .await?;
        debug!(start = range.start, end = range.end, scrolled, "batch scrolled");
        Ok(())
    }

    async fn scroll_height(&self) -> Result<f64, FolioError> {
        self.call(js::pages::SCROLL_HEIGHT, &[], "ScrollHeight").await
    }

    async fn scroll_to(&self, edge: ScrollEdge) -> Result<(), FolioError> {
        let edge = match edge {
            ScrollEdge::Top => "top",
            ScrollEdge::Bottom => "bottom",
        };
        let _: bool = self.call(js::pages::SCROLL_TO_EDGE, &[json!(edge)], "ScrollToEdge").await?;
        Ok(())
    }

    async fn settle(&self, budget: Duration) -> Result<(), FolioError> {
        self.wait.settle(&self.page, budget).await
    }
}
