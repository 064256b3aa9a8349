//! Page decorations owned through explicit handles.
//!
//! Each handle gets a unique element id, so repeated runs on one tab never
//! pick up a previous run's nodes, and `remove` takes exactly what `create`
//! added.

use async_trait::async_trait;
use chromiumoxide::page::Page;
use folio_core::{FolioError, LogProgress, Progress, ProgressSink};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::shared::{js, to_folio_error};

const OVERLAY_TITLE: &str = "Folio";

fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

async fn remove_by_id(page: &Page, id: &str) -> Result<bool, FolioError> {
    let result = page
        .evaluate(js::build_js_call(js::dom::REMOVE_BY_ID, &[json!(id)]))
        .await
        .map_err(|e| to_folio_error(e, "Remove"))?;
    Ok(result.value().and_then(|v| v.as_bool()).unwrap_or(false))
}

/// Floating status box shown on the document while a job runs.
pub struct StatusOverlay {
    page: Page,
    id: String,
}

impl StatusOverlay {
    pub async fn create(page: &Page) -> Result<Self, FolioError> {
        let id = unique_id("folio-overlay");
        page.evaluate(js::build_js_call(js::overlay::CREATE_OVERLAY, &[json!(id), json!(OVERLAY_TITLE)]))
            .await
            .map_err(|e| to_folio_error(e, "CreateOverlay"))?;
        Ok(Self { page: page.clone(), id })
    }

    /// Best effort; a failed update is logged and otherwise ignored.
    pub async fn update(&self, text: &str, percent: Option<f64>) {
        let js = js::build_js_call(js::overlay::UPDATE_OVERLAY, &[json!(self.id), json!(text), json!(percent)]);
        if let Err(e) = self.page.evaluate(js).await {
            warn!("Overlay update failed: {}", e);
        }
    }

    /// Removes the overlay node. Safe to call more than once.
    pub async fn remove(&self) -> Result<(), FolioError> {
        remove_by_id(&self.page, &self.id).await.map(|_| ())
    }
}

#[async_trait]
impl ProgressSink for StatusOverlay {
    async fn report(&self, progress: &Progress) {
        LogProgress.report(progress).await;
        self.update(&progress.message, progress.percent).await;
    }
}

/// `@media print` overrides installed right before printing.
pub struct PrintStyles {
    page: Page,
    id: String,
}

impl PrintStyles {
    pub async fn inject(page: &Page) -> Result<Self, FolioError> {
        let id = unique_id("folio-print");
        page.evaluate(js::build_js_call(js::dom::INJECT_STYLE, &[json!(id), json!(js::chrome::PRINT_CSS)]))
            .await
            .map_err(|e| to_folio_error(e, "InjectPrintStyles"))?;
        Ok(Self { page: page.clone(), id })
    }

    pub async fn remove(self) -> Result<(), FolioError> {
        remove_by_id(&self.page, &self.id).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_per_handle() {
        let a = unique_id("folio-overlay");
        let b = unique_id("folio-overlay");
        assert_ne!(a, b);
        assert!(a.starts_with("folio-overlay-"));
        assert_eq!(a.len(), "folio-overlay-".len() + 32);
    }
}
