use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use folio_core::{FolioError, PrintTarget};
use serde_json::json;
use tracing::{debug, info};
use crate::shared::{js, to_folio_error, SessionTiming};
use super::consent::{default_consent_strategies, CookieDismisser, PageConsentStrategy};

pub struct ActionHandler {
    consent: CookieDismisser<Page, Element>,
}

impl ActionHandler {
    pub fn new(timing: SessionTiming) -> Self {
        Self::with_strategies(timing, default_consent_strategies())
    }

    pub fn with_strategies(timing: SessionTiming, strategies: Vec<PageConsentStrategy>) -> Self {
        Self {
            consent: CookieDismisser::new(strategies, &timing),
        }
    }

    /// Clicks the first visible consent control. Returns whether one was clicked.
    pub async fn dismiss_cookie_banner(&self, page: &Page) -> bool {
        self.consent.dismiss(page).await
    }

    /// Strips viewer toolbars and ads and unclips the page scroller.
    /// Running it twice is harmless.
    pub async fn remove_ui_chrome(&self, page: &Page) -> Result<(), FolioError> {
        let js = js::build_js_call(
            js::chrome::REMOVE_UI_CHROME,
            &[json!(js::chrome::UI_CHROME_SELECTORS), json!(js::chrome::SCROLLER_CLASS)],
        );
        let result = page.evaluate(js).await
            .map_err(|e| to_folio_error(e, "RemoveUiChrome"))?;

        if let Some(obj) = result.value().and_then(|v| v.as_object()) {
            let removed = obj.get("removed").and_then(|v| v.as_u64()).unwrap_or(0);
            let scrollers = obj.get("scrollers").and_then(|v| v.as_u64()).unwrap_or(0);
            debug!(removed, scrollers, "UI chrome removed");
        }
        Ok(())
    }

    /// Hands the prepared page to the printer. Returns the PDF path when one
    /// was written.
    pub async fn trigger_print(&self, page: &Page, target: &PrintTarget) -> Result<Option<String>, FolioError> {
        match target {
            PrintTarget::Dialog => {
                page.evaluate(js::build_js_call(js::chrome::OPEN_PRINT_DIALOG, &[])).await
                    .map_err(|e| to_folio_error(e, "Print"))?;
                info!("Print dialog opened");
                Ok(None)
            }
            PrintTarget::Pdf { path } => {
                let params = PrintToPdfParams::builder()
                    .print_background(true)
                    .prefer_css_page_size(true)
                    .build();

                let bytes = page.pdf(params).await
                    .map_err(|e| to_folio_error(e, "PrintToPdf"))?;

                save_pdf(path, &bytes).await.map(Some)
            }
        }
    }
}

async fn save_pdf(path: &str, bytes: &[u8]) -> Result<String, FolioError> {
    tokio::fs::write(path, bytes).await
        .map_err(|e| FolioError::io_error(format!("Failed to save PDF: {}", e))
            .with_context(json!({ "path": path })))?;

    info!(bytes = bytes.len(), "PDF written to {}", path);
    Ok(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ErrorCategory;

    #[tokio::test]
    async fn pdf_bytes_land_at_the_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf").display().to_string();

        let written = save_pdf(&path, b"%PDF-1.7").await.unwrap();

        assert_eq!(written, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn unwritable_pdf_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("doc.pdf").display().to_string();

        let err = save_pdf(&path, b"%PDF-1.7").await.unwrap_err();

        assert_eq!(err.category, ErrorCategory::Io);
        assert_eq!(err.context["path"], path.as_str());
    }
}
