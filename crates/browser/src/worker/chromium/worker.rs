use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::browser::HeadlessMode;
use chromiumoxide::page::Page;
use folio_core::{
    is_embed_url, report_failure, to_embed_url, BrowserConfig, FolioError, Job, JobResult, JobWorker, LoadReport,
    PrintTarget, VerifyBudgets,
};
use folio_verifier::LoadVerifier;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::actions::ActionHandler;
use super::host::ChromiumHost;
use super::overlay::{PrintStyles, StatusOverlay};
use super::wait::WaitStrategy;
use crate::shared::SessionTiming;

/// A launched browser plus the task pumping its DevTools connection.
///
/// The task ends when the browser goes away, including when the user closes
/// the window. The temporary profile is deleted when the session is dropped.
pub struct BrowserSession {
    pub browser: Browser,
    handler: JoinHandle<()>,
    profile: TempDir,
}

impl BrowserSession {
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        let _ = self.handler.await;
    }

    /// Waits for the user to close the browser.
    pub async fn closed(self) {
        let _ = self.handler.await;
    }
}

fn temp_profile() -> Result<TempDir, FolioError> {
    tempfile::Builder::new()
        .prefix("folio-chromium-")
        .tempdir()
        .map_err(|e| FolioError::io_error(format!("Failed to create temp dir: {}", e)))
}

pub struct ChromiumWorker {
    timing: SessionTiming,
    budgets: VerifyBudgets,
}

impl ChromiumWorker {
    pub fn new() -> Self {
        Self::with_config(SessionTiming::default(), VerifyBudgets::default())
    }

    pub fn with_config(timing: SessionTiming, budgets: VerifyBudgets) -> Self {
        Self { timing, budgets }
    }

    pub async fn launch(config: &BrowserConfig) -> Result<BrowserSession, FolioError> {
        let profile = temp_profile()?;
        debug!("Chromium profile at {}", profile.path().display());

        let mut builder = ChromeConfig::builder()
            .headless_mode(if config.headless { HeadlessMode::True } else { HeadlessMode::False })
            .user_data_dir(profile.path());

        if let (Some(w), Some(h)) = (config.viewport_width, config.viewport_height) {
            builder = builder.window_size(w, h);
        }

        let chrome_cfg = builder.build()
            .map_err(|e| FolioError::config_error(format!("Browser config failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(chrome_cfg).await
            .map_err(|e| FolioError::browser_error(format!("Launch failed: {}", e)))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        Ok(BrowserSession { browser, handler, profile })
    }

    /// Opens `url` in a new tab.
    pub async fn open_tab(browser: &Browser, url: &str) -> Result<Page, FolioError> {
        info!("Opening {}", url);
        browser.new_page(url).await
            .map_err(|e| FolioError::navigation_error(format!("Opening tab failed: {}", e))
                .with_context(serde_json::json!({ "url": url })))
    }

    /// Runs the whole in-page sequence on an open embed page: cookies, page
    /// loading, UI cleanup and print. Failures are shown on the overlay
    /// before being returned.
    pub async fn prepare_and_print(
        &self,
        page: &Page,
        target: &PrintTarget,
    ) -> Result<(LoadReport, Option<String>), FolioError> {
        let overlay = StatusOverlay::create(page).await?;
        let outcome = self.run_steps(page, &overlay, target).await;
        if let Err(e) = &outcome {
            error!("Document preparation failed: {}", e);
        }
        report_failure(&overlay, outcome).await
    }

    async fn run_steps(
        &self,
        page: &Page,
        overlay: &StatusOverlay,
        target: &PrintTarget,
    ) -> Result<(LoadReport, Option<String>), FolioError> {
        let actions = ActionHandler::new(self.timing.clone());

        overlay.update("Waiting for page load...", None).await;
        WaitStrategy::new(self.timing.clone())
            .wait_for_stable(page, self.timing.page_stable)
            .await?;
        sleep(self.timing.initial_load).await;

        overlay.update("Handling cookies...", None).await;
        actions.dismiss_cookie_banner(page).await;

        overlay.update("Loading all pages (this may take a while)...", None).await;
        let host = ChromiumHost::new(
            page.clone(),
            self.budgets.page_selector.clone(),
            WaitStrategy::new(self.timing.clone()),
        );
        let report = LoadVerifier::new(self.budgets.clone()).run(&host, overlay).await?;
        info!(
            total = report.total,
            loaded = report.loaded,
            unloaded = report.unloaded,
            rounds = report.rounds,
            "Pages loaded"
        );

        overlay.update("Cleaning up UI...", None).await;
        actions.remove_ui_chrome(page).await?;

        let ready = match target {
            PrintTarget::Dialog => "Ready! Opening Print Dialog...",
            PrintTarget::Pdf { .. } => "Ready! Saving PDF...",
        };
        overlay.update(ready, Some(100.0)).await;
        sleep(self.timing.print_delay).await;
        overlay.remove().await?;

        let styles = PrintStyles::inject(page).await?;
        let pdf_path = actions.trigger_print(page, target).await?;
        if pdf_path.is_some() {
            styles.remove().await?;
        }

        Ok((report, pdf_path))
    }
}

impl Default for ChromiumWorker {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the job URL to the embed viewer, translating document URLs.
pub fn resolve_embed_url(url: &str) -> Result<String, FolioError> {
    if is_embed_url(url) {
        return Ok(url.trim().to_string());
    }
    Ok(to_embed_url(url)?)
}

#[async_trait]
impl JobWorker for ChromiumWorker {
    async fn execute(&self, job: &Job) -> Result<JobResult, FolioError> {
        // Translate before launching so a bad URL never opens a browser.
        let embed_url = resolve_embed_url(&job.url)?;
        info!("ChromiumWorker: executing job {} ({})", job.id, embed_url);

        let session = Self::launch(&job.browser).await?;
        let outcome = match Self::open_tab(&session.browser, &embed_url).await {
            Ok(page) => self.prepare_and_print(&page, &job.print).await,
            Err(e) => Err(e),
        };

        match (&outcome, &job.print) {
            (Ok(_), PrintTarget::Dialog) => {
                info!("[{}] Waiting for the browser window to close", job.id);
                session.closed().await;
            }
            _ => session.close().await,
        }

        let (report, pdf_path) = outcome?;
        Ok(JobResult {
            job_id: job.id.clone(),
            embed_url,
            report,
            pdf_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ErrorCategory;

    #[test]
    fn embed_urls_pass_through() {
        let url = "https://www.scribd.com/embeds/99/content";
        assert_eq!(resolve_embed_url(url).unwrap(), url);
    }

    #[test]
    fn document_urls_are_translated() {
        assert_eq!(
            resolve_embed_url("https://www.scribd.com/document/123456789/Some-Title").unwrap(),
            "https://www.scribd.com/embeds/123456789/content"
        );
    }

    #[test]
    fn profile_dir_is_removed_on_drop() {
        let profile = temp_profile().unwrap();
        let path = profile.path().to_path_buf();
        assert!(path.is_dir());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("folio-chromium-"));

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn invalid_urls_fail_before_launch() {
        let err = resolve_embed_url("https://example.com/doc/1").unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidUrl);
        assert_eq!(err.message, "Invalid Scribd URL. Must contain /document/ID");
    }
}
