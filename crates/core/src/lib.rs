use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod budgets;
pub mod embed;
pub mod host;
pub mod page;
pub mod progress;

pub use budgets::VerifyBudgets;
pub use embed::{is_embed_url, to_embed_url, EmbedUrlError};
pub use host::{DocumentHost, ScrollEdge};
pub use page::{ContentPredicate, LoadReport, LoadStatus, PageSample, VerificationRound};
pub use progress::{report_failure, LogProgress, NoopProgress, Phase, Progress, ProgressSink};

/// Where the prepared document goes once every page has been loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PrintTarget {
    /// Open the browser's native print dialog
    Dialog,
    /// Capture the print output to a PDF file
    Pdf { path: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport_width: Some(1280),
            viewport_height: Some(900),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    /// Document URL or an already translated embed URL
    pub url: String,
    pub print: PrintTarget,
    pub browser: BrowserConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub embed_url: String,
    pub report: LoadReport,
    pub pdf_path: Option<String>,
}

/// Error categories for better error handling and reporting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input URL has no recognizable document id
    InvalidUrl,
    /// Navigation or page load errors
    Navigation,
    /// JavaScript execution errors
    ScriptExecution,
    /// Browser/driver errors
    Browser,
    /// Timeout errors
    Timeout,
    /// Bad budgets or options
    Config,
    /// Local file errors (budget files, PDF output)
    Io,
    /// Unknown or uncategorized errors
    Unknown,
}

/// Structured error with context for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioError {
    /// Error category for programmatic handling
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Optional context (URL, selector, action, etc.)
    pub context: serde_json::Value,
    /// Whether running the job again could help
    pub recoverable: bool,
}

impl FolioError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
            recoverable: false,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }

    // Convenience constructors
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InvalidUrl, message)
    }

    pub fn timeout_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message).recoverable()
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ScriptExecution, message)
    }

    pub fn navigation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message).recoverable()
    }

    pub fn browser_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Browser, message)
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Config, message)
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Io, message)
    }
}

impl std::fmt::Display for FolioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.category, self.message)
    }
}

impl std::error::Error for FolioError {}

impl From<EmbedUrlError> for FolioError {
    fn from(e: EmbedUrlError) -> Self {
        let input = match &e {
            EmbedUrlError::Empty => String::new(),
            EmbedUrlError::Invalid { input } => input.clone(),
        };
        FolioError::invalid_url(e.to_string()).with_context(serde_json::json!({ "input": input }))
    }
}

#[async_trait]
pub trait JobWorker: Send + Sync {
    async fn execute(&self, job: &Job) -> Result<JobResult, FolioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_converts_with_context() {
        let err: FolioError = to_embed_url("https://example.com/doc/1").unwrap_err().into();
        assert_eq!(err.category, ErrorCategory::InvalidUrl);
        assert!(!err.recoverable);
        assert_eq!(err.context["input"], "https://example.com/doc/1");
        assert!(err.to_string().starts_with("[InvalidUrl]"));
    }

    #[test]
    fn transient_errors_are_recoverable() {
        assert!(FolioError::timeout_error("slow").recoverable);
        assert!(FolioError::navigation_error("gone").recoverable);
        assert!(!FolioError::script_error("bad").recoverable);
    }
}
