use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use folio_browser::{resolve_embed_url, ChromiumWorker, SessionTiming, SettleMode};
use folio_core::{BrowserConfig, Job, JobResult, JobWorker, PrintTarget, VerifyBudgets};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    Default,
    Fast,
    Patient,
}

#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(about = "Load every page of an embedded document and print it")]
#[command(version)]
struct Cli {
    /// Document URL (…/document/<id>/…) or embed URL
    url: String,

    /// Write a PDF here instead of opening the print dialog (runs headless)
    #[arg(long, value_name = "PATH")]
    pdf: Option<PathBuf>,

    /// Timing preset for delays and retry budgets
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// JSON file with verifier budgets (overrides the preset's budgets)
    #[arg(long, value_name = "FILE")]
    budgets: Option<PathBuf>,

    /// CSS selector for page elements
    #[arg(long, value_name = "CSS")]
    selector: Option<String>,

    /// Maximum verification rounds
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Always sleep the full delay instead of waiting for the DOM to go quiet
    #[arg(long)]
    fixed_delays: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    fn timing(&self) -> SessionTiming {
        let timing = match self.preset {
            Preset::Default => SessionTiming::default(),
            Preset::Fast => SessionTiming::fast(),
            Preset::Patient => SessionTiming::patient(),
        };
        if self.fixed_delays {
            timing.with_settle_mode(SettleMode::Fixed)
        } else {
            timing
        }
    }

    fn budgets(&self) -> anyhow::Result<VerifyBudgets> {
        let mut budgets = match &self.budgets {
            Some(path) => VerifyBudgets::from_json_file(path)
                .with_context(|| format!("loading budgets from {}", path.display()))?,
            None => match self.preset {
                Preset::Default => VerifyBudgets::default(),
                Preset::Fast => VerifyBudgets::fast(),
                Preset::Patient => VerifyBudgets::patient(),
            },
        };
        if let Some(selector) = &self.selector {
            budgets = budgets.with_selector(selector.clone());
        }
        if let Some(rounds) = self.max_rounds {
            budgets.max_rounds = rounds;
        }
        budgets.validate()?;
        Ok(budgets)
    }

    fn job(&self) -> Job {
        let print = match &self.pdf {
            Some(path) => PrintTarget::Pdf {
                path: path.display().to_string(),
            },
            None => PrintTarget::Dialog,
        };
        let id = uuid::Uuid::new_v4().simple().to_string();
        Job {
            id: format!("job-{}", &id[..8]),
            url: self.url.clone(),
            browser: BrowserConfig {
                // printToPDF is only available headless, the dialog needs a window
                headless: self.pdf.is_some(),
                ..BrowserConfig::default()
            },
            print,
        }
    }
}

fn print_result(result: &JobResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let report = &result.report;
    let mark = if report.unloaded == 0 { "✓" } else { "!" };
    println!("{} Loaded {}/{} pages", mark, report.loaded, report.total);
    println!("  Embed URL: {}", result.embed_url);
    println!("  Verification rounds: {}", report.rounds);
    if report.unloaded > 0 {
        println!("  Still unloaded: {}", report.unloaded);
    }
    if let Some(path) = &result.pdf_path {
        println!("  PDF: {}", path);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = resolve_embed_url(&cli.url) {
        eprintln!("Error: {}", e.message);
        process::exit(2);
    }

    let budgets = cli.budgets()?;
    let job = cli.job();
    let worker = ChromiumWorker::with_config(cli.timing(), budgets);

    info!("Running {} for {}", job.id, job.url);
    // Dropping the unfinished job future cancels it and tears the browser down.
    let result = tokio::select! {
        result = worker.execute(&job) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let Some(result) = result else {
        warn!("Interrupted, browser closed");
        process::exit(130);
    };

    match result {
        Ok(result) => print_result(&result, cli.json),
        Err(e) => {
            eprintln!("✗ {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("folio").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn dialog_job_runs_with_a_window() {
        let cli = parse(&["https://www.scribd.com/document/1/x"]);
        let job = cli.job();
        assert_eq!(job.print, PrintTarget::Dialog);
        assert!(!job.browser.headless);
        assert!(job.id.starts_with("job-"));
    }

    #[test]
    fn pdf_job_runs_headless() {
        let cli = parse(&["--pdf", "out.pdf", "https://www.scribd.com/document/1/x"]);
        let job = cli.job();
        assert_eq!(job.print, PrintTarget::Pdf { path: "out.pdf".to_string() });
        assert!(job.browser.headless);
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let cli = parse(&[
            "--preset", "patient", "--selector", ".page", "--max-rounds", "7", "--fixed-delays",
            "https://www.scribd.com/document/1/x",
        ]);
        let budgets = cli.budgets().unwrap();
        assert_eq!(budgets.page_selector, ".page");
        assert_eq!(budgets.max_rounds, 7);
        assert_eq!(budgets.load_settle_ms, VerifyBudgets::patient().load_settle_ms);
        assert_eq!(cli.timing().settle_mode, SettleMode::Fixed);
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(parse(&["u"]).log_level(), "warn");
        assert_eq!(parse(&["-vv", "u"]).log_level(), "debug");
        assert_eq!(parse(&["-q", "-v", "u"]).log_level(), "error");
    }

    #[test]
    fn missing_budget_file_is_reported() {
        let cli = parse(&["--budgets", "/nonexistent/budgets.json", "u"]);
        let err = cli.budgets().unwrap_err();
        assert!(format!("{:#}", err).contains("loading budgets"));
    }
}
