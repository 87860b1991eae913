//! CLI binary for pagepack.
//!
//! A thin shim over the library crate that maps CLI flags to `JobConfig`,
//! delivers archives into a local directory and prints a summary.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pagepack::{run_job, DeliveryChannel, DeliveryError, JobConfig, JobStats, RenderProgress};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress bar ─────────────────────────────────────────────────────────

/// Terminal progress: a spinner until the page count is known, then a bar
/// advanced at each cadence boundary and at the final page.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RenderProgress for CliProgress {
    fn on_start(&self, total_pages: usize) {
        let bar_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(bar_style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    fn on_page(&self, pages_done: usize, _total_pages: usize) {
        self.bar.set_position(pages_done as u64);
    }
}

// ── Directory-backed delivery ────────────────────────────────────────────────

/// Delivery into a local directory: archives are copied out of the job's
/// working area, progress notices go to the log.
struct DirDelivery {
    out_dir: PathBuf,
    /// Print per-archive lines as they land. Off when the progress bar or
    /// JSON output owns the terminal.
    announce: bool,
    delivered: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl DeliveryChannel for DirDelivery {
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        tracing::info!("{text}");
        Ok(())
    }

    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), DeliveryError> {
        let name = path
            .file_name()
            .ok_or_else(|| DeliveryError::new(format!("Archive has no file name: {path:?}")))?;
        let dest = self.out_dir.join(name);
        tokio::fs::copy(path, &dest)
            .await
            .map_err(|e| DeliveryError::new(format!("Copy to {} failed: {e}", dest.display())))?;

        if self.announce {
            eprintln!("  {}  {}", dim(caption), bold(&dest.display().to_string()));
        }
        self.delivered
            .lock()
            .map_err(|_| DeliveryError::new("Delivery bookkeeping poisoned"))?
            .push(dest);
        Ok(())
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert, archives land in the current directory
  pagepack document.pdf

  # Lower resolution, custom output directory
  pagepack --dpi 300 -o out/ document.pdf

  # Smaller parts for an 8 MB transport limit
  pagepack --max-part-mb 7 document.pdf

  # Machine-readable summary
  pagepack --json document.pdf > summary.json

OUTPUT NAMING:
  A single archive is named {stem}_images.zip. When the size bound forces a
  split, parts are {stem}_images_part1.zip, _part2.zip, … in page order.
  Every part is a contiguous chunk of the document.

ENVIRONMENT VARIABLES:
  PAGEPACK_DPI          Rendering resolution (default 500)
  PAGEPACK_MAX_PART_MB  Archive part size bound in MiB (default 45)
  PAGEPACK_OUTPUT_DIR   Where archives are written (default .)
  PDFIUM_LIB_PATH       Path to an existing libpdfium

SETUP:
  pagepack renders through the pdfium library. Install it system-wide or
  point PDFIUM_LIB_PATH at a libpdfium shared object, e.g. one from
  https://github.com/bblanchon/pdfium-binaries/releases.
"#;

/// Convert a PDF into per-page PNG images packed into size-bounded ZIPs.
#[derive(Parser, Debug)]
#[command(
    name = "pagepack",
    version,
    about = "Convert a PDF into per-page PNG images packed into size-bounded ZIP archives",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory the finished archives are copied into.
    #[arg(short, long, env = "PAGEPACK_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Rendering DPI (72–1200).
    #[arg(long, env = "PAGEPACK_DPI", default_value_t = 500,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: u32,

    /// Maximum cumulative page-image size per archive part, in MiB.
    #[arg(long, env = "PAGEPACK_MAX_PART_MB", default_value_t = 45)]
    max_part_mb: u64,

    /// Pages between progress notifications (and progress-bar updates).
    #[arg(long, env = "PAGEPACK_CADENCE", default_value_t = 50)]
    cadence: usize,

    /// Base name for the archives instead of {input stem}_images.
    #[arg(long, env = "PAGEPACK_BASE")]
    base: Option<String>,

    /// Output a structured JSON summary instead of the human-readable one.
    #[arg(long, env = "PAGEPACK_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PAGEPACK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAGEPACK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAGEPACK_QUIET")]
    quiet: bool,
}

/// JSON summary printed with `--json`: delivered archive paths plus stats.
#[derive(Serialize)]
struct Summary<'a> {
    archives: &'a [PathBuf],
    stats: &'a JobStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level feedback; verbose wins overall.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    std::fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            cli.output_dir.display()
        )
    })?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgress::new())
    } else {
        None
    };

    let mut builder = JobConfig::builder()
        .dpi(cli.dpi)
        .max_part_bytes(cli.max_part_mb * 1024 * 1024)
        .progress_cadence(cli.cadence);
    if let Some(ref base) = cli.base {
        builder = builder.archive_base(base.clone());
    }
    if let Some(ref cb) = progress {
        builder = builder.progress(cb.clone() as Arc<dyn RenderProgress>);
    }
    let config = builder.build().context("Invalid configuration")?;

    let delivery = DirDelivery {
        out_dir: cli.output_dir.clone(),
        announce: !cli.quiet && !cli.json && !show_progress,
        delivered: Mutex::new(Vec::new()),
    };

    // ── Run the job ──────────────────────────────────────────────────────
    let result = run_job(&cli.input, &config, &delivery).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }
    let output = result.context("Conversion failed")?;

    let delivered = delivery
        .delivered
        .lock()
        .map_err(|_| anyhow::anyhow!("Delivery bookkeeping poisoned"))?
        .clone();

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        let summary = Summary {
            archives: &delivered,
            stats: &output.stats,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{} {} pages → {} archive(s) in {}ms",
            green("✔"),
            bold(&output.stats.total_pages.to_string()),
            output.stats.parts,
            output.stats.total_duration_ms,
        );
        for path in &delivered {
            eprintln!("   {}", bold(&path.display().to_string()));
        }
    }

    Ok(())
}
