//! Job orchestration: drive one document through render, pack and delivery.
//!
//! ## Lifecycle
//!
//! `Idle -> Rendering -> Packing -> Delivering -> Done`, with the terminal
//! `Error` state reachable from `Rendering` and `Packing`, and terminal
//! `Aborted` on cancellation. The job boundary is the single catch point for
//! every [`PagePackError`]: a failing job logs the cause, discards its
//! working directory, sends one generic failure notice through the delivery
//! channel and never delivers partial output.
//!
//! ## The reporter loop
//!
//! Rendering runs on a blocking worker; this module concurrently polls the
//! shared [`ProgressState`] on `config.poll_interval` via `tokio::select!`
//! against the pinned render future. Notifications are throttled to one per
//! `progress_cadence` pages of new progress, with one forced notification
//! once rendering completes if the last throttled notice did not already
//! cover the final page count.

use crate::config::JobConfig;
use crate::delivery::DeliveryChannel;
use crate::error::PagePackError;
use crate::output::{ArchivePart, JobOutput, JobState, JobStats};
use crate::pipeline::{input, pack::pack_pages, render::render_document};
use crate::progress::{should_notify, ProgressState, RenderProgress};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

/// Generic user-facing failure notice. Deliberately free of diagnostic
/// detail; the precise cause goes to the log, not the channel.
const FAILURE_NOTICE: &str =
    "I couldn't process this PDF. Please make sure it's a valid document and try again.";

/// Cooperative cancellation signal for a running job.
///
/// Cloning shares the underlying flag. The renderer checks it between pages,
/// so cancellation takes effect after the current page finishes; the job then
/// ends in [`PagePackError::Aborted`] with all partial files discarded.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

/// Bridges renderer callbacks into the shared progress cell, forwarding to
/// the caller's own callback when one is configured.
struct StateProgress {
    shared: Arc<ProgressState>,
    inner: Option<Arc<dyn RenderProgress>>,
}

impl RenderProgress for StateProgress {
    fn on_start(&self, total_pages: usize) {
        self.shared.set_total(total_pages);
        if let Some(ref cb) = self.inner {
            cb.on_start(total_pages);
        }
    }

    fn on_page(&self, pages_done: usize, total_pages: usize) {
        self.shared.record(pages_done);
        if let Some(ref cb) = self.inner {
            cb.on_page(pages_done, total_pages);
        }
    }
}

/// Run one conversion job to completion.
///
/// Equivalent to [`run_job_cancellable`] with a token that never fires.
pub async fn run_job(
    pdf_path: impl AsRef<Path>,
    config: &JobConfig,
    channel: &dyn DeliveryChannel,
) -> Result<JobOutput, PagePackError> {
    run_job_cancellable(pdf_path, config, channel, CancelToken::new()).await
}

/// Run one conversion job with cooperative cancellation.
///
/// On success the archives have already been handed to `channel` in
/// ascending part order; the returned [`JobOutput`] carries their metadata.
/// On failure before the delivery phase the channel receives exactly one
/// failure notice and no files; a failure during delivery stops immediately
/// after the failing part. On cancellation the channel receives nothing
/// further and the result is [`PagePackError::Aborted`].
pub async fn run_job_cancellable(
    pdf_path: impl AsRef<Path>,
    config: &JobConfig,
    channel: &dyn DeliveryChannel,
    cancel: CancelToken,
) -> Result<JobOutput, PagePackError> {
    let pdf_path = pdf_path.as_ref();
    match execute(pdf_path, config, channel, cancel).await {
        Ok(output) => Ok(output),
        Err(PagePackError::Aborted) => {
            info!("Job aborted: {}", pdf_path.display());
            Err(PagePackError::Aborted)
        }
        Err(e) => {
            error!("Job failed for '{}': {e}", pdf_path.display());
            if let Err(notice_err) = channel.send_text(FAILURE_NOTICE).await {
                warn!("Could not deliver failure notice: {notice_err}");
            }
            Err(e)
        }
    }
}

async fn execute(
    pdf_path: &Path,
    config: &JobConfig,
    channel: &dyn DeliveryChannel,
    cancel: CancelToken,
) -> Result<JobOutput, PagePackError> {
    let job_start = Instant::now();
    let mut state = JobState::Idle;

    let pdf = input::resolve_local(pdf_path)?;
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let base = config
        .archive_base
        .clone()
        .unwrap_or_else(|| format!("{stem}_images"));

    // One isolated working area per job, released on every exit path.
    let workdir = TempDir::new().map_err(|e| PagePackError::io(std::env::temp_dir(), e))?;
    let pages_dir = workdir.path().join("pages");
    let archives_dir = workdir.path().join("archives");
    std::fs::create_dir(&pages_dir).map_err(|e| PagePackError::io(&pages_dir, e))?;
    std::fs::create_dir(&archives_dir).map_err(|e| PagePackError::io(&archives_dir, e))?;

    let file_name = pdf
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| stem.clone());
    channel
        .send_text(&format!(
            "Received '{file_name}'. Converting pages to images..."
        ))
        .await?;

    advance(&mut state, JobState::Rendering);
    let shared = ProgressState::new();
    let mut render_cfg = config.clone();
    render_cfg.progress = Some(Arc::new(StateProgress {
        shared: shared.clone(),
        inner: config.progress.clone(),
    }));

    let render_start = Instant::now();
    let render_fut = render_document(&pdf, &pages_dir, &render_cfg, cancel.clone());
    tokio::pin!(render_fut);

    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_notified = 0usize;

    let pages = loop {
        tokio::select! {
            res = &mut render_fut => break res?,
            _ = interval.tick() => {
                let (done, total) = shared.snapshot();
                if total > 0 && should_notify(done, last_notified, config.progress_cadence) {
                    notify_progress(channel, done, total).await;
                    last_notified = done;
                }
            }
        }
    };
    let render_duration = render_start.elapsed();

    let total_pages = pages.len();
    let page_bytes: u64 = pages.iter().map(|p| p.bytes).sum();
    if last_notified < total_pages {
        notify_progress(channel, total_pages, total_pages).await;
    }

    advance(&mut state, JobState::Packing);
    if cancel.is_cancelled() {
        return Err(PagePackError::Aborted);
    }
    let pack_start = Instant::now();
    let parts = {
        let dir = archives_dir.clone();
        let base = base.clone();
        let bound = config.max_part_bytes;
        tokio::task::spawn_blocking(move || pack_pages(&pages, &dir, &base, bound))
            .await
            .map_err(|e| PagePackError::Internal(format!("Pack task panicked: {e}")))??
    };
    let pack_duration = pack_start.elapsed();

    advance(&mut state, JobState::Delivering);
    let part_count = parts.len();
    for part in &parts {
        let caption = part_caption(part, part_count, total_pages, config.dpi);
        channel.send_file(&part.path, &caption).await?;
    }

    advance(&mut state, JobState::Done);
    let stats = JobStats {
        total_pages,
        parts: part_count,
        page_bytes,
        archive_bytes: parts.iter().map(|p| p.archive_bytes).sum(),
        render_duration_ms: render_duration.as_millis() as u64,
        pack_duration_ms: pack_duration.as_millis() as u64,
        total_duration_ms: job_start.elapsed().as_millis() as u64,
    };
    info!(
        "Job finished ({state}): {} pages, {} part(s), {} ms",
        stats.total_pages, stats.parts, stats.total_duration_ms
    );

    Ok(JobOutput { parts, stats })
}

fn advance(state: &mut JobState, next: JobState) {
    debug!("Job state: {state} -> {next}");
    *state = next;
}

/// Send a throttled progress notice; channel hiccups are logged, never fatal.
async fn notify_progress(channel: &dyn DeliveryChannel, done: usize, total: usize) {
    if let Err(e) = channel
        .send_text(&format!("Processed {done}/{total} pages..."))
        .await
    {
        warn!("Progress notice dropped: {e}");
    }
}

/// Caption for one delivered archive: single archives summarise the whole
/// conversion, multi-part archives name their position and page span.
fn part_caption(part: &ArchivePart, part_count: usize, total_pages: usize, dpi: u32) -> String {
    if part_count == 1 {
        format!("Converted {total_pages} page(s) to PNG ({dpi} DPI)")
    } else {
        format!(
            "Part {} of {}: pages {}-{}",
            part.number,
            part_count,
            part.first_page().unwrap_or(0),
            part.last_page().unwrap_or(0)
        )
    }
}
