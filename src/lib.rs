//! # pagepack
//!
//! Convert a paginated document (PDF) into per-page PNG images, packed into
//! size-bounded ZIP archives.
//!
//! ## Why this crate?
//!
//! Transports that move documents around — chat platforms, mail gateways,
//! upload endpoints — routinely cap attachment sizes well below what a
//! high-resolution page-image rendition of a long document needs. This crate
//! rasterises every page at a configurable DPI and splits the results into
//! ZIP archives that each stay under a configurable byte bound, without ever
//! reordering pages: every archive is a contiguous, ordered chunk of the
//! document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate path and %PDF magic bytes
//!  ├─ 2. Render   rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Pack     first-fit sequential split into size-bounded ZIPs
//!  └─ 4. Deliver  hand archives to the DeliveryChannel, in part order
//! ```
//!
//! A reporter loop runs concurrently with rendering, polling shared progress
//! state and emitting throttled "Processed X/Y pages" notices through the
//! same delivery channel.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagepack::{run_job, JobConfig, NullDelivery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JobConfig::builder()
//!         .dpi(300)
//!         .max_part_bytes(45 * 1024 * 1024)
//!         .build()?;
//!     let output = run_job("document.pdf", &config, &NullDelivery).await?;
//!     eprintln!(
//!         "{} pages in {} archive part(s)",
//!         output.stats.total_pages,
//!         output.stats.parts
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagepack` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pagepack = { version = "0.3", default-features = false }
//! ```
//!
//! ## Delivery
//!
//! The library never decides where archives end up. Implement
//! [`DeliveryChannel`] for your transport (a chat API, an object store, a
//! directory) and the job will push progress notices and finished archives
//! through it. [`NullDelivery`] discards everything for callers who only
//! want the returned [`JobOutput`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod delivery;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    JobConfig, JobConfigBuilder, DEFAULT_DPI, DEFAULT_MAX_PART_BYTES, DEFAULT_POLL_INTERVAL,
    DEFAULT_PROGRESS_CADENCE,
};
pub use delivery::{DeliveryChannel, DeliveryError, NullDelivery};
pub use error::PagePackError;
pub use job::{run_job, run_job_cancellable, CancelToken};
pub use output::{ArchivePart, JobOutput, JobState, JobStats, RenderedPage};
pub use progress::{ProgressState, RenderProgress};
