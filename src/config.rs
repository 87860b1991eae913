//! Configuration for a document-processing job.
//!
//! All behaviour is controlled through [`JobConfig`], built via its
//! [`JobConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across jobs and log the settings a run used.
//!
//! The poll interval and progress cadence are tuning constants inherited
//! from the original deployment, not contracts — both are plain fields for
//! callers to adjust.

use crate::error::PagePackError;
use crate::progress::RenderProgress;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default rendering resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 500;

/// Default maximum archive-part size: 45 MiB, chosen to stay under a 50 MiB
/// transport limit with margin for zip headers.
pub const DEFAULT_MAX_PART_BYTES: u64 = 45 * 1024 * 1024;

/// Default progress cadence: one notification per 50 rendered pages.
pub const DEFAULT_PROGRESS_CADENCE: usize = 50;

/// Default reporter poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Configuration for one conversion job.
///
/// Built via [`JobConfig::builder()`] or [`JobConfig::default()`].
///
/// # Example
/// ```rust
/// use pagepack::JobConfig;
///
/// let config = JobConfig::builder()
///     .dpi(300)
///     .max_part_bytes(10 * 1024 * 1024)
///     .progress_cadence(25)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct JobConfig {
    /// Rendering DPI applied to both axes. Range: 72–1200. Default: 500.
    ///
    /// 500 DPI produces images sharp enough to read fine print; lower it for
    /// very large page formats where file size matters more.
    pub dpi: u32,

    /// Maximum cumulative member size per archive part, in bytes.
    /// Default: 45 MiB.
    ///
    /// A single page larger than this bound is placed alone in its own part
    /// rather than rejected.
    pub max_part_bytes: u64,

    /// Pages between progress notifications. Default: 50.
    pub progress_cadence: usize,

    /// How often the reporter polls renderer progress. Default: 3 s.
    pub poll_interval: Duration,

    /// Base name for output archives. Default: `{input stem}_images`.
    ///
    /// A single-part result is named `{base}.zip`; multi-part results are
    /// `{base}_part{N}.zip`.
    pub archive_base: Option<String>,

    /// Optional renderer progress callback, fired at cadence boundaries.
    pub progress: Option<Arc<dyn RenderProgress>>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
            progress_cadence: DEFAULT_PROGRESS_CADENCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            archive_base: None,
            progress: None,
        }
    }
}

impl fmt::Debug for JobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobConfig")
            .field("dpi", &self.dpi)
            .field("max_part_bytes", &self.max_part_bytes)
            .field("progress_cadence", &self.progress_cadence)
            .field("poll_interval", &self.poll_interval)
            .field("archive_base", &self.archive_base)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn RenderProgress>"))
            .finish()
    }
}

impl JobConfig {
    /// Create a new builder for `JobConfig`.
    pub fn builder() -> JobConfigBuilder {
        JobConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`JobConfig`].
#[derive(Debug)]
pub struct JobConfigBuilder {
    config: JobConfig,
}

impl JobConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 1200);
        self
    }

    pub fn max_part_bytes(mut self, bytes: u64) -> Self {
        self.config.max_part_bytes = bytes.max(1);
        self
    }

    pub fn progress_cadence(mut self, pages: usize) -> Self {
        self.config.progress_cadence = pages.max(1);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn archive_base(mut self, base: impl Into<String>) -> Self {
        self.config.archive_base = Some(base.into());
        self
    }

    pub fn progress(mut self, progress: Arc<dyn RenderProgress>) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<JobConfig, PagePackError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 1200 {
            return Err(PagePackError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                c.dpi
            )));
        }
        if c.max_part_bytes == 0 {
            return Err(PagePackError::InvalidConfig(
                "max_part_bytes must be ≥ 1".into(),
            ));
        }
        if c.progress_cadence == 0 {
            return Err(PagePackError::InvalidConfig(
                "progress_cadence must be ≥ 1".into(),
            ));
        }
        if c.poll_interval.is_zero() {
            return Err(PagePackError::InvalidConfig(
                "poll_interval must be non-zero".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = JobConfig::default();
        assert_eq!(c.dpi, 500);
        assert_eq!(c.max_part_bytes, 47_185_920);
        assert_eq!(c.progress_cadence, 50);
        assert_eq!(c.poll_interval, Duration::from_secs(3));
        assert!(c.archive_base.is_none());
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = JobConfig::builder().dpi(10).build().unwrap();
        assert_eq!(c.dpi, 72);
        let c = JobConfig::builder().dpi(9000).build().unwrap();
        assert_eq!(c.dpi, 1200);
    }

    #[test]
    fn builder_clamps_cadence_and_bound() {
        let c = JobConfig::builder()
            .progress_cadence(0)
            .max_part_bytes(0)
            .build()
            .unwrap();
        assert_eq!(c.progress_cadence, 1);
        assert_eq!(c.max_part_bytes, 1);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = JobConfig::builder()
            .poll_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn debug_does_not_require_progress_debug() {
        struct Silent;
        impl crate::progress::RenderProgress for Silent {}
        let c = JobConfig::builder()
            .progress(Arc::new(Silent))
            .build()
            .unwrap();
        let s = format!("{c:?}");
        assert!(s.contains("<dyn RenderProgress>"));
    }
}
