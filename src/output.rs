//! Output types: rendered pages, archive parts, job stats and state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One rasterised page on disk.
///
/// Created by the renderer and never mutated afterwards. Indices are
/// 1-based and contiguous; the file name encodes the index with a fixed
/// zero-padded width so lexicographic order equals page order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-based position of the page in the source document.
    pub index: usize,
    /// Path of the PNG file inside the job working directory.
    pub path: PathBuf,
    /// Size of the PNG file in bytes.
    pub bytes: u64,
}

/// One size-bounded output archive.
///
/// Parts are numbered contiguously from 1. A part's cumulative member size
/// never exceeds the configured bound, with one exception: a part holding a
/// single member that is itself larger than the bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivePart {
    /// 1-based part number.
    pub number: usize,
    /// Path of the `.zip` file inside the job working directory.
    ///
    /// Only valid until the job's working directory is released; callers
    /// that need the archive afterwards receive it through the delivery
    /// channel while the path is still live.
    pub path: PathBuf,
    /// Member pages in original page order.
    pub members: Vec<RenderedPage>,
    /// Sum of the members' file sizes in bytes.
    pub member_bytes: u64,
    /// On-disk size of the finished archive in bytes.
    pub archive_bytes: u64,
}

impl ArchivePart {
    /// 1-based index of the first member page, if any.
    pub fn first_page(&self) -> Option<usize> {
        self.members.first().map(|p| p.index)
    }

    /// 1-based index of the last member page, if any.
    pub fn last_page(&self) -> Option<usize> {
        self.members.last().map(|p| p.index)
    }
}

/// Lifecycle of a document-processing job.
///
/// `Error` is reachable from `Rendering` and `Packing`; `Aborted` from
/// `Rendering`. All three of `Done`, `Error`, and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    Rendering,
    Packing,
    Delivering,
    Done,
    Error,
    Aborted,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Idle => "idle",
            JobState::Rendering => "rendering",
            JobState::Packing => "packing",
            JobState::Delivering => "delivering",
            JobState::Done => "done",
            JobState::Error => "error",
            JobState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Timing and size statistics for a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStats {
    /// Page count of the source document.
    pub total_pages: usize,
    /// Number of archive parts produced.
    pub parts: usize,
    /// Sum of all rendered page sizes in bytes.
    pub page_bytes: u64,
    /// Sum of all finished archive sizes in bytes.
    pub archive_bytes: u64,
    /// Wall-clock duration of the rendering phase in milliseconds.
    pub render_duration_ms: u64,
    /// Wall-clock duration of the packing phase in milliseconds.
    pub pack_duration_ms: u64,
    /// Total job duration in milliseconds, delivery included.
    pub total_duration_ms: u64,
}

/// The result of a successful job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutput {
    /// Archive parts in ascending part order, exactly as delivered.
    pub parts: Vec<ArchivePart>,
    /// Timing and size statistics.
    pub stats: JobStats,
}
