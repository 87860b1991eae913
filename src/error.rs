//! Error types for the pagepack library.
//!
//! Everything here is **fatal for the job**: when any of these surfaces, the
//! job transitions to its terminal `Error` state, the working directory is
//! discarded, and nothing is delivered. There is deliberately no per-page
//! "partial success" error — a half-rendered document must never turn into a
//! half-delivered archive set, so the taxonomy stays flat and the job
//! boundary (see [`crate::job`]) is the single catch point.

use std::path::PathBuf;
use thiserror::Error;

use crate::delivery::DeliveryError;

/// All fatal errors returned by the pagepack library.
#[derive(Debug, Error)]
pub enum PagePackError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The document opened cleanly but contains zero pages.
    #[error("Document '{path}' has no pages")]
    EmptyDocument { path: PathBuf },

    /// The rendering backend could not parse the document at all.
    #[error("Document '{path}' is corrupt or unsupported: {detail}")]
    CorruptDocument { path: PathBuf, detail: String },

    /// The rendering backend failed to rasterise a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Packing errors ────────────────────────────────────────────────────
    /// Packing was invoked with no input files.
    ///
    /// Rendering guarantees at least one page on success, so hitting this
    /// means an upstream contract was violated.
    #[error("Archive packing invoked with an empty file list")]
    PackEmptyInput,

    /// The zip writer rejected an entry or failed to finalise an archive.
    #[error("Failed to write archive '{path}': {source}")]
    ArchiveWriteFailed {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Filesystem failure (disk full, permissions, temp-dir creation, …).
    #[error("I/O failure at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Delivery errors ───────────────────────────────────────────────────
    /// The delivery collaborator rejected a text or file send.
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Cancellation ──────────────────────────────────────────────────────
    /// The job was cancelled; rendering stopped after the current page and
    /// all partial output was discarded.
    #[error("Job aborted by cancellation")]
    Aborted,

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a worker task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PagePackError {
    /// Wrap an `io::Error` with the path it occurred at.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PagePackError::Io {
            path: path.into(),
            source,
        }
    }
}
