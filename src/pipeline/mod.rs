//! Pipeline stages for document-to-archive conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. the rendering backend) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ pack
//! (path)   (pdfium)   (zip split)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied path and PDF magic bytes
//! 2. [`render`] — rasterise every page to a PNG file; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`pack`]   — group the ordered page files into size-bounded ZIP
//!    archives with first-fit sequential splitting
//!
//! Files flow strictly renderer → packer → delivery; no stage reorders
//! pages, so the archives are contiguous ordered chunks of the document.

pub mod input;
pub mod pack;
pub mod render;
