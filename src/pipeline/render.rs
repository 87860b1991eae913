//! Page rasterisation: render every page of a document to a PNG file.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread-pool thread, so the Tokio worker threads (which also run the
//! progress reporter and other jobs) never stall during CPU-heavy
//! rasterisation.
//!
//! ## Scale derivation
//!
//! PDF page geometry is expressed in points, 72 per inch. Rendering at a
//! target DPI therefore means scaling both axes by `dpi / 72`.

use crate::config::JobConfig;
use crate::error::PagePackError;
use crate::job::CancelToken;
use crate::output::RenderedPage;
use crate::progress::{is_report_point, RenderProgress};
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// File name for a page's PNG, zero-padded to a fixed width so that
/// lexicographic order equals page order.
pub(crate) fn page_file_name(index: usize) -> String {
    format!("page_{index:04}.png")
}

/// Rasterise every page of `pdf_path` into `out_dir`, one PNG per page.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
/// The progress callback from `config` fires at cadence boundaries and at
/// the final page. Returns the pages in ascending 1-based index order.
///
/// # Errors
/// - [`PagePackError::EmptyDocument`] if the document has zero pages
///   (no files are written).
/// - [`PagePackError::Aborted`] if `cancel` fires; rendering stops after
///   the current page.
/// - [`PagePackError::RenderFailed`] if the backend cannot rasterise a page.
pub async fn render_document(
    pdf_path: &Path,
    out_dir: &Path,
    config: &JobConfig,
    cancel: CancelToken,
) -> Result<Vec<RenderedPage>, PagePackError> {
    let path = pdf_path.to_path_buf();
    let out = out_dir.to_path_buf();
    let dpi = config.dpi;
    let cadence = config.progress_cadence;
    let progress = config.progress.clone();

    tokio::task::spawn_blocking(move || {
        render_blocking(&path, &out, dpi, cadence, progress, cancel)
    })
    .await
    .map_err(|e| PagePackError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of page rendering.
fn render_blocking(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
    cadence: usize,
    progress: Option<Arc<dyn RenderProgress>>,
    cancel: CancelToken,
) -> Result<Vec<RenderedPage>, PagePackError> {
    let pdfium = bind_pdfium()?;

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| PagePackError::CorruptDocument {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("Document loaded: {} pages", total_pages);

    if total_pages == 0 {
        return Err(PagePackError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }

    if let Some(ref cb) = progress {
        cb.on_start(total_pages);
    }

    let scale = dpi as f32 / 72.0;
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(PagePackError::Aborted);
        }

        let page_num = idx + 1;
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| PagePackError::RenderFailed {
                    page: page_num,
                    detail: format!("{e:?}"),
                })?;

        // Flatten to RGB: pages have no meaningful alpha and the opaque
        // encoding is what downstream archive consumers expect.
        let image = bitmap.as_image().to_rgb8();
        let path = out_dir.join(page_file_name(page_num));
        save_png(&image, &path, page_num)?;

        let bytes = std::fs::metadata(&path)
            .map_err(|e| PagePackError::io(&path, e))?
            .len();

        debug!(
            "Rendered page {} → {}x{} px, {} bytes",
            page_num,
            image.width(),
            image.height(),
            bytes
        );

        results.push(RenderedPage {
            index: page_num,
            path,
            bytes,
        });

        if let Some(ref cb) = progress {
            if is_report_point(page_num, total_pages, cadence) {
                cb.on_page(page_num, total_pages);
            }
        }
    }

    Ok(results)
}

/// Write one rendered page to disk, splitting I/O failures out of the
/// generic encode error.
fn save_png(image: &image::RgbImage, path: &Path, page_num: usize) -> Result<(), PagePackError> {
    image.save(path).map_err(|e| match e {
        image::ImageError::IoError(io) => PagePackError::io(path, io),
        other => PagePackError::RenderFailed {
            page: page_num,
            detail: format!("PNG encoding failed: {other}"),
        },
    })
}

/// Bind to a pdfium library: `PDFIUM_LIB_PATH` if set, else the system copy.
fn bind_pdfium() -> Result<Pdfium, PagePackError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(lib_path) => Pdfium::bind_to_library(&lib_path),
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PagePackError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_names_sort_in_page_order() {
        let names: Vec<String> = (1..=150).map(page_file_name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn page_name_is_zero_padded() {
        assert_eq!(page_file_name(1), "page_0001.png");
        assert_eq!(page_file_name(42), "page_0042.png");
        assert_eq!(page_file_name(1200), "page_1200.png");
    }
}
