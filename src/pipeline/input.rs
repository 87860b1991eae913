//! Input validation: check the source document exists and looks like a PDF.
//!
//! Document acquisition (downloads, chat attachments) belongs to the host
//! application; by the time a job starts, the document is a local file. We
//! still validate the `%PDF` magic bytes up front so callers get a
//! meaningful error rather than a backend parse failure.

use crate::error::PagePackError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local document path, returning it unchanged on success.
pub fn resolve_local(path: &Path) -> Result<PathBuf, PagePackError> {
    if !path.exists() {
        return Err(PagePackError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PagePackError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PagePackError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PagePackError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonexistent_path_is_file_not_found() {
        let err = resolve_local(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, PagePackError::FileNotFound { .. }));
    }

    #[test]
    fn junk_file_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pdf");
        std::fs::write(&path, b"GIF89a....").unwrap();
        let err = resolve_local(&path).unwrap_err();
        assert!(matches!(err, PagePackError::NotAPdf { .. }));
    }

    #[test]
    fn pdf_magic_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
        let resolved = resolve_local(&path).unwrap();
        assert_eq!(resolved, path);
    }
}
