//! Archive packing: split an ordered page-file sequence into size-bounded
//! ZIP archives.
//!
//! ## The algorithm
//!
//! Online, order-preserving, first-fit sequential bin packing: walk the
//! pages in order, close the current part and open the next whenever the
//! incoming file would push the cumulative member size over the bound.
//! O(n) time, O(1) extra space beyond the one open zip writer.
//!
//! This is deliberately *not* globally optimal packing. Optimal packing
//! could reorder pages across archives to minimise the part count, which
//! would break the guarantee that every archive is a contiguous, ordered
//! chunk of the document a reader can open in isolation.

use crate::error::PagePackError;
use crate::output::{ArchivePart, RenderedPage};
use crate::pipeline::render::page_file_name;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// An archive part that is still accepting members.
struct OpenPart {
    number: usize,
    path: PathBuf,
    writer: ZipWriter<File>,
    members: Vec<RenderedPage>,
    member_bytes: u64,
}

impl OpenPart {
    fn create(out_dir: &Path, base_name: &str, number: usize) -> Result<Self, PagePackError> {
        let path = out_dir.join(format!("{base_name}_part{number}.zip"));
        let file = File::create(&path).map_err(|e| PagePackError::io(&path, e))?;
        Ok(Self {
            number,
            path,
            writer: ZipWriter::new(file),
            members: Vec::new(),
            member_bytes: 0,
        })
    }

    /// Append one page file as a Deflate-compressed entry.
    fn append(&mut self, page: &RenderedPage) -> Result<(), PagePackError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(page_file_name(page.index), options)
            .map_err(|e| PagePackError::ArchiveWriteFailed {
                path: self.path.clone(),
                source: e,
            })?;

        let mut src = File::open(&page.path).map_err(|e| PagePackError::io(&page.path, e))?;
        std::io::copy(&mut src, &mut self.writer).map_err(|e| PagePackError::io(&self.path, e))?;

        self.member_bytes += page.bytes;
        self.members.push(page.clone());
        Ok(())
    }

    /// Finalise the archive and freeze it into an [`ArchivePart`].
    fn close(self) -> Result<ArchivePart, PagePackError> {
        self.writer
            .finish()
            .map_err(|e| PagePackError::ArchiveWriteFailed {
                path: self.path.clone(),
                source: e,
            })?;
        let archive_bytes = std::fs::metadata(&self.path)
            .map_err(|e| PagePackError::io(&self.path, e))?
            .len();

        debug!(
            "Closed part {}: {} pages, {} member bytes, {} archive bytes",
            self.number,
            self.members.len(),
            self.member_bytes,
            archive_bytes
        );

        Ok(ArchivePart {
            number: self.number,
            path: self.path,
            members: self.members,
            member_bytes: self.member_bytes,
            archive_bytes,
        })
    }
}

/// Pack the ordered page list into one or more size-bounded ZIP archives.
///
/// Every input file lands in exactly one archive, in original page order.
/// A part's cumulative member size stays ≤ `max_part_bytes`, except when a
/// single file alone exceeds the bound — that file becomes a singleton part
/// rather than being rejected.
///
/// Naming: with one resulting part the archive is `{base_name}.zip`; with
/// several, each part is `{base_name}_part{N}.zip`, N starting at 1.
///
/// # Errors
/// [`PagePackError::PackEmptyInput`] if `pages` is empty — rendering
/// guarantees at least one page on success, so an empty list is an upstream
/// contract violation, not a normal outcome.
pub fn pack_pages(
    pages: &[RenderedPage],
    out_dir: &Path,
    base_name: &str,
    max_part_bytes: u64,
) -> Result<Vec<ArchivePart>, PagePackError> {
    if pages.is_empty() {
        return Err(PagePackError::PackEmptyInput);
    }

    let mut parts: Vec<ArchivePart> = Vec::new();
    let mut current = OpenPart::create(out_dir, base_name, 1)?;

    for page in pages {
        let overflows = current.member_bytes + page.bytes > max_part_bytes;
        if overflows && !current.members.is_empty() {
            let next_number = current.number + 1;
            parts.push(current.close()?);
            current = OpenPart::create(out_dir, base_name, next_number)?;
        }
        current.append(page)?;
    }
    parts.push(current.close()?);

    // A lone part gets the canonical name with no part suffix.
    if parts.len() == 1 {
        let canonical = out_dir.join(format!("{base_name}.zip"));
        std::fs::rename(&parts[0].path, &canonical)
            .map_err(|e| PagePackError::io(&canonical, e))?;
        parts[0].path = canonical;
    }

    info!(
        "Packed {} pages into {} archive part(s)",
        pages.len(),
        parts.len()
    );

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Write a fake rendered page of `bytes` incompressible-ish content.
    fn write_page(dir: &Path, index: usize, bytes: u64) -> RenderedPage {
        let path = dir.join(page_file_name(index));
        let data: Vec<u8> = (0..bytes).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();
        RenderedPage { index, path, bytes }
    }

    fn write_pages(dir: &Path, sizes: &[u64]) -> Vec<RenderedPage> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &b)| write_page(dir, i + 1, b))
            .collect()
    }

    /// Entry names of an archive in central-directory (insertion) order.
    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn empty_input_is_a_contract_violation() {
        let dir = TempDir::new().unwrap();
        let err = pack_pages(&[], dir.path(), "doc", 100).unwrap_err();
        assert!(matches!(err, PagePackError::PackEmptyInput));
    }

    #[test]
    fn single_part_gets_canonical_name() {
        let dir = TempDir::new().unwrap();
        let pages = write_pages(dir.path(), &[10, 10, 10]);
        let parts = pack_pages(&pages, dir.path(), "doc", 100).unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].number, 1);
        assert!(parts[0].path.ends_with("doc.zip"));
        assert!(parts[0].path.exists());
        assert!(!dir.path().join("doc_part1.zip").exists());
        assert_eq!(parts[0].member_bytes, 30);
    }

    // Scaled version of the 120-page / 0.5 MB / 45 MB bound example:
    // 12 pages of 5 bytes with bound 45 → part 1 holds pages 1–9,
    // part 2 holds pages 10–12.
    #[test]
    fn splits_at_the_bound_preserving_order() {
        let dir = TempDir::new().unwrap();
        let pages = write_pages(dir.path(), &[5; 12]);
        let parts = pack_pages(&pages, dir.path(), "doc", 45).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].first_page(), Some(1));
        assert_eq!(parts[0].last_page(), Some(9));
        assert_eq!(parts[0].member_bytes, 45);
        assert_eq!(parts[1].first_page(), Some(10));
        assert_eq!(parts[1].last_page(), Some(12));
        assert!(parts[0].path.ends_with("doc_part1.zip"));
        assert!(parts[1].path.ends_with("doc_part2.zip"));
    }

    #[test]
    fn part_numbers_are_contiguous_and_cover_all_pages_in_order() {
        let dir = TempDir::new().unwrap();
        let pages = write_pages(dir.path(), &[30, 30, 30, 30, 30, 30, 30]);
        let parts = pack_pages(&pages, dir.path(), "doc", 70).unwrap();

        for (i, part) in parts.iter().enumerate() {
            assert_eq!(part.number, i + 1);
            assert!(part.member_bytes <= 70);
        }
        let concatenated: Vec<usize> = parts
            .iter()
            .flat_map(|p| p.members.iter().map(|m| m.index))
            .collect();
        assert_eq!(concatenated, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn oversize_file_becomes_a_singleton_part_not_an_error() {
        let dir = TempDir::new().unwrap();
        let pages = write_pages(dir.path(), &[60]);
        let parts = pack_pages(&pages, dir.path(), "doc", 45).unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].members.len(), 1);
        assert_eq!(parts[0].member_bytes, 60);
        assert!(parts[0].path.ends_with("doc.zip"));
    }

    #[test]
    fn oversize_file_in_the_middle_is_isolated() {
        let dir = TempDir::new().unwrap();
        let pages = write_pages(dir.path(), &[10, 60, 10]);
        let parts = pack_pages(&pages, dir.path(), "doc", 45).unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].members[0].index, 1);
        assert_eq!(parts[1].members[0].index, 2);
        assert_eq!(parts[1].member_bytes, 60);
        assert_eq!(parts[2].members[0].index, 3);
    }

    #[test]
    fn exact_fit_does_not_open_an_extra_part() {
        let dir = TempDir::new().unwrap();
        let pages = write_pages(dir.path(), &[45, 1]);
        let parts = pack_pages(&pages, dir.path(), "doc", 45).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].member_bytes, 45);
        assert_eq!(parts[1].member_bytes, 1);
    }

    #[test]
    fn archive_entries_keep_page_order() {
        let dir = TempDir::new().unwrap();
        let pages = write_pages(dir.path(), &[5; 12]);
        let parts = pack_pages(&pages, dir.path(), "doc", 45).unwrap();

        assert_eq!(
            entry_names(&parts[0].path),
            (1..=9).map(page_file_name).collect::<Vec<_>>()
        );
        assert_eq!(
            entry_names(&parts[1].path),
            (10..=12).map(page_file_name).collect::<Vec<_>>()
        );
    }

    #[test]
    fn archive_entries_round_trip_content() {
        use std::io::Read;

        let dir = TempDir::new().unwrap();
        let pages = write_pages(dir.path(), &[100]);
        let parts = pack_pages(&pages, dir.path(), "doc", 1000).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&parts[0].path).unwrap()).unwrap();
        let mut entry = archive.by_name("page_0001.png").unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, std::fs::read(&pages[0].path).unwrap());
    }
}
