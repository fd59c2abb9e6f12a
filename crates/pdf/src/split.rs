//! Page-range extraction into standalone documents.

use std::path::Path;

use crate::PdfError;

/// Write pages `first..=last` (1-based) of `source` to `path`.
///
/// The copy drops the outline and every object no remaining page uses.
pub fn write_page_range(
    source: &lopdf::Document,
    first: u32,
    last: u32,
    path: &Path,
) -> Result<(), PdfError> {
    let page_count = source.get_pages().len() as u32;
    if first == 0 || first > last {
        return Err(PdfError::InvalidRange { first, last });
    }
    if last > page_count {
        return Err(PdfError::PageOutOfRange {
            page: last,
            page_count,
        });
    }

    let mut doc = source.clone();
    let outside: Vec<u32> = (1..=page_count)
        .filter(|n| *n < first || *n > last)
        .collect();
    if !outside.is_empty() {
        doc.delete_pages(&outside);
    }

    if let Ok(catalog) = doc.catalog_mut() {
        catalog.remove(b"Outlines");
    }

    doc.prune_objects();
    doc.renumber_objects();
    doc.compress();

    log::debug!(
        "writing pages {}-{} to {}",
        first,
        last,
        path.display()
    );
    doc.save(path).map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::SampleDocument;

    fn sample(pages: usize) -> lopdf::Document {
        SampleDocument::new()
            .plain_pages(pages)
            .bookmark("Only", 1, 1)
            .build_document()
            .unwrap()
    }

    #[test]
    fn test_writes_requested_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.pdf");

        write_page_range(&sample(5), 2, 4, &path).unwrap();

        let written = lopdf::Document::load(&path).unwrap();
        assert_eq!(written.get_pages().len(), 3);
        assert!(written.catalog().unwrap().get(b"Outlines").is_err());
    }

    #[test]
    fn test_single_page_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.pdf");

        write_page_range(&sample(3), 3, 3, &path).unwrap();

        let written = lopdf::Document::load(&path).unwrap();
        assert_eq!(written.get_pages().len(), 1);
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        let doc = sample(3);

        assert!(matches!(
            write_page_range(&doc, 0, 2, &path),
            Err(PdfError::InvalidRange { first: 0, last: 2 })
        ));
        assert!(matches!(
            write_page_range(&doc, 3, 2, &path),
            Err(PdfError::InvalidRange { .. })
        ));
        assert!(matches!(
            write_page_range(&doc, 2, 4, &path),
            Err(PdfError::PageOutOfRange {
                page: 4,
                page_count: 3
            })
        ));
        assert!(!path.exists());
    }
}
