use std::path::Path;

use thiserror::Error;

use parser::backend::{LopdfBackend, PageId, PdfBackend};

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
pub mod parser;
pub mod split;
pub mod types;

pub use types::*;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("Invalid page range {first}-{last}")]
    InvalidRange { first: u32, last: u32 },
    #[error("PDF write error: {0}")]
    Write(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A loaded PDF.
///
/// Constructed via [`Document::from_bytes`]. Pages are parsed lazily, one
/// call at a time, so callers only pay for the pages they sample.
pub struct Document {
    backend: LopdfBackend,
}

impl Document {
    /// Parse PDF bytes. Encrypted documents are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        Ok(Document {
            backend: LopdfBackend::load_bytes(bytes)?,
        })
    }

    /// Read and parse a file.
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    pub fn metadata(&self) -> DocumentMetadata {
        let mut info = self.backend.metadata();
        DocumentMetadata {
            title: info.remove("Title"),
            author: info.remove("Author"),
            creator: info.remove("Creator"),
            producer: info.remove("Producer"),
            creation_date: info.remove("CreationDate"),
            page_count: self.page_count(),
        }
    }

    /// Bookmarks in depth-first order.
    pub fn outline(&self) -> Vec<OutlineItem> {
        parser::outline::read_outline(self.backend.raw_doc())
    }

    /// Text lines of a 1-based page.
    pub fn page_text(&self, page: u32) -> Result<PageText, PdfError> {
        let page_id = self.page_id(page)?;
        parser::text::page_text(&self.backend, page, page_id)
    }

    /// Object counts and shown text of a 1-based page.
    pub fn page_contents(&self, page: u32) -> Result<PageContents, PdfError> {
        let page_id = self.page_id(page)?;
        parser::inventory::page_contents(&self.backend, page, page_id)
    }

    /// Write pages `first..=last` to a new file.
    pub fn write_page_range(&self, first: u32, last: u32, path: &Path) -> Result<(), PdfError> {
        split::write_page_range(self.backend.raw_doc(), first, last, path)
    }

    fn page_id(&self, page: u32) -> Result<PageId, PdfError> {
        self.backend
            .pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::PageOutOfRange {
                page,
                page_count: self.page_count() as u32,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureLine, FixturePage, SampleDocument};

    fn sample() -> Vec<u8> {
        SampleDocument::new()
            .title("Arcana")
            .author("Ordo")
            .created("D:20230415093000Z")
            .page(FixturePage::with_lines(vec![
                FixtureLine::heading(720.0, "Chapter 1", 20.0),
                FixtureLine::body(690.0, "The first words."),
            ]))
            .plain_pages(2)
            .bookmark("Chapter 1", 1, 1)
            .bookmark("Chapter 2", 1, 3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_metadata() {
        let meta = Document::from_bytes(&sample()).unwrap().metadata();
        assert_eq!(meta.title.as_deref(), Some("Arcana"));
        assert_eq!(meta.author.as_deref(), Some("Ordo"));
        assert_eq!(meta.creator, None);
        assert_eq!(meta.creation_date.as_deref(), Some("D:20230415093000Z"));
        assert_eq!(meta.page_count, 3);
    }

    #[test]
    fn test_page_text() {
        let doc = Document::from_bytes(&sample()).unwrap();
        let text = doc.page_text(1).unwrap();
        let lines: Vec<(&str, f32, bool)> = text
            .lines
            .iter()
            .map(|l| (l.text.as_str(), l.font_size, l.is_bold))
            .collect();
        assert_eq!(
            lines,
            vec![("Chapter 1", 20.0, true), ("The first words.", 10.0, false)]
        );
    }

    #[test]
    fn test_outline() {
        let doc = Document::from_bytes(&sample()).unwrap();
        let pages: Vec<Option<u32>> = doc.outline().iter().map(|i| i.page).collect();
        assert_eq!(pages, vec![Some(1), Some(3)]);
    }

    fn encrypted(user_password: &str) -> Vec<u8> {
        use lopdf::{EncryptionState, EncryptionVersion, Object, Permissions};

        let mut doc = lopdf::Document::load_mem(&sample()).unwrap();
        let id = Object::string_literal("extractorizer-test");
        doc.trailer.set("ID", vec![id.clone(), id]);
        let state = EncryptionState::try_from(EncryptionVersion::V2 {
            document: &doc,
            owner_password: "owner",
            user_password,
            key_length: 128,
            permissions: Permissions::all(),
        })
        .unwrap();
        doc.encrypt(&state).unwrap();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_user_password_is_rejected() {
        let result = Document::from_bytes(&encrypted("user"));
        assert!(matches!(result, Err(PdfError::Encrypted)));
    }

    #[test]
    fn test_owner_password_only_is_readable() {
        let doc = Document::from_bytes(&encrypted("")).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.metadata().title.as_deref(), Some("Arcana"));
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = Document::from_bytes(&sample()).unwrap();
        assert!(matches!(
            doc.page_text(4),
            Err(PdfError::PageOutOfRange {
                page: 4,
                page_count: 3
            })
        ));
        assert!(matches!(
            doc.page_contents(0),
            Err(PdfError::PageOutOfRange { page: 0, .. })
        ));
    }
}
