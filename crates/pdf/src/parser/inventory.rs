use super::backend::{PageId, PdfBackend};
use super::text::spans_from_ops;
use crate::{PageContents, PdfError, ShownText};

/// Path-painting operators: stroke, fill and their combinations.
const PAINT_OPERATORS: [&str; 10] = ["S", "s", "f", "F", "f*", "B", "B*", "b", "b*", "sh"];

/// Count the objects drawn on a page and collect the text it shows.
pub fn page_contents(backend: &dyn PdfBackend, page: u32, page_id: PageId) -> Result<PageContents, PdfError> {
    let raw = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw)?;

    let mut contents = PageContents {
        page,
        images: backend.page_image_count(page_id),
        links: backend.page_link_count(page_id),
        ..PageContents::default()
    };

    for op in &ops {
        match op.operator.as_str() {
            "BT" => contents.text_objects += 1,
            "BI" => contents.images += 1,
            operator if PAINT_OPERATORS.contains(&operator) => contents.drawings += 1,
            _ => {}
        }
    }

    contents.shown_text = spans_from_ops(backend, page_id, &ops)
        .into_iter()
        .map(|span| ShownText {
            chars: span.text.chars().filter(|c| !c.is_whitespace()).count(),
            font_name: span.font_name,
            font_size: span.font_size,
        })
        .collect();

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureLine, FixturePage, SampleDocument};
    use crate::parser::backend::{BackendFontInfo, ContentOp, LopdfBackend};
    use std::cell::Cell;
    use std::collections::BTreeMap;

    #[test]
    fn test_counts_page_objects() {
        let bytes = SampleDocument::new()
            .page(FixturePage {
                lines: vec![
                    FixtureLine::heading(720.0, "Spells", 18.0),
                    FixtureLine::body(700.0, "Magic missile"),
                ],
                images: 1,
                rects: 3,
                links: 2,
            })
            .build()
            .unwrap();
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        let page_id = backend.pages()[&1];

        let contents = page_contents(&backend, 1, page_id).unwrap();
        assert_eq!(contents.page, 1);
        assert_eq!(contents.images, 1);
        assert_eq!(contents.drawings, 3);
        assert_eq!(contents.links, 2);
        assert_eq!(contents.text_objects, 2);

        let shown: Vec<(&str, f32, usize)> = contents
            .shown_text
            .iter()
            .map(|s| (s.font_name.as_str(), s.font_size, s.chars))
            .collect();
        assert_eq!(
            shown,
            vec![("Helvetica-Bold", 18.0, 6), ("Helvetica", 10.0, 12)]
        );
    }

    /// Counts content stream decodes on top of a real backend.
    struct Counting {
        inner: LopdfBackend,
        decodes: Cell<usize>,
    }

    impl PdfBackend for Counting {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            self.inner.pages()
        }
        fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
            self.inner.page_fonts(page)
        }
        fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
            self.inner.page_content(page)
        }
        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            self.decodes.set(self.decodes.get() + 1);
            self.inner.decode_content(data)
        }
        fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
            self.inner.decode_text(page, font_name, bytes)
        }
        fn page_image_count(&self, page: PageId) -> usize {
            self.inner.page_image_count(page)
        }
        fn page_link_count(&self, page: PageId) -> usize {
            self.inner.page_link_count(page)
        }
    }

    #[test]
    fn test_content_stream_is_decoded_once() {
        let bytes = SampleDocument::new()
            .page(FixturePage::with_lines(vec![FixtureLine::body(700.0, "Shield")]))
            .build()
            .unwrap();
        let backend = Counting {
            inner: LopdfBackend::load_bytes(&bytes).unwrap(),
            decodes: Cell::new(0),
        };
        let page_id = backend.pages()[&1];

        let contents = page_contents(&backend, 1, page_id).unwrap();
        assert_eq!(contents.shown_text.len(), 1);
        assert_eq!(backend.decodes.get(), 1);
    }

    #[test]
    fn test_empty_page() {
        let bytes = SampleDocument::new()
            .page(FixturePage::default())
            .build()
            .unwrap();
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        let contents = page_contents(&backend, 1, backend.pages()[&1]).unwrap();
        assert_eq!(contents, PageContents { page: 1, ..PageContents::default() });
    }
}
