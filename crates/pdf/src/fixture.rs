//! Small in-memory PDFs for tests.
//!
//! Pages hold single-line text objects in Helvetica (`/F1`) or
//! Helvetica-Bold (`/F2`), plus optional images, filled rectangles and link
//! annotations. Bookmarks are given flat, in outline order, and nested by
//! their level.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::PdfError;

pub const BODY_SIZE: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct FixtureLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub bold: bool,
}

impl FixtureLine {
    pub fn body(y: f32, text: &str) -> Self {
        FixtureLine {
            text: text.to_string(),
            x: 72.0,
            y,
            size: BODY_SIZE,
            bold: false,
        }
    }

    pub fn heading(y: f32, text: &str, size: f32) -> Self {
        FixtureLine {
            text: text.to_string(),
            x: 72.0,
            y,
            size,
            bold: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    pub lines: Vec<FixtureLine>,
    pub images: usize,
    pub rects: usize,
    pub links: usize,
}

impl FixturePage {
    pub fn with_lines(lines: Vec<FixtureLine>) -> Self {
        FixturePage {
            lines,
            ..FixturePage::default()
        }
    }
}

#[derive(Debug, Clone)]
struct Bookmark {
    title: String,
    level: u32,
    /// `None` points at a named destination that does not exist.
    page: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct SampleDocument {
    pages: Vec<FixturePage>,
    bookmarks: Vec<Bookmark>,
    title: Option<String>,
    author: Option<String>,
    creation_date: Option<String>,
}

impl SampleDocument {
    pub fn new() -> Self {
        SampleDocument::default()
    }

    pub fn page(mut self, page: FixturePage) -> Self {
        self.pages.push(page);
        self
    }

    /// `count` pages with one body line each.
    pub fn plain_pages(mut self, count: usize) -> Self {
        for n in 0..count {
            let text = format!("Body text on page {}", self.pages.len() + 1 + n);
            self.pages
                .push(FixturePage::with_lines(vec![FixtureLine::body(700.0, &text)]));
        }
        self
    }

    pub fn bookmark(mut self, title: &str, level: u32, page: u32) -> Self {
        self.bookmarks.push(Bookmark {
            title: title.to_string(),
            level,
            page: Some(page),
        });
        self
    }

    pub fn broken_bookmark(mut self, title: &str, level: u32) -> Self {
        self.bookmarks.push(Bookmark {
            title: title.to_string(),
            level,
            page: None,
        });
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn created(mut self, raw: &str) -> Self {
        self.creation_date = Some(raw.to_string());
        self
    }

    pub fn build_document(&self) -> Result<Document, PdfError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let image = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0],
        ));

        let mut page_ids: Vec<ObjectId> = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(page)?));

            let mut xobjects = Dictionary::new();
            for n in 0..page.images {
                xobjects.set(format!("Im{}", n), image);
            }

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => regular, "F2" => bold },
                    "XObject" => xobjects,
                },
            };
            if page.links > 0 {
                let annots: Vec<Object> = (0..page.links)
                    .map(|_| {
                        Object::Dictionary(dictionary! {
                            "Type" => "Annot",
                            "Subtype" => "Link",
                            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
                        })
                    })
                    .collect();
                page_dict.set("Annots", annots);
            }
            page_ids.push(doc.add_object(page_dict));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                "Count" => Object::Integer(page_ids.len() as i64),
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if !self.bookmarks.is_empty() {
            let outlines_id = doc.new_object_id();
            let mut outlines = dictionary! {
                "Type" => "Outlines",
                "Count" => Object::Integer(self.bookmarks.len() as i64),
            };
            if let Some((first, last)) =
                add_bookmarks(&mut doc, outlines_id, &self.bookmarks, 1, &page_ids)
            {
                outlines.set("First", first);
                outlines.set("Last", last);
            }
            doc.objects
                .insert(outlines_id, Object::Dictionary(outlines));
            catalog.set("Outlines", outlines_id);
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let mut info = Dictionary::new();
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        if let Some(author) = &self.author {
            info.set("Author", Object::string_literal(author.as_str()));
        }
        if let Some(created) = &self.creation_date {
            info.set("CreationDate", Object::string_literal(created.as_str()));
        }
        if !info.is_empty() {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        Ok(doc)
    }

    pub fn build(&self) -> Result<Vec<u8>, PdfError> {
        let mut doc = self.build_document()?;
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        Ok(bytes)
    }
}

fn page_content(page: &FixturePage) -> Result<Vec<u8>, PdfError> {
    let mut operations = Vec::new();

    for line in &page.lines {
        let font = if line.bold { "F2" } else { "F1" };
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), Object::Real(line.size)]),
            Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    Object::Real(line.x),
                    Object::Real(line.y),
                ],
            ),
            Operation::new("Tj", vec![Object::string_literal(line.text.as_str())]),
            Operation::new("ET", vec![]),
        ]);
    }

    for n in 0..page.rects {
        operations.extend([
            Operation::new(
                "re",
                vec![
                    50.into(),
                    Object::Integer(100 + 20 * n as i64),
                    100.into(),
                    10.into(),
                ],
            ),
            Operation::new("f", vec![]),
        ]);
    }

    for n in 0..page.images {
        operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    10.into(),
                    0.into(),
                    0.into(),
                    10.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(format!("Im{}", n).into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
    }

    Content { operations }
        .encode()
        .map_err(|e| PdfError::Write(e.to_string()))
}

/// Link the bookmarks at `level` as siblings under `parent`, recursing into
/// the entries that follow each of them. Returns the first and last sibling.
fn add_bookmarks(
    doc: &mut Document,
    parent: ObjectId,
    items: &[Bookmark],
    level: u32,
    page_ids: &[ObjectId],
) -> Option<(ObjectId, ObjectId)> {
    let starts: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.level == level)
        .map(|(idx, _)| idx)
        .collect();
    let ids: Vec<ObjectId> = starts.iter().map(|_| doc.new_object_id()).collect();

    for (n, &start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(items.len());
        let item = &items[start];

        let dest = match item
            .page
            .and_then(|p| page_ids.get((p as usize).checked_sub(1)?))
        {
            Some(page_id) => Object::Array(vec![
                Object::Reference(*page_id),
                "Fit".into(),
            ]),
            None => Object::Name(b"missing".to_vec()),
        };
        let mut dict = dictionary! {
            "Title" => Object::string_literal(item.title.as_str()),
            "Parent" => parent,
            "Dest" => dest,
        };
        if n > 0 {
            dict.set("Prev", ids[n - 1]);
        }
        if let Some(next) = ids.get(n + 1) {
            dict.set("Next", *next);
        }
        if let Some((first, last)) =
            add_bookmarks(doc, ids[n], &items[start + 1..end], level + 1, page_ids)
        {
            dict.set("First", first);
            dict.set("Last", last);
        }
        doc.objects.insert(ids[n], Object::Dictionary(dict));
    }

    Some((*ids.first()?, *ids.last()?))
}
