use serde::{Deserialize, Serialize};

/// One bookmark of the embedded outline, in depth-first order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub title: String,
    /// 1 for top-level bookmarks.
    pub level: u32,
    /// 1-based page the bookmark points at, when it can be resolved.
    pub page: Option<u32>,
}

/// A line of text assembled from the text-showing operators of a page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f32,
    /// Baseline in PDF user space; larger is higher on the page.
    pub y: f32,
    /// Size covering the most characters of the line.
    pub font_size: f32,
    /// Base font covering the most characters of the line.
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageText {
    pub page: u32,
    /// Top of the page first.
    pub lines: Vec<TextLine>,
}

/// Text shown by a single operator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShownText {
    pub font_name: String,
    pub font_size: f32,
    pub chars: usize,
}

/// Object counts for one page.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PageContents {
    pub page: u32,
    /// Image XObjects in the page resources plus inline images.
    pub images: usize,
    /// Path-painting operators.
    pub drawings: usize,
    pub links: usize,
    pub text_objects: usize,
    pub shown_text: Vec<ShownText>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Raw PDF date string, e.g. `D:20230415093000Z`.
    pub creation_date: Option<String>,
    pub page_count: usize,
}
