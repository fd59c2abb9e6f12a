//! Bridges between the `pdf` crate and the pure analysis types.

use std::path::Path;

use extractorizer_core::headings::{PageSample, TextRun};
use extractorizer_core::outline::OutlineEntry;
use extractorizer_core::stats::PageInventory;

use crate::prelude::*;

pub fn open(path: &Path) -> Result<pdf::Document> {
    pdf::Document::open(path).wrap_err_with(|| f!("Failed to open PDF '{}'", path.display()))
}

/// File name used in report titles and prompts.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn outline_entries(doc: &pdf::Document) -> Vec<OutlineEntry> {
    doc.outline()
        .into_iter()
        .map(|item| OutlineEntry {
            title: item.title,
            level: item.level,
            page: item.page,
        })
        .collect()
}

fn to_sample(text: pdf::PageText) -> PageSample {
    PageSample {
        page: text.page,
        runs: text
            .lines
            .into_iter()
            .map(|line| TextRun {
                text: line.text,
                font_size: line.font_size,
                font_name: line.font_name,
                is_bold: line.is_bold,
                is_italic: line.is_italic,
                y: line.y,
            })
            .collect(),
    }
}

/// Text of the given pages. A page that cannot be read yields an empty
/// sample.
pub fn sample_pages(doc: &pdf::Document, pages: &[u32]) -> Vec<PageSample> {
    pages
        .iter()
        .map(|&page| match doc.page_text(page) {
            Ok(text) => to_sample(text),
            Err(err) => {
                log::debug!("could not read text of page {}: {}", page, err);
                PageSample {
                    page,
                    runs: Vec::new(),
                }
            }
        })
        .collect()
}

fn to_inventory(contents: pdf::PageContents) -> PageInventory {
    let mut inventory = PageInventory {
        page: contents.page,
        images: contents.images,
        drawings: contents.drawings,
        links: contents.links,
        text_objects: contents.text_objects,
        ..PageInventory::default()
    };
    for shown in contents.shown_text {
        *inventory.font_chars.entry(shown.font_name).or_default() += shown.chars;
        inventory.font_sizes.push(shown.font_size);
    }
    inventory
}

/// Object counts of the given pages. Unreadable pages are left out.
pub fn inventory_pages(doc: &pdf::Document, pages: &[u32]) -> Vec<PageInventory> {
    pages
        .iter()
        .filter_map(|&page| match doc.page_contents(page) {
            Ok(contents) => Some(to_inventory(contents)),
            Err(err) => {
                log::debug!("could not inventory page {}: {}", page, err);
                None
            }
        })
        .collect()
}
