//! Aggregate content and font statistics over a sample of pages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pages inspected for `toc --detailed`.
pub const MAX_INVENTORY_PAGES: usize = 10;
const TOP_FONTS: usize = 5;

/// What a single page contains, as counted by the PDF layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInventory {
    pub page: u32,
    pub images: usize,
    /// Path-painting operators.
    pub drawings: usize,
    pub links: usize,
    pub text_objects: usize,
    /// Characters shown per font name.
    pub font_chars: BTreeMap<String, usize>,
    /// One entry per text-showing operator.
    pub font_sizes: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentStats {
    pub total_images: usize,
    pub total_drawings: usize,
    pub total_links: usize,
    pub total_text_objects: usize,
    pub images_per_page: f64,
    pub drawings_per_page: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStats {
    pub unique_fonts: usize,
    pub avg_size: f32,
    pub median_size: f32,
    pub min_size: f32,
    pub max_size: f32,
    /// Most used fonts by character count.
    pub top_fonts: Vec<(String, usize)>,
    /// Counts per 2 pt band, labelled `"10-11pt"`, smallest band first.
    pub size_distribution: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub pages_analyzed: usize,
    pub total_pages: usize,
    pub content: ContentStats,
    pub fonts: FontStats,
    pub indicators: Vec<String>,
}

/// Evenly spaced 1-based pages, at most `MAX_INVENTORY_PAGES` of them.
pub fn inventory_pages(page_count: usize) -> Vec<u32> {
    if page_count <= MAX_INVENTORY_PAGES {
        return (1..=page_count as u32).collect();
    }
    let step = page_count / MAX_INVENTORY_PAGES;
    (0..page_count)
        .step_by(step)
        .take(MAX_INVENTORY_PAGES)
        .map(|idx| idx as u32 + 1)
        .collect()
}

fn per_page(total: usize, pages: usize) -> f64 {
    if pages == 0 {
        0.0
    } else {
        total as f64 / pages as f64
    }
}

fn font_stats(pages: &[PageInventory]) -> FontStats {
    let mut chars: BTreeMap<&str, usize> = BTreeMap::new();
    for page in pages {
        for (font, count) in &page.font_chars {
            *chars.entry(font.as_str()).or_default() += count;
        }
    }

    let mut top_fonts: Vec<(String, usize)> =
        chars.iter().map(|(f, n)| (f.to_string(), *n)).collect();
    top_fonts.sort_by(|a, b| b.1.cmp(&a.1));
    top_fonts.truncate(TOP_FONTS);

    let mut sizes: Vec<f32> = pages
        .iter()
        .flat_map(|p| p.font_sizes.iter().copied())
        .filter(|s| *s > 0.0)
        .collect();
    sizes.sort_by(|a, b| a.total_cmp(b));

    let mut bands: BTreeMap<u32, usize> = BTreeMap::new();
    for size in &sizes {
        let band = (*size / 2.0).floor() as u32 * 2;
        *bands.entry(band).or_default() += 1;
    }

    let median_size = match sizes.len() {
        0 => 0.0,
        n if n % 2 == 1 => sizes[n / 2],
        n => (sizes[n / 2 - 1] + sizes[n / 2]) / 2.0,
    };

    FontStats {
        unique_fonts: chars.len(),
        avg_size: if sizes.is_empty() {
            0.0
        } else {
            sizes.iter().sum::<f32>() / sizes.len() as f32
        },
        median_size,
        min_size: sizes.first().copied().unwrap_or(0.0),
        max_size: sizes.last().copied().unwrap_or(0.0),
        top_fonts,
        size_distribution: bands
            .into_iter()
            .map(|(band, count)| (format!("{}-{}pt", band, band + 1), count))
            .collect(),
    }
}

fn indicators(content: &ContentStats, fonts: &FontStats) -> Vec<String> {
    let mut out = Vec::new();

    if content.images_per_page > 2.0 {
        out.push("Image-rich document (likely illustrated or visual content)".to_string());
    } else if content.images_per_page > 0.5 {
        out.push("Moderate visual content".to_string());
    } else {
        out.push("Text-heavy document".to_string());
    }

    if content.drawings_per_page > 1.0 {
        out.push("Contains diagrams, charts, or technical drawings".to_string());
    }

    if fonts.unique_fonts > 10 {
        out.push("Typographically diverse (many fonts)".to_string());
    } else if fonts.unique_fonts < 5 {
        out.push("Simple typography (few fonts)".to_string());
    }

    let range = fonts.max_size - fonts.min_size;
    if range > 20.0 {
        out.push("Wide font size range (strong visual hierarchy)".to_string());
    } else if range > 10.0 {
        out.push("Moderate font size variation".to_string());
    } else {
        out.push("Minimal font size variation".to_string());
    }

    out
}

pub fn summarize_inventory(pages: &[PageInventory], total_pages: usize) -> DocumentStats {
    let sum = |f: fn(&PageInventory) -> usize| pages.iter().map(f).sum::<usize>();
    let total_images = sum(|p| p.images);
    let total_drawings = sum(|p| p.drawings);

    let content = ContentStats {
        total_images,
        total_drawings,
        total_links: sum(|p| p.links),
        total_text_objects: sum(|p| p.text_objects),
        images_per_page: per_page(total_images, pages.len()),
        drawings_per_page: per_page(total_drawings, pages.len()),
    };
    let fonts = font_stats(pages);
    let indicators = indicators(&content, &fonts);

    DocumentStats {
        pages_analyzed: pages.len(),
        total_pages,
        content,
        fonts,
        indicators,
    }
}
