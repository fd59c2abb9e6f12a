//! Embedded outline (bookmark tree) analysis.
//!
//! Decides whether an outline is usable for chapter splitting, ranks its
//! levels as extraction units, and derives document-type hints from the
//! entry titles.

pub mod assess;
pub mod levels;
pub mod profile;
pub mod semantic;

use serde::{Deserialize, Serialize};

pub use assess::{assess_outline, breakdown, Factor, OutlineAssessment, Verdict};
pub use levels::{analyze_levels, level_extraction_score, rank_levels, LevelStats, RankedLevel};
pub use profile::{outline_profile, OutlineProfile, StrategyAdvice};
pub use semantic::{semantic_score, ContentCategory};

/// One bookmark, flattened in outline (depth-first) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub title: String,
    /// 1 for top-level entries.
    pub level: u32,
    /// 1-based target page, `None` when the destination cannot be resolved.
    pub page: Option<u32>,
}

/// Everything the TOC diagnostic reports about an outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineReport {
    pub total_pages: usize,
    pub total_entries: usize,
    pub max_level: u32,
    pub levels: Vec<LevelStats>,
    pub ranked: Vec<RankedLevel>,
    pub assessment: OutlineAssessment,
    pub profile: OutlineProfile,
}

impl OutlineReport {
    pub fn level(&self, level: u32) -> Option<&LevelStats> {
        self.levels.iter().find(|s| s.level == level)
    }
}

pub fn outline_report(entries: &[OutlineEntry], page_count: usize) -> OutlineReport {
    let levels = analyze_levels(entries, page_count);
    let ranked = rank_levels(&levels);
    let assessment = assess_outline(entries, page_count, &ranked);
    let profile = outline_profile(&levels, &ranked, entries.len(), page_count);

    OutlineReport {
        total_pages: page_count,
        total_entries: entries.len(),
        max_level: entries.iter().map(|e| e.level).max().unwrap_or(0),
        levels,
        ranked,
        assessment,
        profile,
    }
}
