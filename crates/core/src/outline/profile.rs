use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::levels::{LevelStats, RankedLevel};
use super::semantic::ContentCategory;

/// Average chapter length above which subsections should be split too.
const HYBRID_PAGE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAdvice {
    pub level: u32,
    pub sections: usize,
    pub avg_pages: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAdvice {
    pub primary: Option<LevelAdvice>,
    pub secondary: Option<LevelAdvice>,
    /// Split major chapters at `primary` and large ones again at this level.
    pub hybrid_sublevel: Option<u32>,
    pub highlights: Vec<String>,
}

/// What the outline titles say about the document as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineProfile {
    pub document_type: String,
    pub focus: String,
    /// Category counts across all levels, most frequent first.
    pub content_distribution: Vec<(ContentCategory, usize)>,
    pub insights: Vec<String>,
    pub notes: Vec<String>,
    pub strategy: StrategyAdvice,
}

pub fn content_totals(levels: &[LevelStats]) -> BTreeMap<ContentCategory, usize> {
    let mut totals = BTreeMap::new();
    for stats in levels {
        for (category, count) in &stats.content_types {
            *totals.entry(*category).or_default() += count;
        }
    }
    totals
}

fn distribution(totals: &BTreeMap<ContentCategory, usize>) -> Vec<(ContentCategory, usize)> {
    let mut ordered: Vec<(ContentCategory, usize)> =
        totals.iter().map(|(c, n)| (*c, *n)).collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    ordered
}

/// Document type and focus from the dominant content category.
pub fn document_kind(totals: &BTreeMap<ContentCategory, usize>) -> (String, String) {
    let (kind, focus) = match distribution(totals).first().map(|(c, _)| *c) {
        Some(ContentCategory::Financial) => (
            "Financial/Business Document",
            "Financial reporting and business operations",
        ),
        Some(ContentCategory::Legal) => (
            "Legal/Regulatory Document",
            "Compliance and regulatory matters",
        ),
        Some(ContentCategory::Governance) => (
            "Corporate Governance Document",
            "Management and organizational structure",
        ),
        Some(ContentCategory::Operational) => (
            "Business Operations Document",
            "Business processes and operations",
        ),
        Some(ContentCategory::Technical) => (
            "Technical Documentation",
            "Technical processes and systems",
        ),
        Some(ContentCategory::Gaming) => ("Gaming/RPG Manual", "Game rules and content"),
        Some(ContentCategory::Academic) => (
            "Academic/Research Document",
            "Research and scholarly content",
        ),
        Some(ContentCategory::Reference) => (
            "Reference Document",
            "Reference materials and appendices",
        ),
        Some(ContentCategory::Narrative) | None => ("General Document", "Mixed content"),
    };
    (kind.to_string(), focus.to_string())
}

pub fn structural_insights(total_entries: usize, max_level: u32, page_count: usize) -> Vec<String> {
    let mut insights = Vec::new();

    if total_entries > 200 {
        insights.push("Highly detailed document with an extensive navigation structure".to_string());
    } else if total_entries < 20 {
        insights.push("Simple document structure with few subdivisions".to_string());
    } else {
        insights.push("Moderately structured document with good organization".to_string());
    }

    if max_level > 3 {
        insights.push(format!(
            "Deep hierarchy ({} levels), suitable for granular extraction",
            max_level
        ));
    } else if max_level <= 2 {
        insights.push("Shallow hierarchy, best for major section extraction".to_string());
    }

    let density = if page_count > 0 {
        total_entries as f64 / page_count as f64
    } else {
        0.0
    };
    if density > 2.0 {
        insights.push("High bookmark density, well structured for navigation".to_string());
    } else if density < 0.5 {
        insights
            .push("Low bookmark density, some content may need page-based extraction".to_string());
    }

    insights
}

pub fn extraction_notes(totals: &BTreeMap<ContentCategory, usize>) -> Vec<String> {
    if totals.is_empty() {
        return vec![
            "Limited content type detection, sections may need manual identification".to_string(),
        ];
    }

    let count = |category: ContentCategory| totals.get(&category).copied().unwrap_or(0);
    let mut notes = Vec::new();

    if count(ContentCategory::Financial) > 3 {
        notes.push("Financial content detected, suited to financial data extraction".to_string());
        notes.push("Consider structured extraction for numerical data and tables".to_string());
    }
    if count(ContentCategory::Legal) > 2 {
        notes.push("Legal/regulatory content found, suited to compliance analysis".to_string());
    }
    if count(ContentCategory::Gaming) > 10 {
        notes.push("Gaming content detected, suited to game database extraction".to_string());
    }
    if count(ContentCategory::Technical) > 5 {
        notes.push("Technical content found, suited to process documentation".to_string());
    }
    if count(ContentCategory::Reference) > 5 {
        notes.push("Reference-heavy document, suited to structured data extraction".to_string());
    }
    if count(ContentCategory::Academic) > 3 {
        notes.push("Academic content detected, suited to research data extraction".to_string());
    }

    notes
}

fn advice_for(levels: &[LevelStats], level: u32) -> Option<LevelAdvice> {
    levels
        .iter()
        .find(|s| s.level == level)
        .map(|s| LevelAdvice {
            level,
            sections: s.count,
            avg_pages: s.avg_page_range,
        })
}

pub fn strategy_advice(levels: &[LevelStats], ranked: &[RankedLevel]) -> StrategyAdvice {
    let primary = ranked.first().and_then(|r| advice_for(levels, r.level));
    let secondary = ranked.get(1).and_then(|r| advice_for(levels, r.level));

    let mut highlights = Vec::new();
    if let Some(stats) = primary
        .as_ref()
        .and_then(|p| levels.iter().find(|s| s.level == p.level))
    {
        let count = |c: ContentCategory| stats.content_types.get(&c).copied().unwrap_or(0);
        if count(ContentCategory::Gaming) > 5 {
            highlights.push("High gaming content, a good fit for rules extraction".to_string());
        }
        if count(ContentCategory::Reference) > 3 {
            highlights.push("Reference sections found, a good fit for structured data".to_string());
        }
    }

    let hybrid_sublevel = primary
        .as_ref()
        .filter(|p| p.avg_pages > HYBRID_PAGE_THRESHOLD)
        .map(|p| p.level + 1);

    StrategyAdvice {
        primary,
        secondary,
        hybrid_sublevel,
        highlights,
    }
}

pub fn outline_profile(
    levels: &[LevelStats],
    ranked: &[RankedLevel],
    total_entries: usize,
    page_count: usize,
) -> OutlineProfile {
    let totals = content_totals(levels);
    let (document_type, focus) = document_kind(&totals);
    let max_level = levels.iter().map(|s| s.level).max().unwrap_or(0);

    OutlineProfile {
        document_type,
        focus,
        content_distribution: distribution(&totals),
        insights: structural_insights(total_entries, max_level, page_count),
        notes: extraction_notes(&totals),
        strategy: strategy_advice(levels, ranked),
    }
}
