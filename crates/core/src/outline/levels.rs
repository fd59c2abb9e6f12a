use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::semantic::{categories_in, has_digit, is_title_case, semantic_score, ContentCategory};
use super::OutlineEntry;

const ARTICLES: &[&str] = &["the", "a", "an"];
const SAMPLE_TITLES: usize = 5;

/// Statistics for the outline entries at one depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    pub level: u32,
    pub count: usize,
    pub avg_title_length: f64,
    pub avg_word_count: f64,
    pub avg_semantic_score: f64,
    pub avg_page_range: f64,
    pub median_page_range: f64,
    pub content_types: BTreeMap<ContentCategory, usize>,
    pub numbered_pct: f64,
    pub article_pct: f64,
    pub proper_case_pct: f64,
    pub sample_titles: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedLevel {
    pub level: u32,
    pub score: f64,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Per-level statistics, shallowest level first.
///
/// Entries without a resolvable page are left out. The page range of an
/// entry runs to the next entry at the same level, or to the end of the
/// document for the last one.
pub fn analyze_levels(entries: &[OutlineEntry], page_count: usize) -> Vec<LevelStats> {
    let mut by_level: BTreeMap<u32, Vec<(&str, u32)>> = BTreeMap::new();
    for entry in entries {
        match entry.page {
            Some(page) => by_level
                .entry(entry.level)
                .or_default()
                .push((entry.title.as_str(), page)),
            None => log::debug!("outline entry '{}' has no target page", entry.title),
        }
    }

    by_level
        .into_iter()
        .map(|(level, items)| level_stats(level, &items, page_count))
        .collect()
}

fn level_stats(level: u32, items: &[(&str, u32)], page_count: usize) -> LevelStats {
    let count = items.len();

    let ranges: Vec<f64> = items
        .iter()
        .enumerate()
        .map(|(i, (_, page))| {
            let end = match items.get(i + 1) {
                Some((_, next)) => *next as i64,
                None => page_count as i64 + 1,
            };
            (end - *page as i64) as f64
        })
        .collect();

    let lengths: Vec<f64> = items
        .iter()
        .map(|(t, _)| t.chars().count() as f64)
        .collect();
    let words: Vec<f64> = items
        .iter()
        .map(|(t, _)| t.split_whitespace().count() as f64)
        .collect();
    let semantic: Vec<f64> = items
        .iter()
        .map(|(t, _)| semantic_score(t) as f64)
        .collect();

    let mut content_types: BTreeMap<ContentCategory, usize> = BTreeMap::new();
    for (title, _) in items {
        for category in categories_in(title) {
            *content_types.entry(category).or_default() += 1;
        }
    }

    let numbered = items.iter().filter(|(t, _)| has_digit(t)).count();
    let with_article = items
        .iter()
        .filter(|(t, _)| {
            t.split_whitespace()
                .any(|w| ARTICLES.contains(&w.to_lowercase().as_str()))
        })
        .count();
    let proper_case = items.iter().filter(|(t, _)| is_title_case(t)).count();

    LevelStats {
        level,
        count,
        avg_title_length: mean(&lengths),
        avg_word_count: mean(&words),
        avg_semantic_score: mean(&semantic),
        avg_page_range: mean(&ranges),
        median_page_range: median(&ranges),
        content_types,
        numbered_pct: percent(numbered, count),
        article_pct: percent(with_article, count),
        proper_case_pct: percent(proper_case, count),
        sample_titles: items
            .iter()
            .take(SAMPLE_TITLES)
            .map(|(t, _)| t.to_string())
            .collect(),
    }
}

/// How well a level would work as the unit of chapter extraction.
pub fn level_extraction_score(stats: &LevelStats) -> f64 {
    let mut score = (stats.avg_semantic_score * 2.0).min(40.0);

    score += match stats.count {
        3..=50 => 20.0,
        51..=100 => 15.0,
        0..=2 => -10.0,
        101..=200 => 0.0,
        _ => -5.0,
    };

    let pages = stats.avg_page_range;
    if (5.0..=100.0).contains(&pages) {
        score += 20.0;
    } else if (101.0..=200.0).contains(&pages) {
        score += 15.0;
    } else if pages < 3.0 {
        score -= 5.0;
    }

    score += (stats.content_types.len() as f64 * 3.0).min(15.0);

    if stats.proper_case_pct > 70.0 {
        score += 5.0;
    }

    score
}

/// Levels ordered by extraction score, best first. Ties keep the shallower level first.
pub fn rank_levels(levels: &[LevelStats]) -> Vec<RankedLevel> {
    let mut ranked: Vec<RankedLevel> = levels
        .iter()
        .map(|stats| RankedLevel {
            level: stats.level,
            score: level_extraction_score(stats),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
