//! Chapter planning from outline entries and output file naming.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::outline::{OutlineEntry, RankedLevel};

pub const DEFAULT_LEVEL: u32 = 1;

/// Slug used when a title has no usable characters.
const EMPTY_SLUG: &str = "section";

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ChapterError {
    #[error("No outline entries at level {level} (available levels: {available:?})")]
    NoEntriesAtLevel { level: u32, available: Vec<u32> },

    #[error("Invalid chapter selection '{0}'")]
    InvalidSelection(String),

    #[error("Chapter {ordinal} is out of range (1-{total})")]
    OutOfRange { ordinal: usize, total: usize },
}

/// A contiguous page range taken from one outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// 1-based position among the entries at the split level.
    pub ordinal: usize,
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
}

impl Chapter {
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterFile {
    pub chapter: Chapter,
    pub file_name: String,
}

/// The requested level, else the level that ranks best for extraction, else
/// the top level.
pub fn chapter_level(requested: Option<u32>, ranked: &[RankedLevel]) -> u32 {
    requested
        .or_else(|| ranked.first().map(|r| r.level))
        .unwrap_or(DEFAULT_LEVEL)
}

/// Levels that have at least one entry pointing inside the document.
pub fn split_levels(entries: &[OutlineEntry], page_count: usize) -> Vec<u32> {
    entries
        .iter()
        .filter(|e| e.page.is_some_and(|p| p >= 1 && p as usize <= page_count))
        .map(|e| e.level)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Turn the entries at `level` into page ranges.
///
/// Each chapter ends the page before the next one starts, the last one at
/// the end of the document. Chapters starting on the same page as their
/// successor keep that single page, so the page lands in both outputs.
pub fn plan_chapters(
    entries: &[OutlineEntry],
    level: u32,
    page_count: usize,
) -> Result<Vec<Chapter>, ChapterError> {
    let last_page = page_count as u32;
    let starts: Vec<(&str, u32)> = entries
        .iter()
        .filter(|e| e.level == level)
        .filter_map(|e| match e.page {
            Some(page) if page >= 1 && page <= last_page => Some((e.title.as_str(), page)),
            _ => {
                log::debug!(
                    "skipping outline entry '{}': target {:?} is outside 1-{}",
                    e.title,
                    e.page,
                    last_page
                );
                None
            }
        })
        .collect();

    if starts.is_empty() {
        return Err(ChapterError::NoEntriesAtLevel {
            level,
            available: split_levels(entries, page_count),
        });
    }

    Ok(starts
        .iter()
        .enumerate()
        .map(|(idx, (title, start))| {
            let end = match starts.get(idx + 1) {
                Some((_, next)) => next.saturating_sub(1),
                None => last_page,
            };
            Chapter {
                ordinal: idx + 1,
                title: title.trim().to_string(),
                start_page: *start,
                end_page: end.clamp(*start, last_page),
            }
        })
        .collect())
}

/// Parse a selection such as `1,3,5-7` into sorted, unique ordinals.
pub fn parse_selection(selection: &str, total: usize) -> Result<Vec<usize>, ChapterError> {
    let invalid = || ChapterError::InvalidSelection(selection.to_string());
    let mut picked = BTreeSet::new();

    for part in selection.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(invalid());
        }
        let (from, to) = match part.split_once('-') {
            Some((a, b)) => (
                a.trim().parse::<usize>().map_err(|_| invalid())?,
                b.trim().parse::<usize>().map_err(|_| invalid())?,
            ),
            None => {
                let n = part.parse::<usize>().map_err(|_| invalid())?;
                (n, n)
            }
        };
        if from > to {
            return Err(invalid());
        }
        for ordinal in from..=to {
            if ordinal == 0 || ordinal > total {
                return Err(ChapterError::OutOfRange { ordinal, total });
            }
            picked.insert(ordinal);
        }
    }

    Ok(picked.into_iter().collect())
}

pub fn select_chapters(
    plan: Vec<Chapter>,
    selection: Option<&str>,
) -> Result<Vec<Chapter>, ChapterError> {
    let Some(selection) = selection else {
        return Ok(plan);
    };
    let ordinals = parse_selection(selection, plan.len())?;
    Ok(plan
        .into_iter()
        .filter(|c| ordinals.contains(&c.ordinal))
        .collect())
}

fn underscores() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").unwrap())
}

/// File-system safe, lower-case form of a title.
///
/// Accents are folded to their base letters. Anything other than ASCII
/// letters, digits, spaces, `_` and `-` is dropped.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let spaced = kept.trim().replace(' ', "_").to_lowercase();
    let slug = underscores()
        .replace_all(&spaced, "_")
        .trim_matches('_')
        .to_string();

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}

/// `NN_slug.pdf`, optionally preceded by `prefix_`.
pub fn chapter_file_name(ordinal: usize, title: &str, prefix: Option<&str>) -> String {
    let name = format!("{:02}_{}.pdf", ordinal, slugify(title));
    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}_{}", prefix.trim_end_matches('_'), name),
        None => name,
    }
}

/// Name the selected chapters, numbering them in selection order.
pub fn name_chapters(chapters: Vec<Chapter>, prefix: Option<&str>) -> Vec<ChapterFile> {
    chapters
        .into_iter()
        .enumerate()
        .map(|(idx, chapter)| ChapterFile {
            file_name: chapter_file_name(idx + 1, &chapter.title, prefix),
            chapter,
        })
        .collect()
}

/// Things worth telling the user before splitting.
pub fn plan_warnings(entries: &[OutlineEntry], chapters: &[Chapter], page_count: usize) -> Vec<String> {
    let mut warnings = Vec::new();

    if entries.len() > page_count {
        warnings.push(format!(
            "The outline has more entries ({}) than the document has pages ({})",
            entries.len(),
            page_count
        ));
    }

    let shared = chapters
        .windows(2)
        .filter(|pair| pair[0].start_page == pair[1].start_page)
        .count();
    if shared > 0 {
        warnings.push(format!(
            "{} chapter(s) start on the same page as the next one; that page is copied into both files",
            shared
        ));
    }

    if let Some(first) = chapters.first() {
        if first.start_page > 1 {
            warnings.push(format!(
                "Pages 1-{} come before the first chapter and are not extracted",
                first.start_page - 1
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_level_falls_back_to_ranking() {
        assert_eq!(chapter_level(None, &[]), DEFAULT_LEVEL);
        let ranked = [
            RankedLevel { level: 3, score: 40.0 },
            RankedLevel { level: 1, score: 12.0 },
        ];
        assert_eq!(chapter_level(None, &ranked), 3);
        assert_eq!(chapter_level(Some(1), &ranked), 1);
    }

    fn entry(title: &str, level: u32, page: Option<u32>) -> OutlineEntry {
        OutlineEntry {
            title: title.to_string(),
            level,
            page,
        }
    }

    fn three_chapters() -> Vec<OutlineEntry> {
        vec![
            entry("Introduction", 1, Some(1)),
            entry("Getting Started", 2, Some(2)),
            entry("Core Rules", 1, Some(4)),
            entry("Appendix", 1, Some(9)),
        ]
    }

    #[test]
    fn test_plan_chapters_ranges() {
        let plan = plan_chapters(&three_chapters(), 1, 10).unwrap();
        let ranges: Vec<(u32, u32)> = plan.iter().map(|c| (c.start_page, c.end_page)).collect();
        assert_eq!(ranges, vec![(1, 3), (4, 8), (9, 10)]);
        assert_eq!(plan[1].page_count(), 5);
        assert_eq!(plan[2].ordinal, 3);
    }

    #[test]
    fn test_plan_chapters_same_page_duplicates() {
        let entries = vec![
            entry("Alpha", 1, Some(3)),
            entry("Beta", 1, Some(3)),
            entry("Gamma", 1, Some(5)),
        ];
        let plan = plan_chapters(&entries, 1, 6).unwrap();
        assert_eq!((plan[0].start_page, plan[0].end_page), (3, 3));
        assert_eq!((plan[1].start_page, plan[1].end_page), (3, 4));
        let warnings = plan_warnings(&entries, &plan, 6);
        assert!(warnings.iter().any(|w| w.contains("same page")));
        assert!(warnings.iter().any(|w| w.contains("Pages 1-2")));
    }

    #[test]
    fn test_plan_chapters_missing_level_reports_available() {
        let err = plan_chapters(&three_chapters(), 3, 10).unwrap_err();
        assert_eq!(
            err,
            ChapterError::NoEntriesAtLevel {
                level: 3,
                available: vec![1, 2],
            }
        );
    }

    #[test]
    fn test_plan_chapters_skips_unresolved_entries() {
        let entries = vec![
            entry("One", 1, Some(1)),
            entry("Lost", 1, None),
            entry("Two", 1, Some(5)),
        ];
        let plan = plan_chapters(&entries, 1, 8).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].end_page, 4);
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1,3,5-7", 8).unwrap(), vec![1, 3, 5, 6, 7]);
        assert_eq!(parse_selection(" 2 , 2 ", 3).unwrap(), vec![2]);
        assert_eq!(
            parse_selection("9", 3),
            Err(ChapterError::OutOfRange {
                ordinal: 9,
                total: 3
            })
        );
        assert!(matches!(
            parse_selection("3-1", 5),
            Err(ChapterError::InvalidSelection(_))
        ));
        assert!(matches!(
            parse_selection("a,b", 5),
            Err(ChapterError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_select_chapters_numbers_in_selection_order() {
        let plan = plan_chapters(&three_chapters(), 1, 10).unwrap();
        let picked = select_chapters(plan, Some("2-3")).unwrap();
        let files = name_chapters(picked, None);
        assert_eq!(files[0].file_name, "01_core_rules.pdf");
        assert_eq!(files[1].file_name, "02_appendix.pdf");
        assert_eq!(files[0].chapter.ordinal, 2);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Chapter 1: The Beginning"), "chapter_1_the_beginning");
        assert_eq!(slugify("  Spells & Magic!  "), "spells_magic");
        assert_eq!(slugify("Café Überblick"), "cafe_uberblick");
        assert_eq!(slugify("Part I - Rules"), "part_i_-_rules");
        assert_eq!(slugify("***"), "section");
    }

    #[test]
    fn test_chapter_file_name() {
        assert_eq!(chapter_file_name(3, "Monsters", None), "03_monsters.pdf");
        assert_eq!(
            chapter_file_name(12, "Monsters", Some("srd_")),
            "srd_12_monsters.pdf"
        );
        assert_eq!(chapter_file_name(1, "Monsters", Some("  ")), "01_monsters.pdf");
    }
}
