use std::fmt;

use serde::{Deserialize, Serialize};

use super::levels::RankedLevel;
use super::OutlineEntry;

pub const MIN_ENTRIES: usize = 2;
pub const MIN_RESOLVED_RATIO: f64 = 0.8;
pub const MIN_COVERAGE: f64 = 0.5;
pub const SUITABLE_SCORE: u32 = 50;

const ORDER_POINTS: u32 = 30;
const NESTING_POINTS: u32 = 20;
const COVERAGE_POINTS: u32 = 20;
const LEVEL_POINTS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Suitable,
    Marginal,
    Unsuitable,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Suitable => "SUITABLE",
            Verdict::Marginal => "MARGINAL",
            Verdict::Unsuitable => "UNSUITABLE",
        };
        write!(f, "{}", s)
    }
}

/// One line of the usability breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    pub passed: bool,
    /// A failed required check makes the outline unusable on its own.
    pub required: bool,
    pub points: u32,
    pub max_points: u32,
    pub detail: String,
}

impl Factor {
    fn check(name: &str, passed: bool, detail: String) -> Self {
        Factor {
            name: name.to_string(),
            passed,
            required: true,
            points: 0,
            max_points: 0,
            detail,
        }
    }

    fn scored(name: &str, passed: bool, points: u32, max_points: u32, detail: String) -> Self {
        Factor {
            name: name.to_string(),
            passed,
            required: false,
            points,
            max_points,
            detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineAssessment {
    pub verdict: Verdict,
    /// Composite 0-100, zero when a required check failed.
    pub score: u32,
    pub factors: Vec<Factor>,
}

impl OutlineAssessment {
    pub fn is_usable(&self) -> bool {
        self.verdict != Verdict::Unsuitable
    }

    fn unsuitable(factors: Vec<Factor>) -> Self {
        OutlineAssessment {
            verdict: Verdict::Unsuitable,
            score: 0,
            factors,
        }
    }
}

/// Decide whether an outline can drive chapter splitting.
///
/// Required checks run first and stop at the first failure: a non-empty
/// outline, at least two entries, most entries pointing inside the document,
/// and pages that never go backwards. The remaining factors build the
/// composite score.
pub fn assess_outline(
    entries: &[OutlineEntry],
    page_count: usize,
    ranked: &[RankedLevel],
) -> OutlineAssessment {
    let mut factors = Vec::new();

    let present = !entries.is_empty();
    factors.push(Factor::check(
        "Outline present",
        present,
        if present {
            format!("{} outline entries", entries.len())
        } else {
            "The document has no embedded outline".to_string()
        },
    ));
    if !present {
        return OutlineAssessment::unsuitable(factors);
    }

    let enough = entries.len() >= MIN_ENTRIES;
    factors.push(Factor::check(
        "Entry count",
        enough,
        format!("{} entries (minimum {})", entries.len(), MIN_ENTRIES),
    ));
    if !enough {
        return OutlineAssessment::unsuitable(factors);
    }

    let in_document = |page: &u32| *page >= 1 && *page as usize <= page_count;
    let resolved: Vec<u32> = entries
        .iter()
        .filter_map(|e| e.page)
        .filter(in_document)
        .collect();
    let ratio = resolved.len() as f64 / entries.len() as f64;
    let resolvable = ratio >= MIN_RESOLVED_RATIO;
    factors.push(Factor::check(
        "Resolvable targets",
        resolvable,
        format!(
            "{} of {} entries point inside the document ({:.0}%, minimum {:.0}%)",
            resolved.len(),
            entries.len(),
            ratio * 100.0,
            MIN_RESOLVED_RATIO * 100.0
        ),
    ));
    if !resolvable {
        return OutlineAssessment::unsuitable(factors);
    }

    let backwards = resolved.windows(2).position(|pair| pair[1] < pair[0]);
    factors.push(Factor {
        points: if backwards.is_none() { ORDER_POINTS } else { 0 },
        max_points: ORDER_POINTS,
        ..Factor::check(
            "Page order",
            backwards.is_none(),
            match backwards {
                None => "Target pages never decrease in outline order".to_string(),
                Some(idx) => format!(
                    "Page {} follows page {} in outline order",
                    resolved[idx + 1],
                    resolved[idx]
                ),
            },
        )
    });
    if backwards.is_some() {
        return OutlineAssessment::unsuitable(factors);
    }

    let skips = entries
        .windows(2)
        .filter(|pair| pair[1].level > pair[0].level + 1)
        .count();
    let nesting_points = if skips == 0 {
        NESTING_POINTS
    } else if skips * 10 <= entries.len() {
        NESTING_POINTS / 2
    } else {
        0
    };
    factors.push(Factor::scored(
        "Level nesting",
        skips == 0,
        nesting_points,
        NESTING_POINTS,
        format!("{} entries skip more than one level", skips),
    ));

    let first_page = resolved.first().copied().unwrap_or(1);
    let coverage = if page_count == 0 {
        0.0
    } else {
        (page_count as f64 - first_page as f64 + 1.0) / page_count as f64
    };
    let covered = coverage >= MIN_COVERAGE;
    factors.push(Factor::scored(
        "Coverage",
        covered,
        if covered {
            (COVERAGE_POINTS as f64 * coverage).round() as u32
        } else {
            0
        },
        COVERAGE_POINTS,
        format!(
            "Outline spans {:.0}% of the document from page {}",
            coverage * 100.0,
            first_page
        ),
    ));

    let best = ranked.first();
    let best_score = best.map_or(0.0, |r| r.score);
    factors.push(Factor::scored(
        "Best level",
        best_score >= SUITABLE_SCORE as f64,
        (best_score.clamp(0.0, 100.0) * LEVEL_POINTS as f64 / 100.0).round() as u32,
        LEVEL_POINTS,
        match best {
            Some(r) => format!("Level {} scores {:.1}/100 for extraction", r.level, r.score),
            None => "No level has entries with resolvable pages".to_string(),
        },
    ));

    let score: u32 = factors.iter().map(|f| f.points).sum();
    let verdict = if score >= SUITABLE_SCORE {
        Verdict::Suitable
    } else {
        Verdict::Marginal
    };

    OutlineAssessment {
        verdict,
        score,
        factors,
    }
}

/// The factor lines, one per line, for error messages and plain output.
pub fn breakdown(assessment: &OutlineAssessment) -> String {
    assessment
        .factors
        .iter()
        .map(|f| {
            let mark = if f.passed { "ok" } else { "FAIL" };
            if f.required && f.max_points == 0 {
                format!("[{}] {}: {}", mark, f.name, f.detail)
            } else {
                format!(
                    "[{}] {} ({}/{}): {}",
                    mark, f.name, f.points, f.max_points, f.detail
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::levels::{analyze_levels, rank_levels};

    fn entry(title: &str, level: u32, page: Option<u32>) -> OutlineEntry {
        OutlineEntry {
            title: title.to_string(),
            level,
            page,
        }
    }

    fn assess(entries: &[OutlineEntry], pages: usize) -> OutlineAssessment {
        let ranked = rank_levels(&analyze_levels(entries, pages));
        assess_outline(entries, pages, &ranked)
    }

    fn chapters() -> Vec<OutlineEntry> {
        vec![
            entry("Chapter 1: Beginnings", 1, Some(1)),
            entry("Chapter 2: Spells", 1, Some(11)),
            entry("Chapter 3: Monsters", 1, Some(21)),
        ]
    }

    #[test]
    fn test_empty_outline_is_unsuitable() {
        let result = assess(&[], 10);
        assert_eq!(result.verdict, Verdict::Unsuitable);
        assert_eq!(result.score, 0);
        assert_eq!(result.factors.len(), 1);
        assert!(!result.is_usable());
    }

    #[test]
    fn test_single_entry_is_unsuitable() {
        let result = assess(&[entry("Only", 1, Some(1))], 10);
        assert_eq!(result.verdict, Verdict::Unsuitable);
        assert_eq!(result.factors[1].name, "Entry count");
    }

    #[test]
    fn test_non_monotonic_pages_are_unsuitable() {
        let entries = vec![
            entry("Chapter 1", 1, Some(1)),
            entry("Chapter 2", 1, Some(20)),
            entry("Chapter 3", 1, Some(5)),
        ];
        let result = assess(&entries, 30);
        assert_eq!(result.verdict, Verdict::Unsuitable);
        let order = result.factors.last().map(|f| f.detail.clone());
        assert_eq!(order.as_deref(), Some("Page 5 follows page 20 in outline order"));
    }

    #[test]
    fn test_unresolved_targets_are_unsuitable() {
        let entries = vec![
            entry("A", 1, Some(1)),
            entry("B", 1, None),
            entry("C", 1, Some(99)),
        ];
        assert_eq!(assess(&entries, 10).verdict, Verdict::Unsuitable);
    }

    #[test]
    fn test_well_formed_outline_is_suitable() {
        let result = assess(&chapters(), 30);
        assert_eq!(result.verdict, Verdict::Suitable);
        // order 30, nesting 20, coverage 20, best level 88 * 0.3
        assert_eq!(result.score, 30 + 20 + 20 + 26);
        assert!(breakdown(&result).contains("[ok] Page order"));
    }

    #[test]
    fn test_late_start_loses_coverage() {
        let entries = vec![
            entry("Appendix A", 1, Some(80)),
            entry("Appendix B", 1, Some(90)),
        ];
        let result = assess(&entries, 100);
        let coverage = result
            .factors
            .iter()
            .find(|f| f.name == "Coverage")
            .map(|f| f.passed);
        assert_eq!(coverage, Some(false));
        // order 30, nesting 20, no coverage, best level 42 * 0.3
        assert_eq!(result.score, 30 + 20 + 13);
    }

    #[test]
    fn test_weak_outline_is_marginal() {
        let entries = vec![entry("x", 1, Some(9)), entry("y", 3, Some(10))];
        let result = assess(&entries, 10);
        assert_eq!(result.verdict, Verdict::Marginal);
        assert_eq!(result.score, 30);
        assert!(result.is_usable());
    }

    #[test]
    fn test_level_skips_reduce_score() {
        let entries = vec![
            entry("Chapter 1", 1, Some(1)),
            entry("Deep", 3, Some(2)),
            entry("Chapter 2", 1, Some(5)),
        ];
        let result = assess(&entries, 10);
        let nesting = result
            .factors
            .iter()
            .find(|f| f.name == "Level nesting")
            .map(|f| f.points);
        assert_eq!(nesting, Some(0));
    }
}
