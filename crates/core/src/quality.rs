//! How much usable structure a document exposes through its fonts.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::headings::{DocumentProfile, HeadingCandidate};

/// Passing candidates needed before a level is worth splitting on.
const GOOD_LEVEL_MIN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityGrade {
    pub fn from_score(score: u32) -> Self {
        match score {
            60.. => QualityGrade::Excellent,
            40..=59 => QualityGrade::Good,
            20..=39 => QualityGrade::Fair,
            _ => QualityGrade::Poor,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QualityGrade::Excellent => "Excellent: strong font hierarchy, reliable heading detection",
            QualityGrade::Good => "Good: clear heading signals with some ambiguity",
            QualityGrade::Fair => "Fair: weak hierarchy, expect manual review",
            QualityGrade::Poor => "Poor: little structure beyond body text",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityGrade::Excellent => "Excellent",
            QualityGrade::Good => "Good",
            QualityGrade::Fair => "Fair",
            QualityGrade::Poor => "Poor",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureQuality {
    pub score: u32,
    pub grade: QualityGrade,
    pub headings_per_page: f32,
    pub notes: Vec<String>,
}

/// Rate the font structure of the sampled pages on a 0-100 scale.
pub fn assess_structure(
    profile: &DocumentProfile,
    candidates: &[HeadingCandidate],
) -> StructureQuality {
    let mut score = 0;
    let mut notes = Vec::new();

    if profile.font_count > 3 {
        score += 20;
        notes.push(format!("Font diversity: {} fonts in use", profile.font_count));
    } else {
        notes.push(format!(
            "Limited font diversity: {} font(s) in use",
            profile.font_count
        ));
    }

    if profile.size_range() > 8.0 {
        score += 25;
        notes.push(format!(
            "Wide size range: {:.1}pt to {:.1}pt",
            profile.min_size, profile.max_size
        ));
    } else {
        notes.push(format!(
            "Narrow size range: {:.1}pt difference",
            profile.size_range()
        ));
    }

    let headings_per_page = candidates.len() as f32 / profile.pages_sampled.max(1) as f32;
    if (0.5..=3.0).contains(&headings_per_page) {
        score += 20;
        notes.push(format!(
            "Heading density looks natural: {:.1} per page",
            headings_per_page
        ));
    } else if headings_per_page > 3.0 {
        notes.push(format!(
            "Dense heading candidates: {:.1} per page, raise --min-score",
            headings_per_page
        ));
    } else {
        notes.push(format!(
            "Sparse heading candidates: {:.1} per page",
            headings_per_page
        ));
    }

    let strong = candidates.iter().filter(|c| c.score > 10.0).count();
    if strong > 3 {
        score += 15;
        notes.push(format!("{} strong heading candidates (score above 10)", strong));
    }

    StructureQuality {
        score,
        grade: QualityGrade::from_score(score),
        headings_per_page,
        notes,
    }
}

/// Recurring traits across the candidates, used to describe extraction cues.
pub fn heading_patterns(candidates: &[HeadingCandidate]) -> Vec<&'static str> {
    let total = candidates.len();
    let mut patterns = Vec::new();
    if total == 0 {
        return patterns;
    }

    let numbered = candidates.iter().filter(|c| c.indicators.is_numbered).count();
    if numbered > 3 {
        patterns.push("Numbered sections");
    }

    let title_case = candidates
        .iter()
        .filter(|c| c.indicators.is_title_case)
        .count();
    if title_case as f32 > total as f32 * 0.6 {
        patterns.push("Title case headings");
    }

    let bold = candidates.iter().filter(|c| c.indicators.is_bold).count();
    if bold as f32 > total as f32 * 0.5 {
        patterns.push("Bold formatting");
    }

    let sizes: BTreeSet<u32> = candidates
        .iter()
        .take(10)
        .map(|c| (c.font_size * 10.0).round() as u32)
        .collect();
    if sizes.len() <= 3 {
        patterns.push("Consistent heading sizes");
    }

    patterns
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelRecommendation {
    /// Enough sections to split on.
    Good { sections: usize, per_page: f32 },
    /// Too few sections; loosen the threshold or try another level.
    Limited { sections: usize },
}

pub fn level_recommendation(passing: usize, total_pages: usize) -> LevelRecommendation {
    if passing >= GOOD_LEVEL_MIN {
        LevelRecommendation::Good {
            sections: passing,
            per_page: passing as f32 / total_pages.max(1) as f32,
        }
    } else {
        LevelRecommendation::Limited { sections: passing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headings::{HeadingIndicators, SizeBucket};

    fn profile(font_count: usize, min: f32, max: f32, pages: usize) -> DocumentProfile {
        DocumentProfile {
            total_pages: pages,
            pages_sampled: pages,
            pages_with_text: pages,
            baseline: min,
            min_size: min,
            max_size: max,
            mean_size: min,
            median_size: min,
            histogram: vec![SizeBucket {
                size: min,
                chars: 100,
            }],
            font_count,
            primary_fonts: vec![],
        }
    }

    fn heading(score: f32, indicators: HeadingIndicators) -> HeadingCandidate {
        HeadingCandidate {
            text: "Heading".to_string(),
            level: 1,
            score,
            page: 1,
            font_size: 18.0,
            indicators,
        }
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(QualityGrade::from_score(80), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_score(60), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_score(45), QualityGrade::Good);
        assert_eq!(QualityGrade::from_score(20), QualityGrade::Fair);
        assert_eq!(QualityGrade::from_score(0), QualityGrade::Poor);
    }

    #[test]
    fn test_rich_structure_scores_all_factors() {
        let candidates: Vec<_> = (0..8)
            .map(|_| heading(15.0, HeadingIndicators::default()))
            .collect();
        let quality = assess_structure(&profile(5, 10.0, 24.0, 4), &candidates);
        assert_eq!(quality.score, 80);
        assert_eq!(quality.grade, QualityGrade::Excellent);
        assert_eq!(quality.headings_per_page, 2.0);
    }

    #[test]
    fn test_flat_document_is_poor() {
        let quality = assess_structure(&profile(1, 11.0, 12.0, 10), &[]);
        assert_eq!(quality.score, 0);
        assert_eq!(quality.grade, QualityGrade::Poor);
        assert!(quality.notes.iter().any(|n| n.contains("Sparse")));
    }

    #[test]
    fn test_heading_patterns() {
        let bold_numbered = HeadingIndicators {
            is_bold: true,
            is_numbered: true,
            ..Default::default()
        };
        let candidates: Vec<_> = (0..5)
            .map(|_| heading(12.0, bold_numbered.clone()))
            .collect();
        let patterns = heading_patterns(&candidates);
        assert!(patterns.contains(&"Numbered sections"));
        assert!(patterns.contains(&"Bold formatting"));
        assert!(patterns.contains(&"Consistent heading sizes"));
        assert!(!patterns.contains(&"Title case headings"));
        assert!(heading_patterns(&[]).is_empty());
    }

    #[test]
    fn test_level_recommendation() {
        assert_eq!(
            level_recommendation(10, 20),
            LevelRecommendation::Good {
                sections: 10,
                per_page: 0.5
            }
        );
        assert_eq!(
            level_recommendation(2, 20),
            LevelRecommendation::Limited { sections: 2 }
        );
    }
}
