//! Language-model review of detected heading levels.
//!
//! Everything here is pure: requests are built from the heuristic results,
//! prompts are plain text, and replies are parsed back into typed results.
//! The network call lives in the binary.

pub mod extract;
pub mod prompt;
pub mod types;

pub use extract::{extract_json, parse_strategy, parse_validation, ReviewError};
pub use prompt::{build_strategy_prompt, build_validation_prompt};
pub use types::{
    Approach, AutoLevelOutcome, Challenge, ExpectedOutput, ExtractionStrategy, FontSummary,
    LevelAttempt, PrimaryStrategy, SampleHeading, Severity, ValidationRequest, ValidationResult,
    ValidationStatus,
};

use crate::headings::{DocumentProfile, HeadingCandidate, LevelSummary};

pub const MAX_SAMPLE_HEADINGS: usize = 10;
pub const MAX_SAMPLE_CHARS: usize = 100;
/// Levels tried by `--auto-level` before giving up.
pub const MAX_AUTO_LEVELS: usize = 5;

/// Describe one level for the model.
///
/// `candidates` are the ones that passed the score filter for `summary.level`.
pub fn build_validation_request(
    document: &str,
    profile: &DocumentProfile,
    summary: &LevelSummary,
    candidates: &[HeadingCandidate],
    context: &str,
) -> ValidationRequest {
    ValidationRequest {
        document: document.to_string(),
        total_pages: profile.total_pages,
        level: summary.level,
        fonts: FontSummary {
            font_size: summary.font_size,
            total_fonts: profile.font_count,
            size_range: (profile.min_size, profile.max_size),
            median_size: profile.median_size,
        },
        heading_count: candidates.len(),
        avg_score: summary.avg_score,
        samples: candidates
            .iter()
            .take(MAX_SAMPLE_HEADINGS)
            .map(|c| SampleHeading {
                text: c.text.chars().take(MAX_SAMPLE_CHARS).collect(),
                page: c.page,
                score: c.score,
                font_size: c.font_size,
            })
            .collect(),
        context: context.to_string(),
    }
}

/// Levels with fewer headings than this are unlikely to be section breaks.
const MIN_USEFUL_COUNT: usize = 5;

fn count_preference(count: usize) -> f32 {
    if count >= MIN_USEFUL_COUNT {
        count.min(100) as f32
    } else {
        count as f32 * 0.1
    }
}

/// The order in which `--auto-level` asks about levels.
///
/// Best average score first, then levels with a useful number of headings.
/// Ties keep the shallower level first.
pub fn auto_level_order(summaries: &[LevelSummary], max: usize) -> Vec<u32> {
    let mut ordered: Vec<&LevelSummary> = summaries.iter().collect();
    ordered.sort_by_key(|s| s.level);
    ordered.sort_by(|a, b| {
        b.avg_score
            .total_cmp(&a.avg_score)
            .then(count_preference(b.count).total_cmp(&count_preference(a.count)))
    });
    ordered.into_iter().take(max).map(|s| s.level).collect()
}
