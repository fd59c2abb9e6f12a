//! Heading detection for documents without a usable outline.

use std::path::PathBuf;

use extractorizer_core::headings::{
    available_levels, best_level, build_profile, filter_candidates, sample_pages,
    score_candidates, summarize_levels, DocumentProfile, HeadingCandidate, LevelSummary,
    PageSample, DEFAULT_MIN_SCORE, DEFAULT_SAMPLE_RATIO,
};
use extractorizer_core::quality::{
    assess_structure, heading_patterns, level_recommendation, LevelRecommendation,
    StructureQuality,
};

use crate::assist::{self, AiOptions, AiReview};
use crate::load;
use crate::prelude::{println, *};

mod report;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct AnalyzeOptions {
    /// Path to the PDF file
    pub path: PathBuf,

    /// Show every heading, grouped by level
    #[arg(long)]
    pub detailed: bool,

    /// Focus on one heading level (1 = largest font)
    #[arg(long)]
    pub level: Option<u32>,

    /// Minimum confidence score for a heading to be listed
    #[arg(long, env = "EXTRACTORIZER_MIN_SCORE", default_value_t = DEFAULT_MIN_SCORE)]
    pub min_score: f32,

    /// Share of pages to sample in documents longer than ten pages
    #[arg(long, env = "EXTRACTORIZER_SAMPLE_RATIO", default_value_t = DEFAULT_SAMPLE_RATIO)]
    pub sample_ratio: f64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[clap(flatten)]
    pub ai: AiOptions,
}

/// A single level, filtered by the score threshold.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LevelFocus {
    pub summary: LevelSummary,
    /// Passing headings in document order.
    pub headings: Vec<HeadingCandidate>,
    pub recommendation: LevelRecommendation,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Analysis {
    pub document: String,
    pub total_pages: usize,
    pub min_score: f32,
    pub profile: DocumentProfile,
    pub quality: StructureQuality,
    pub patterns: Vec<String>,
    /// Every detected level, from all scored lines.
    pub levels: Vec<LevelSummary>,
    /// Lines scoring at least `min_score`, all levels, in document order.
    pub headings: Vec<HeadingCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<LevelFocus>,
}

impl Analysis {
    pub fn level(&self, level: u32) -> Option<&LevelSummary> {
        self.levels.iter().find(|s| s.level == level)
    }

    /// Passing headings at one level.
    pub fn headings_at(&self, level: u32) -> Vec<HeadingCandidate> {
        filter_candidates(&self.headings, Some(level), self.min_score)
    }
}

/// Score the sampled pages of one document.
///
/// Fails when `level` is given and no line was detected at that level.
pub fn analyze_samples(
    document: String,
    samples: &[PageSample],
    total_pages: usize,
    level: Option<u32>,
    min_score: f32,
) -> Result<Analysis> {
    let profile = build_profile(samples, total_pages);
    let candidates = score_candidates(samples, &profile);
    let levels = summarize_levels(&candidates);
    let headings = filter_candidates(&candidates, None, min_score);
    let quality = assess_structure(&profile, &headings);
    let patterns = heading_patterns(&headings)
        .into_iter()
        .map(String::from)
        .collect();

    let focus = match level {
        None => None,
        Some(level) => {
            let summary = levels
                .iter()
                .find(|s| s.level == level)
                .cloned()
                .ok_or_else(|| Error::LevelNotFound {
                    level,
                    available: available_levels(&levels),
                })?;
            let passing = filter_candidates(&candidates, Some(level), min_score);
            Some(LevelFocus {
                recommendation: level_recommendation(passing.len(), total_pages),
                summary,
                headings: passing,
            })
        }
    };

    Ok(Analysis {
        document,
        total_pages,
        min_score,
        profile,
        quality,
        patterns,
        levels,
        headings,
        focus,
    })
}

pub fn analyze_data(options: &AnalyzeOptions) -> Result<Analysis> {
    let doc = load::open(&options.path)?;
    let total_pages = doc.page_count();
    let pages = sample_pages(total_pages, options.sample_ratio);
    log::debug!("sampling {} of {} pages", pages.len(), total_pages);

    let samples = load::sample_pages(&doc, &pages);
    analyze_samples(
        load::document_name(&options.path),
        &samples,
        total_pages,
        options.level,
        options.min_score,
    )
}

#[derive(Debug, serde::Serialize)]
struct AnalyzeOutput<'a> {
    analysis: &'a Analysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai: Option<&'a AiReview>,
}

pub async fn run(options: AnalyzeOptions, _global: crate::Global) -> Result<()> {
    if !(options.sample_ratio > 0.0 && options.sample_ratio <= 1.0) {
        return Err(eyre!(
            "--sample-ratio must be in (0, 1], got {}",
            options.sample_ratio
        ));
    }

    let analysis = analyze_data(&options)?;

    let review = if options.ai.ask_ai {
        Some(review(&analysis, &options).await)
    } else {
        None
    };

    if options.json {
        let output = AnalyzeOutput {
            analysis: &analysis,
            ai: review.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Some(review) = &review {
        report::print_review(review);
        if review.found_level() {
            return Ok(());
        }
    }

    match &analysis.focus {
        Some(focus) => report::print_level_report(&analysis, focus, options.detailed),
        None => report::print_content_report(&analysis, options.detailed),
    }

    Ok(())
}

/// Run the requested model review. Failures come back inside the review so
/// the heuristic report is always printed.
async fn review(analysis: &Analysis, options: &AnalyzeOptions) -> AiReview {
    match assist::OllamaReviewer::new(&options.ai) {
        Ok(reviewer) => review_with(&reviewer, analysis, options).await,
        Err(err) => AiReview::Failed {
            error: err.to_string(),
        },
    }
}

async fn review_with<R: assist::Reviewer>(
    reviewer: &R,
    analysis: &Analysis,
    options: &AnalyzeOptions,
) -> AiReview {
    let context = options.ai.context.as_deref().unwrap_or_default();

    if options.ai.auto_level {
        if !options.json {
            println!("Using AI to find the optimal extraction level...");
        }
        return AiReview::AutoLevel(assist::auto_level(reviewer, analysis, context).await);
    }

    let Some(level) = options.level.or_else(|| best_level(&analysis.levels)) else {
        return AiReview::Failed {
            error: "No heading levels detected; nothing to validate".to_string(),
        };
    };
    if !options.json {
        println!("Using AI to validate level {}...", level);
    }
    assist::validate_level(reviewer, analysis, level, context).await
}
