use colored::Colorize;
use extractorizer_core::headings::{rank_by_score, HeadingCandidate};
use extractorizer_core::quality::{LevelRecommendation, QualityGrade};
use extractorizer_core::review::{AutoLevelOutcome, ValidationResult, ValidationStatus};

use super::{Analysis, LevelFocus};
use crate::assist::AiReview;
use crate::prelude::{eprintln, println, *};

const TOP_HEADINGS: usize = 10;
const TOP_LEVEL_HEADINGS: usize = 20;
const HEADINGS_PER_LEVEL: usize = 5;

fn title(text: String) {
    println!("\n{}", rule().bright_cyan());
    println!("{}", text.bold().bright_white());
    println!("{}", rule().bright_cyan());
}

fn grade_label(grade: QualityGrade) -> colored::ColoredString {
    let text = grade.description();
    match grade {
        QualityGrade::Excellent | QualityGrade::Good => text.green(),
        QualityGrade::Fair => text.yellow(),
        QualityGrade::Poor => text.red(),
    }
}

fn heading_line(rank: usize, heading: &HeadingCandidate, width: usize) {
    println!("   {:>3}. \"{}\"", rank, truncate(&heading.text, width));
    println!(
        "        Page {}, Score: {:.1}, Font: {:.1}pt, Level {}",
        heading.page, heading.score, heading.font_size, heading.level
    );
}

fn print_levels_table(analysis: &Analysis) {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Level".bold().cyan(),
        "Font Size".bold().cyan(),
        "Headings".bold().cyan(),
        "Avg Score".bold().cyan()
    ]);
    for level in &analysis.levels {
        table.add_row(prettytable::row![
            level.level.to_string().green(),
            f!("{:.1}pt", level.font_size),
            level.count,
            f!("{:.1}", level.avg_score)
        ]);
    }
    table.printstd();
}

pub fn print_content_report(analysis: &Analysis, detailed: bool) {
    title(f!("Content Structure Analysis: {}", analysis.document));

    let profile = &analysis.profile;
    println!("{}", "Document Overview".bold());
    println!("   Total Pages: {}", analysis.total_pages);
    println!(
        "   Pages Sampled: {} ({} with text)",
        profile.pages_sampled, profile.pages_with_text
    );
    println!("   Analysis Method: font statistics (no TOC required)");

    let quality = &analysis.quality;
    println!("\n{}", "Structure Quality Assessment".bold());
    println!("   {}", grade_label(quality.grade));
    println!("   Quality Score: {}/100", quality.score);
    for note in &quality.notes {
        println!("   - {}", note);
    }

    println!("\n{}", "Font Structure Analysis".bold());
    println!("   Total Fonts: {}", profile.font_count);
    println!(
        "   Size Range: {:.1}pt - {:.1}pt",
        profile.min_size, profile.max_size
    );
    println!("   Average Size: {:.1}pt", profile.mean_size);
    println!("   Median Size: {:.1}pt", profile.median_size);
    println!("   Body Text Size: {:.1}pt", profile.baseline);
    if !profile.primary_fonts.is_empty() {
        let fonts = profile
            .primary_fonts
            .iter()
            .map(|font| f!("{} ({})", font.name, font.chars))
            .collect::<Vec<_>>()
            .join(", ");
        println!("   Primary Fonts: {}", fonts);
    }

    println!("\n{}", "Structural Elements".bold());
    println!(
        "   Potential Headings (score >= {:.1}): {}",
        analysis.min_score,
        analysis.headings.len()
    );
    println!("   Avg Headings/Page: {:.1}", quality.headings_per_page);

    if analysis.levels.is_empty() {
        println!("\n{}", "No text set larger than the body size was found.".yellow());
    } else {
        println!("\n{}", "Detected Heading Levels".bold());
        print_levels_table(analysis);
    }

    if !analysis.headings.is_empty() {
        println!("\n{}", "Top Potential Section Headings (All Levels)".bold());
        for (idx, heading) in rank_by_score(&analysis.headings)
            .into_iter()
            .take(TOP_HEADINGS)
            .enumerate()
        {
            heading_line(idx + 1, heading, 50);
        }
    }

    if detailed {
        println!("\n{}", "Headings by Level".bold());
        for level in &analysis.levels {
            let headings = analysis.headings_at(level.level);
            println!(
                "   {} ({:.1}pt, {} passing)",
                f!("Level {}", level.level).green(),
                level.font_size,
                headings.len()
            );
            for (idx, heading) in headings.iter().take(HEADINGS_PER_LEVEL).enumerate() {
                println!(
                    "      {}. \"{}\" (page {})",
                    idx + 1,
                    truncate(&heading.text, 60),
                    heading.page
                );
            }
        }
    }

    println!("\n{}", "Content Extraction Recommendations".bold());
    println!("{}", thin_rule());
    if matches!(quality.grade, QualityGrade::Excellent | QualityGrade::Good) {
        println!("{}", "Content-based extraction feasible".green().bold());
        println!("   - Font size patterns can identify section breaks");
        println!(
            "   - Look for text set larger than {:.1}pt",
            profile.median_size + 2.0
        );
        if !analysis.patterns.is_empty() {
            println!("   - Detected patterns: {}", analysis.patterns.join(", "));
        }
    } else {
        println!("{}", "Limited structure for automatic extraction".yellow().bold());
        println!("   - Consider manual section identification");
        println!("   - Page-based splitting may work better");
    }

    println!("\n{}", "Next Steps".bold());
    println!("   - Focus on one level with --level N");
    println!("   - Tune the threshold with --min-score");
    println!("   - Ask a local model to confirm a level with --ask-ai");
}

pub fn print_level_report(analysis: &Analysis, focus: &LevelFocus, detailed: bool) {
    let level = focus.summary.level;
    title(f!("Level {} Analysis: {}", level, analysis.document));

    println!("{}", f!("Level {} Details", level).bold());
    println!("   Font Size: {:.1}pt", focus.summary.font_size);
    println!("   Total Headings: {}", focus.summary.count);
    println!("   Average Score: {:.1}", focus.summary.avg_score);

    println!(
        "\n{}",
        f!(
            "Level {} Headings (score >= {:.1})",
            level, analysis.min_score
        )
        .bold()
    );
    println!("   Found {} headings meeting criteria", focus.headings.len());

    if detailed {
        println!("\n{}", f!("All Level {} Headings", level).bold());
        for (idx, heading) in focus.headings.iter().enumerate() {
            let labels = heading.indicators.labels();
            let labels = if labels.is_empty() {
                String::new()
            } else {
                f!(" [{}]", labels.join(", "))
            };
            println!("   {:>3}. \"{}\"", idx + 1, heading.text);
            println!(
                "        Page {}, Score: {:.1}{}",
                heading.page,
                heading.score,
                labels.bright_black()
            );
        }
    } else if !focus.headings.is_empty() {
        println!(
            "\n{}",
            f!("Top {} Level {} Headings", TOP_LEVEL_HEADINGS, level).bold()
        );
        for (idx, heading) in rank_by_score(&focus.headings)
            .into_iter()
            .take(TOP_LEVEL_HEADINGS)
            .enumerate()
        {
            heading_line(idx + 1, heading, 70);
        }
    }

    println!(
        "\n{}",
        f!("Level {} Extraction Recommendations", level).bold()
    );
    println!("{}", thin_rule());
    match &focus.recommendation {
        LevelRecommendation::Good { sections, per_page } => {
            println!(
                "{}",
                f!("Good extraction target: {} sections found", sections)
                    .green()
                    .bold()
            );
            println!("   - Font size: {:.1}pt", focus.summary.font_size);
            println!("   - Average {:.1} sections per page", per_page);
            println!("   - This level looks suitable for section-based splitting");
        }
        LevelRecommendation::Limited { sections } => {
            println!(
                "{}",
                f!("Limited sections at this level: {} found", sections)
                    .yellow()
                    .bold()
            );
            println!("   - Consider lowering --min-score");
            println!("   - Or try a different level");
        }
    }
}

fn status_label(status: ValidationStatus) -> colored::ColoredString {
    let text = status.to_string();
    match status {
        ValidationStatus::Valid => text.green().bold(),
        ValidationStatus::Invalid => text.red().bold(),
        ValidationStatus::TryLevel => text.yellow().bold(),
    }
}

fn print_validation(result: &ValidationResult) {
    println!("Status: {}", status_label(result.status));
    println!("Confidence: {:.0}%", result.confidence * 100.0);
    println!("Reason: {}", result.reason);
    if let Some(level) = result.suggested_level {
        println!("Suggested Level: {}", level);
    }
    println!(
        "Extraction Feasible: {}",
        if result.extraction_feasible { "yes" } else { "no" }
    );
    if !result.detected_patterns.is_empty() {
        println!("Detected Patterns: {}", result.detected_patterns.join(", "));
    }
    if let Some(analysis) = &result.sample_headings_analysis {
        println!("Sample Analysis: {}", analysis);
    }
}

fn print_auto_level(outcome: &AutoLevelOutcome) {
    println!("Levels Tested: {}", outcome.levels_tested.len());
    for attempt in &outcome.levels_tested {
        let status = match (&attempt.validation, &attempt.error) {
            (Some(validation), _) => status_label(validation.status),
            (None, Some(error)) => f!("error: {}", error).red(),
            (None, None) => "skipped".bright_black(),
        };
        println!("   Level {}: {}", attempt.level, status);
    }

    let Some(level) = outcome.optimal_level else {
        println!("{}", "No level was accepted by the model".yellow());
        return;
    };
    println!("{}", f!("Optimal Level Found: {}", level).green().bold());

    let Some(strategy) = &outcome.strategy else {
        return;
    };
    let primary = &strategy.primary_strategy;
    println!("\n{}", "Extraction Strategy".bold());
    println!("   Approach: {}", primary.approach);
    println!("   Target Level: {}", primary.target_level);
    println!("   Confidence: {:.0}%", primary.confidence * 100.0);
    println!("   Section Naming: {}", primary.section_naming);
    println!("   Grouping: {}", primary.grouping_strategy);

    let expected = &strategy.expected_output;
    println!("   Expected Sections: {}", expected.section_count);
    println!("   Output Format: {}", expected.output_format);
    println!("   Quality Estimate: {}", expected.quality_estimate);

    for challenge in &strategy.potential_challenges {
        println!(
            "   - {} ({:?}): {}",
            challenge.challenge, challenge.severity, challenge.mitigation
        );
    }
}

pub fn print_review(review: &AiReview) {
    match review {
        AiReview::Validation { level, result } => {
            title(f!("AI Analysis: Level {} Validation", level));
            print_validation(result);
        }
        AiReview::AutoLevel(outcome) => {
            title("AI Analysis: Auto Level Detection".to_string());
            print_auto_level(outcome);
        }
        AiReview::Failed { error } => {
            eprintln!("{} {}", "warning:".yellow().bold(), error);
            eprintln!("Showing heuristic results only.");
        }
    }
}
