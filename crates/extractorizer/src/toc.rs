use std::path::{Path, PathBuf};

use colored::Colorize;
use extractorizer_core::chapters::{chapter_level, name_chapters, plan_chapters, ChapterFile};
use extractorizer_core::metadata::format_pdf_date;
use extractorizer_core::outline::{
    breakdown, outline_report, OutlineEntry, OutlineReport, Verdict,
};
use extractorizer_core::stats::{inventory_pages, summarize_inventory, DocumentStats};

use crate::load;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct TocOptions {
    /// Path to the PDF file
    pub path: PathBuf,

    /// Also sample pages for content and font statistics
    #[arg(long)]
    pub detailed: bool,

    /// Outline level previewed as chapter breaks [default: the best-ranked level]
    #[arg(long)]
    pub level: Option<u32>,

    /// Number of outline entries listed in the report
    #[arg(long, default_value_t = DEFAULT_ENTRY_LIMIT)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

const DEFAULT_ENTRY_LIMIT: usize = 20;

#[derive(Debug, Clone, serde::Serialize)]
pub struct TocReport {
    pub document: String,
    pub metadata: pdf::DocumentMetadata,
    /// Creation date as `YYYY-MM-DD HH:MM:SS`.
    pub created: Option<String>,
    pub outline: OutlineReport,
    pub entries: Vec<OutlineEntry>,
    /// Level used for the chapter preview.
    pub chapter_level: u32,
    /// Page ranges and file names a split at `chapter_level` would produce.
    pub chapters: Vec<ChapterFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DocumentStats>,
}

/// Build the diagnostic for one document.
pub fn toc_data(path: &Path, detailed: bool, level: Option<u32>) -> Result<TocReport> {
    let doc = load::open(path)?;
    let metadata = doc.metadata();
    let page_count = doc.page_count();
    let entries = load::outline_entries(&doc);

    let stats = detailed.then(|| {
        let pages = inventory_pages(page_count);
        summarize_inventory(&load::inventory_pages(&doc, &pages), page_count)
    });

    let outline = outline_report(&entries, page_count);
    let chapter_level = chapter_level(level, &outline.ranked);
    let chapters = match plan_chapters(&entries, chapter_level, page_count) {
        Ok(plan) => name_chapters(plan, None),
        Err(err) => {
            log::debug!("no chapter preview: {}", err);
            Vec::new()
        }
    };

    Ok(TocReport {
        document: load::document_name(path),
        created: metadata.creation_date.as_deref().and_then(format_pdf_date),
        metadata,
        outline,
        entries,
        chapter_level,
        chapters,
        stats,
    })
}

pub async fn run(options: TocOptions, _global: crate::Global) -> Result<()> {
    let report = toc_data(&options.path, options.detailed, options.level)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_overview(&report);
    print_assessment(&report.outline);

    if report.outline.total_entries == 0 {
        println!(
            "\n{}",
            "No table of contents found. Try `extractorizer analyze` to infer headings from fonts."
                .yellow()
        );
        if let Some(stats) = &report.stats {
            print_stats(stats);
        }
        return Ok(());
    }

    print_entries(&report.entries, options.limit);
    print_chapters(&report);
    if let Some(stats) = &report.stats {
        print_stats(stats);
    }
    print_levels(&report.outline);
    print_strategy(&report.outline);
    print_content(&report.outline);

    Ok(())
}

fn print_overview(report: &TocReport) {
    println!("\n{}", rule().bright_cyan());
    println!(
        "{}",
        f!("TOC Analysis: {}", report.document).bold().bright_white()
    );
    println!("{}", rule().bright_cyan());

    let meta = &report.metadata;
    let mut table = new_table();
    table.add_row(prettytable::row!["Total Pages".green(), report.outline.total_pages]);
    table.add_row(prettytable::row!["TOC Entries".green(), report.outline.total_entries]);
    if report.outline.max_level > 0 {
        table.add_row(prettytable::row![
            "TOC Levels".green(),
            f!(
                "{} (1-{})",
                report.outline.levels.len(),
                report.outline.max_level
            )
        ]);
    }
    if let Some(title) = &meta.title {
        table.add_row(prettytable::row!["Title".green(), title]);
    }
    if let Some(author) = &meta.author {
        table.add_row(prettytable::row!["Author".green(), author]);
    }
    if let Some(creator) = &meta.creator {
        table.add_row(prettytable::row!["Creator".green(), creator]);
    }
    if let Some(producer) = &meta.producer {
        table.add_row(prettytable::row!["Producer".green(), producer]);
    }
    if let Some(created) = &report.created {
        table.add_row(prettytable::row!["Created".green(), created]);
    }
    table.printstd();
}

fn verdict_label(verdict: Verdict) -> colored::ColoredString {
    let text = verdict.to_string();
    match verdict {
        Verdict::Suitable => text.green().bold(),
        Verdict::Marginal => text.yellow().bold(),
        Verdict::Unsuitable => text.red().bold(),
    }
}

fn print_assessment(outline: &OutlineReport) {
    let assessment = &outline.assessment;
    println!("\n{}", "TOC Usability".bold());
    println!("{}", thin_rule());
    println!(
        "Verdict: {} (score {}/100)",
        verdict_label(assessment.verdict),
        assessment.score
    );
    for line in breakdown(assessment).lines() {
        println!("   {}", line);
    }
}

fn print_entries(entries: &[OutlineEntry], limit: usize) {
    println!(
        "\n{}",
        f!("Table of Contents ({} entries)", entries.len()).bold()
    );
    println!("{}", "-".repeat(60));
    for entry in entries.iter().take(limit) {
        let indent = "  ".repeat(entry.level.saturating_sub(1) as usize);
        let page = match entry.page {
            Some(page) => f!("Page {}", page),
            None => "unresolved".to_string(),
        };
        let title = if entry.level == 1 {
            entry.title.bold()
        } else {
            entry.title.normal()
        };
        println!("{}- {} ({})", indent, title, page.bright_black());
    }
    if entries.len() > limit {
        println!("   ... (showing first {} entries, see --limit)", limit);
    }
}

fn print_chapters(report: &TocReport) {
    let level = report.chapter_level;
    if report.chapters.is_empty() {
        println!(
            "\n{}",
            f!("No chapters found at level {}. Try a different --level.", level).yellow()
        );
        return;
    }

    println!(
        "\n{}",
        f!("{} chapters at level {}", report.chapters.len(), level).bold()
    );
    let mut table = new_table();
    table.add_row(prettytable::row![
        "#".bold().cyan(),
        "Title".bold().cyan(),
        "Pages".bold().cyan(),
        "File".bold().cyan()
    ]);
    for file in &report.chapters {
        let chapter = &file.chapter;
        table.add_row(prettytable::row![
            chapter.ordinal.to_string().green(),
            truncate(&chapter.title, 50),
            f!(
                "{}-{} ({})",
                chapter.start_page,
                chapter.end_page,
                chapter.page_count()
            ),
            file.file_name.bright_black()
        ]);
    }
    table.printstd();
}

fn rank_label(rank: usize) -> colored::ColoredString {
    match rank {
        1 => "OPTIMAL for chapter splitting".green().bold(),
        2 => "GOOD alternative option".cyan(),
        3 => "Consider for detailed extraction".yellow(),
        _ => "Low priority".bright_black(),
    }
}

fn print_levels(outline: &OutlineReport) {
    println!("\n{}", "Level Analysis & Recommendations".bold());
    println!("{}", "-".repeat(60));

    for (idx, ranked) in outline.ranked.iter().enumerate() {
        let Some(stats) = outline.level(ranked.level) else {
            continue;
        };
        println!("{}: {}", f!("Level {}", ranked.level).bold(), rank_label(idx + 1));
        println!("   Entries: {}", stats.count);
        println!("   Avg Pages/Entry: {:.1}", stats.avg_page_range);
        println!("   Semantic Score: {:.1}/10", stats.avg_semantic_score);
        println!("   Extraction Score: {:.1}/100", ranked.score);

        if !stats.content_types.is_empty() {
            let types = stats
                .content_types
                .iter()
                .map(|(category, count)| f!("{}({})", category.label(), count))
                .collect::<Vec<_>>()
                .join(", ");
            println!("   Content Types: {}", types);
        }
        if !stats.sample_titles.is_empty() {
            println!("   Sample Titles:");
            for title in &stats.sample_titles {
                println!("      - {}", title);
            }
        }
        println!();
    }
}

fn print_stats(stats: &DocumentStats) {
    let note = if stats.pages_analyzed < stats.total_pages {
        f!(
            " (sampled {} of {} pages)",
            stats.pages_analyzed, stats.total_pages
        )
    } else {
        String::new()
    };
    println!("\n{}{}", "Detailed Document Analysis".bold(), note);
    println!("{}", "-".repeat(60));

    let content = &stats.content;
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Images".green(),
        f!(
            "{} total ({:.1}/page)",
            content.total_images, content.images_per_page
        )
    ]);
    table.add_row(prettytable::row![
        "Drawings".green(),
        f!(
            "{} total ({:.1}/page)",
            content.total_drawings, content.drawings_per_page
        )
    ]);
    table.add_row(prettytable::row!["Links".green(), content.total_links]);
    table.add_row(prettytable::row!["Text Objects".green(), content.total_text_objects]);
    table.printstd();

    let fonts = &stats.fonts;
    println!("\n{}", "Font Analysis".bold());
    println!("   Unique Fonts: {}", fonts.unique_fonts);
    println!(
        "   Font Size Range: {:.1}pt - {:.1}pt",
        fonts.min_size, fonts.max_size
    );
    println!("   Average Font Size: {:.1}pt", fonts.avg_size);
    println!("   Median Font Size: {:.1}pt", fonts.median_size);

    if !fonts.top_fonts.is_empty() {
        let total: usize = fonts.top_fonts.iter().map(|(_, n)| n).sum();
        println!("   Most Used Fonts:");
        for (idx, (name, chars)) in fonts.top_fonts.iter().enumerate() {
            let pct = *chars as f64 / total.max(1) as f64 * 100.0;
            println!("      {}. {}: {} chars ({:.1}%)", idx + 1, name, chars, pct);
        }
    }
    if !fonts.size_distribution.is_empty() {
        println!("   Font Size Distribution:");
        for (band, count) in &fonts.size_distribution {
            println!("      {}: {} instances", band, count);
        }
    }

    println!("\n{}", "Document Type Indicators".bold());
    for indicator in &stats.indicators {
        println!("   - {}", indicator);
    }
}

fn print_strategy(outline: &OutlineReport) {
    let strategy = &outline.profile.strategy;
    let Some(primary) = &strategy.primary else {
        return;
    };

    println!("{}", "Extraction Strategy Recommendations".bold());
    println!("{}", thin_rule());
    println!(
        "{}",
        f!("Primary Strategy: Use Level {}", primary.level).green().bold()
    );
    println!("   - Will create {} chapters", primary.sections);
    println!("   - Average chapter size: {:.1} pages", primary.avg_pages);
    for highlight in &strategy.highlights {
        println!("   - {}", highlight);
    }

    if let Some(secondary) = &strategy.secondary {
        println!(
            "\n{}",
            f!("Secondary Strategy: Use Level {}", secondary.level).cyan()
        );
        println!(
            "   - For more granular extraction ({} sections)",
            secondary.sections
        );
        println!("   - Average section size: {:.1} pages", secondary.avg_pages);
    }

    if let Some(sublevel) = strategy.hybrid_sublevel {
        println!("\n{}", "Hybrid Strategy Recommended".yellow());
        println!("   - Use Level {} for major chapters", primary.level);
        println!(
            "   - Use Level {} for subsection extraction within large chapters",
            sublevel
        );
    }
}

fn print_content(outline: &OutlineReport) {
    let profile = &outline.profile;
    let total: usize = profile.content_distribution.iter().map(|(_, n)| n).sum();

    println!("\n{}", "Document Content Analysis".bold());
    println!("{}", "-".repeat(40));
    println!("Document Type: {}", profile.document_type.bright_white());
    println!("Primary Focus: {}", profile.focus);

    if !profile.content_distribution.is_empty() {
        println!("Content Distribution:");
        for (category, count) in profile.content_distribution.iter().take(5) {
            let pct = *count as f64 / total.max(1) as f64 * 100.0;
            println!(
                "   - {}: {} entries ({:.1}%)",
                category.label(),
                count,
                pct
            );
        }
    }

    println!("\n{}", "Structural Insights".bold());
    for insight in &profile.insights {
        println!("   - {}", insight);
    }

    if !profile.notes.is_empty() {
        println!("\n{}", "Content-Based Extraction Notes".bold());
        for note in &profile.notes {
            println!("   - {}", note);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf::fixture::SampleDocument;

    fn write(dir: &Path, name: &str, doc: SampleDocument) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, doc.build().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_toc_data_for_chaptered_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "manual.pdf",
            SampleDocument::new()
                .title("Player Manual")
                .created("D:20230415093000Z")
                .plain_pages(9)
                .bookmark("Chapter 1: Characters", 1, 1)
                .bookmark("Chapter 2: Spells", 1, 4)
                .bookmark("Chapter 3: Monsters", 1, 7),
        );

        let report = toc_data(&path, true, None).unwrap();
        assert_eq!(report.document, "manual.pdf");
        assert_eq!(report.metadata.title.as_deref(), Some("Player Manual"));
        assert_eq!(report.created.as_deref(), Some("2023-04-15 09:30:00"));
        assert_eq!(report.outline.total_entries, 3);
        assert!(report.outline.assessment.is_usable());

        let stats = report.stats.unwrap();
        assert_eq!(stats.pages_analyzed, 9);
        assert_eq!(stats.fonts.unique_fonts, 1);
    }

    #[test]
    fn test_toc_data_previews_chapters() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "guide.pdf",
            SampleDocument::new()
                .plain_pages(9)
                .bookmark("Chapter 1: Characters", 1, 1)
                .bookmark("Races", 2, 2)
                .bookmark("Chapter 2: Spells", 1, 4)
                .bookmark("Chapter 3: Monsters", 1, 7),
        );

        let report = toc_data(&path, false, None).unwrap();
        let titles: Vec<(&str, u32)> = report
            .entries
            .iter()
            .map(|e| (e.title.as_str(), e.level))
            .collect();
        assert_eq!(
            titles,
            vec![
                ("Chapter 1: Characters", 1),
                ("Races", 2),
                ("Chapter 2: Spells", 1),
                ("Chapter 3: Monsters", 1),
            ]
        );

        assert_eq!(report.chapter_level, 1);
        let ranges: Vec<(u32, u32, &str)> = report
            .chapters
            .iter()
            .map(|f| (f.chapter.start_page, f.chapter.end_page, f.file_name.as_str()))
            .collect();
        assert_eq!(
            ranges,
            vec![
                (1, 3, "01_chapter_1_characters.pdf"),
                (4, 6, "02_chapter_2_spells.pdf"),
                (7, 9, "03_chapter_3_monsters.pdf"),
            ]
        );

        let nested = toc_data(&path, false, Some(2)).unwrap();
        assert_eq!(nested.chapter_level, 2);
        assert_eq!(nested.chapters.len(), 1);
        assert_eq!(nested.chapters[0].chapter.end_page, 9);

        assert!(toc_data(&path, false, Some(5)).unwrap().chapters.is_empty());
    }

    #[test]
    fn test_toc_data_without_outline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "flat.pdf", SampleDocument::new().plain_pages(3));

        let report = toc_data(&path, false, None).unwrap();
        assert_eq!(report.outline.total_entries, 0);
        assert!(report.chapters.is_empty());
        assert_eq!(report.outline.assessment.verdict, Verdict::Unsuitable);
        assert!(report.stats.is_none());
    }

    #[test]
    fn test_toc_data_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 not really").unwrap();
        assert!(toc_data(&path, false, None).is_err());
    }
}
