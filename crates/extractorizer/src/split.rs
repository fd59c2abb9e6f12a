use std::path::{Path, PathBuf};

use colored::Colorize;
use extractorizer_core::chapters::{
    chapter_level, name_chapters, plan_chapters, plan_warnings, select_chapters, ChapterFile,
};
use extractorizer_core::outline::{analyze_levels, assess_outline, breakdown, rank_levels};
use extractorizer_core::outline::{OutlineAssessment, Verdict};

use crate::load;
use crate::prelude::{eprintln, println, *};

const DEFAULT_OUTPUT_DIR: &str = "extracted_chapters";

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct SplitOptions {
    /// Path to the PDF file
    pub path: PathBuf,

    /// Outline level to split on (1 = top-level entries) [default: the best-ranked level]
    #[arg(long)]
    pub level: Option<u32>,

    /// Chapters to extract, by 1-based ordinal (e.g. "1,3,5-7")
    #[arg(long)]
    pub select: Option<String>,

    /// Output directory [default: extracted_chapters/ next to the input]
    #[arg(long, env = "EXTRACTORIZER_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Prefix for the output file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Split even when the outline is judged unusable
    #[arg(long)]
    pub force: bool,

    /// Only report whether the outline is usable
    #[arg(long)]
    pub validate: bool,

    /// Print the chapter plan without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    Validate,
    DryRun,
    Write,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SplitOutcome {
    pub document: String,
    pub mode: SplitMode,
    pub assessment: OutlineAssessment,
    pub level: u32,
    pub output_dir: PathBuf,
    pub chapters: Vec<ChapterFile>,
    pub warnings: Vec<String>,
}

fn output_dir(options: &SplitOptions) -> PathBuf {
    match &options.output_dir {
        Some(dir) => dir.clone(),
        None => options
            .path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_OUTPUT_DIR),
    }
}

/// Plan the split and, unless validating or dry-running, write the files.
pub fn split_data(options: &SplitOptions) -> Result<SplitOutcome> {
    let doc = load::open(&options.path)?;
    let page_count = doc.page_count();
    let entries = load::outline_entries(&doc);

    let ranked = rank_levels(&analyze_levels(&entries, page_count));
    let assessment = assess_outline(&entries, page_count, &ranked);
    let level = chapter_level(options.level, &ranked);
    log::debug!("splitting on level {}", level);

    let mode = if options.validate {
        SplitMode::Validate
    } else if options.dry_run {
        SplitMode::DryRun
    } else {
        SplitMode::Write
    };
    let mut outcome = SplitOutcome {
        document: load::document_name(&options.path),
        mode,
        assessment,
        level,
        output_dir: output_dir(options),
        chapters: Vec::new(),
        warnings: Vec::new(),
    };

    if mode == SplitMode::Validate {
        return Ok(outcome);
    }

    if !outcome.assessment.is_usable() {
        if !options.force {
            return Err(Error::UnsuitableOutline(breakdown(&outcome.assessment)).into());
        }
        log::warn!("splitting on an unusable outline because --force was given");
    }

    let plan = plan_chapters(&entries, level, page_count)?;
    let selected = select_chapters(plan, options.select.as_deref())?;
    outcome.warnings = plan_warnings(&entries, &selected, page_count);
    outcome.chapters = name_chapters(selected, options.prefix.as_deref());

    if mode == SplitMode::DryRun {
        return Ok(outcome);
    }

    std::fs::create_dir_all(&outcome.output_dir).wrap_err_with(|| {
        f!(
            "Failed to create output directory '{}'",
            outcome.output_dir.display()
        )
    })?;
    for file in &outcome.chapters {
        let target = outcome.output_dir.join(&file.file_name);
        doc.write_page_range(file.chapter.start_page, file.chapter.end_page, &target)
            .wrap_err_with(|| f!("Failed to write '{}'", target.display()))?;
        log::debug!(
            "wrote {} (pages {}-{})",
            target.display(),
            file.chapter.start_page,
            file.chapter.end_page
        );
    }

    Ok(outcome)
}

pub async fn run(options: SplitOptions, _global: crate::Global) -> Result<()> {
    let outcome = split_data(&options)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("\n{}", rule().bright_cyan());
    println!(
        "{}",
        f!("Chapter Split: {}", outcome.document).bold().bright_white()
    );
    println!("{}", rule().bright_cyan());

    let verdict = outcome.assessment.verdict.to_string();
    let verdict = match outcome.assessment.verdict {
        Verdict::Suitable => verdict.green().bold(),
        Verdict::Marginal => verdict.yellow().bold(),
        Verdict::Unsuitable => verdict.red().bold(),
    };
    println!(
        "Outline: {} (score {}/100)",
        verdict, outcome.assessment.score
    );
    println!("Split Level: {}", outcome.level);

    if outcome.mode == SplitMode::Validate {
        for line in breakdown(&outcome.assessment).lines() {
            println!("   {}", line);
        }
        return Ok(());
    }

    for warning in &outcome.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "#".bold().cyan(),
        "Title".bold().cyan(),
        "Pages".bold().cyan(),
        "File".bold().cyan()
    ]);
    for file in &outcome.chapters {
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

    match outcome.mode {
        SplitMode::DryRun => println!(
            "\n{} {} files would be written to {}",
            "Dry run:".yellow().bold(),
            outcome.chapters.len(),
            outcome.output_dir.display()
        ),
        _ => println!(
            "\n{}",
            f!(
                "Wrote {} files to {}",
                outcome.chapters.len(),
                outcome.output_dir.display()
            )
            .green()
            .bold()
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf::fixture::SampleDocument;

    fn options(path: PathBuf, out: &Path) -> SplitOptions {
        SplitOptions {
            path,
            level: None,
            select: None,
            output_dir: Some(out.to_path_buf()),
            prefix: None,
            force: false,
            validate: false,
            dry_run: false,
            json: false,
        }
    }

    fn three_chapters(dir: &Path) -> PathBuf {
        let path = dir.join("tome.pdf");
        let bytes = SampleDocument::new()
            .plain_pages(9)
            .bookmark("Chapter 1: Origins", 1, 1)
            .bookmark("Races", 2, 2)
            .bookmark("Chapter 2: Magic & Spells", 1, 4)
            .bookmark("Chapter 3: Monsters", 1, 7)
            .build()
            .unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn written(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_splits_three_chapters_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let outcome = split_data(&options(three_chapters(dir.path()), &out)).unwrap();

        assert_eq!(outcome.mode, SplitMode::Write);
        assert_eq!(
            written(&out),
            vec![
                "01_chapter_1_origins.pdf",
                "02_chapter_2_magic_spells.pdf",
                "03_chapter_3_monsters.pdf",
            ]
        );

        let second = pdf::Document::open(&out.join("02_chapter_2_magic_spells.pdf")).unwrap();
        assert_eq!(second.page_count(), 3);
    }

    #[test]
    fn test_selection_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut opts = options(three_chapters(dir.path()), &out);
        opts.select = Some("3,1".to_string());
        opts.prefix = Some("tome".to_string());

        split_data(&opts).unwrap();
        assert_eq!(
            written(&out),
            vec!["tome_01_chapter_1_origins.pdf", "tome_02_chapter_3_monsters.pdf"]
        );
    }

    #[test]
    fn test_selection_with_gaps_renumbers_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bestiary.pdf");
        let bytes = SampleDocument::new()
            .plain_pages(12)
            .bookmark("Dragons", 1, 1)
            .bookmark("Giants", 1, 3)
            .bookmark("Goblins", 1, 5)
            .bookmark("Liches", 1, 8)
            .bookmark("Oozes", 1, 11)
            .build()
            .unwrap();
        std::fs::write(&path, bytes).unwrap();
        let out = dir.path().join("out");
        let mut opts = options(path, &out);
        opts.select = Some("5, 2,4".to_string());
        opts.prefix = Some("mm".to_string());

        let outcome = split_data(&opts).unwrap();
        let ordinals: Vec<usize> = outcome.chapters.iter().map(|f| f.chapter.ordinal).collect();
        assert_eq!(ordinals, vec![2, 4, 5]);
        assert_eq!(
            written(&out),
            vec!["mm_01_giants.pdf", "mm_02_liches.pdf", "mm_03_oozes.pdf"]
        );

        let liches = pdf::Document::open(&out.join("mm_02_liches.pdf")).unwrap();
        assert_eq!(liches.page_count(), 3);
    }

    #[test]
    fn test_default_level_is_the_best_ranked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compendium.pdf");
        let bytes = SampleDocument::new()
            .plain_pages(10)
            .bookmark("Volume One", 1, 1)
            .bookmark("Chapter 1: Spells", 2, 2)
            .bookmark("Chapter 2: Monsters", 2, 5)
            .bookmark("Chapter 3: Items", 2, 8)
            .build()
            .unwrap();
        std::fs::write(&path, bytes).unwrap();
        let out = dir.path().join("out");
        let mut opts = options(path, &out);
        opts.dry_run = true;

        let outcome = split_data(&opts).unwrap();
        assert_eq!(outcome.level, 2);
        let names: Vec<&str> = outcome.chapters.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "01_chapter_1_spells.pdf",
                "02_chapter_2_monsters.pdf",
                "03_chapter_3_items.pdf",
            ]
        );

        opts.level = Some(1);
        let explicit = split_data(&opts).unwrap();
        assert_eq!(explicit.level, 1);
        assert_eq!(explicit.chapters.len(), 1);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut opts = options(three_chapters(dir.path()), &out);
        opts.dry_run = true;
        opts.level = Some(2);

        let outcome = split_data(&opts).unwrap();
        assert_eq!(outcome.mode, SplitMode::DryRun);
        assert_eq!(outcome.chapters.len(), 1);
        assert_eq!(outcome.chapters[0].chapter.end_page, 9);
        assert!(!out.exists());
    }

    #[test]
    fn test_refuses_unusable_outline_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jumbled.pdf");
        let bytes = SampleDocument::new()
            .plain_pages(10)
            .bookmark("Later", 1, 5)
            .bookmark("Earlier", 1, 2)
            .bookmark("Last", 1, 8)
            .build()
            .unwrap();
        std::fs::write(&path, bytes).unwrap();
        let out = dir.path().join("out");

        let err = split_data(&options(path.clone(), &out)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsuitableOutline(_))
        ));
        assert!(!out.exists());

        let mut forced = options(path, &out);
        forced.force = true;
        split_data(&forced).unwrap();
        assert_eq!(written(&out).len(), 3);
    }

    #[test]
    fn test_validate_only_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.pdf");
        std::fs::write(&path, SampleDocument::new().plain_pages(2).build().unwrap()).unwrap();
        let out = dir.path().join("out");
        let mut opts = options(path, &out);
        opts.validate = true;

        let outcome = split_data(&opts).unwrap();
        assert_eq!(outcome.mode, SplitMode::Validate);
        assert_eq!(outcome.assessment.verdict, Verdict::Unsuitable);
        assert!(outcome.chapters.is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn test_default_output_dir_is_next_to_input() {
        let mut opts = options(PathBuf::from("/books/tome.pdf"), Path::new("/unused"));
        opts.output_dir = None;
        assert_eq!(output_dir(&opts), PathBuf::from("/books/extracted_chapters"));
    }
}
