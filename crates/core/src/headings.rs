//! Font-statistics heading detection.
//!
//! Pages are sampled, a character-weighted font-size histogram is built, and
//! every line set larger than the body text is scored as a heading
//! candidate. Scores are only comparable within one document: they are
//! normalized against the [`DocumentProfile`] built from the same samples.
//!
//! # Pipeline
//!
//! ```text
//! sample_pages -> PageSample[] -> build_profile -> score_candidates -> filter_candidates
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Width of a font-size histogram bucket, in points.
pub const FONT_SIZE_BUCKET: f32 = 0.5;

/// Body size assumed when no text could be sampled.
pub const FALLBACK_BASELINE: f32 = 12.0;

pub const DEFAULT_SAMPLE_RATIO: f64 = 0.3;

pub const DEFAULT_MIN_SCORE: f32 = 3.0;

/// Documents with at most this many pages are read in full.
const MIN_SAMPLED_PAGES: usize = 10;

/// A neighbouring line further away than this many body heights isolates a line.
const ISOLATION_FACTOR: f32 = 2.0;

const SIZE_WEIGHT: f32 = 20.0;
const SIZE_SCORE_CAP: f32 = 16.0;
const SHORT_LINE_WORDS: usize = 8;
const TOP_FONTS: usize = 5;

const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One line of text as it appears on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    /// Vertical position in PDF user space. Larger values are higher on the page.
    pub y: f32,
}

/// The text runs of one sampled page, top of the page first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSample {
    /// 1-based page number.
    pub page: u32,
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeBucket {
    pub size: f32,
    pub chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontUsage {
    pub name: String,
    pub chars: usize,
}

/// Font statistics of the sampled pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProfile {
    pub total_pages: usize,
    pub pages_sampled: usize,
    pub pages_with_text: usize,
    /// Modal font size by character count: the body text size.
    pub baseline: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub mean_size: f32,
    pub median_size: f32,
    /// Character counts per bucket, largest size first.
    pub histogram: Vec<SizeBucket>,
    pub font_count: usize,
    pub primary_fonts: Vec<FontUsage>,
}

impl DocumentProfile {
    pub fn size_range(&self) -> f32 {
        self.max_size - self.min_size
    }
}

/// The signals that contributed to a candidate's score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingIndicators {
    pub is_bold: bool,
    pub is_numbered: bool,
    pub is_upper_case: bool,
    pub is_title_case: bool,
    pub has_colon: bool,
    pub is_short: bool,
    pub isolated_above: bool,
    pub isolated_below: bool,
}

impl HeadingIndicators {
    /// Short labels for the indicators that are set, in a fixed order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.is_bold {
            labels.push("Bold");
        }
        if self.is_numbered {
            labels.push("Numbered");
        }
        if self.is_upper_case {
            labels.push("Uppercase");
        }
        if self.is_title_case {
            labels.push("TitleCase");
        }
        if self.has_colon {
            labels.push("Colon");
        }
        if self.isolated_above && self.isolated_below {
            labels.push("Isolated");
        }
        labels
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    pub text: String,
    /// 1 is the largest heading size found in the document.
    pub level: u32,
    pub score: f32,
    pub page: u32,
    pub font_size: f32,
    pub indicators: HeadingIndicators,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level: u32,
    pub font_size: f32,
    pub count: usize,
    pub avg_score: f32,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Pick the 1-based page numbers to analyze.
///
/// Short documents are read in full. Longer ones are sampled at evenly spaced
/// pages: at least ten, or `ratio` of the document when that is more.
pub fn sample_pages(page_count: usize, ratio: f64) -> Vec<u32> {
    if page_count <= MIN_SAMPLED_PAGES {
        return (1..=page_count as u32).collect();
    }

    let wanted = ((page_count as f64 * ratio).floor() as usize).max(MIN_SAMPLED_PAGES);
    let step = (page_count / wanted).max(1);

    (0..page_count).step_by(step).map(|i| i as u32 + 1).collect()
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

fn bucket_key(size: f32) -> u32 {
    (size / FONT_SIZE_BUCKET).round().max(0.0) as u32
}

fn key_size(key: u32) -> f32 {
    key as f32 * FONT_SIZE_BUCKET
}

/// Build the document profile from the sampled pages.
///
/// The baseline is the bucket holding the most characters. Ties go to the
/// smaller size. Pages without text are counted as sampled but contribute
/// nothing.
pub fn build_profile(samples: &[PageSample], total_pages: usize) -> DocumentProfile {
    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    let mut fonts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut sizes: Vec<f32> = Vec::new();
    let mut pages_with_text = 0;

    for sample in samples {
        let mut has_text = false;
        for run in &sample.runs {
            let chars = run.text.trim().chars().count();
            if chars == 0 || run.font_size <= 0.0 {
                continue;
            }
            has_text = true;
            *histogram.entry(bucket_key(run.font_size)).or_default() += chars;
            *fonts.entry(run.font_name.as_str()).or_default() += chars;
            sizes.push(run.font_size);
        }

        if has_text {
            pages_with_text += 1;
        } else {
            log::debug!("page {} has no text runs, skipping", sample.page);
        }
    }

    let baseline = histogram
        .iter()
        .fold(None, |best: Option<(u32, usize)>, (&key, &chars)| match best {
            Some((_, top)) if top >= chars => best,
            _ => Some((key, chars)),
        })
        .map(|(key, _)| key_size(key))
        .unwrap_or(FALLBACK_BASELINE);

    sizes.sort_by(|a, b| a.total_cmp(b));
    let (min_size, max_size) = match (sizes.first(), sizes.last()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => (0.0, 0.0),
    };

    let mut primary_fonts: Vec<FontUsage> = fonts
        .iter()
        .map(|(name, chars)| FontUsage {
            name: name.to_string(),
            chars: *chars,
        })
        .collect();
    primary_fonts.sort_by(|a, b| b.chars.cmp(&a.chars).then_with(|| a.name.cmp(&b.name)));
    primary_fonts.truncate(TOP_FONTS);

    DocumentProfile {
        total_pages,
        pages_sampled: samples.len(),
        pages_with_text,
        baseline,
        min_size,
        max_size,
        mean_size: mean(&sizes),
        median_size: median(&sizes),
        histogram: histogram
            .iter()
            .rev()
            .map(|(&key, &chars)| SizeBucket {
                size: key_size(key),
                chars,
            })
            .collect(),
        font_count: fonts.len(),
        primary_fonts,
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Median of an already sorted slice.
fn median(sorted: &[f32]) -> f32 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn numbered_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?i:chapter|section|part|appendix|article|book)\s+(?:\d+|[IVXLCDM]+)\b|\d+(?:\.\d+)*[.):]?\s|(?:[IVXLCDM]+|[ivxlcdm]+)[.)]\s|[A-Za-z][.)]\s)",
        )
        .unwrap()
    })
}

fn is_upper_case(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(|c| !c.is_lowercase())
}

fn is_title_case(text: &str) -> bool {
    let mut words = 0;
    for (idx, word) in text.split_whitespace().enumerate() {
        let Some(first) = word.chars().find(|c| c.is_alphanumeric()) else {
            continue;
        };
        if !first.is_alphabetic() {
            continue;
        }
        words += 1;
        let minor = idx > 0 && MINOR_WORDS.contains(&word.to_lowercase().as_str());
        if !minor && !first.is_uppercase() {
            return false;
        }
    }
    words > 0
}

fn indicators_for(
    text: &str,
    is_bold: bool,
    isolated_above: bool,
    isolated_below: bool,
) -> HeadingIndicators {
    let is_short = text.split_whitespace().count() <= SHORT_LINE_WORDS;
    let is_upper_case = is_short && is_upper_case(text);

    HeadingIndicators {
        is_bold,
        is_numbered: numbered_prefix().is_match(text),
        is_upper_case,
        is_title_case: is_short && !is_upper_case && is_title_case(text),
        has_colon: text.ends_with(':'),
        is_short,
        isolated_above,
        isolated_below,
    }
}

fn size_score(font_size: f32, baseline: f32) -> f32 {
    if baseline <= 0.0 {
        return 0.0;
    }
    ((font_size - baseline) / baseline * SIZE_WEIGHT).clamp(0.0, SIZE_SCORE_CAP)
}

fn score_line(text: &str, font_size: f32, baseline: f32, ind: &HeadingIndicators) -> f32 {
    let words = text.split_whitespace().count();
    let mut score = size_score(font_size, baseline);

    if ind.is_bold {
        score += 8.0;
    }

    score += match words {
        0..=3 => 6.0,
        4..=8 => 3.0,
        9..=15 => 0.0,
        _ => -2.0,
    };
    if !ind.is_short && text.ends_with('.') {
        score -= 3.0;
    }

    if ind.is_numbered {
        score += 7.0;
    }
    if ind.is_upper_case {
        score += 9.0;
    }
    if ind.is_title_case {
        score += 5.0;
    }
    if ind.has_colon {
        score += 4.0;
    }
    if ind.isolated_above {
        score += 2.0;
    }
    if ind.isolated_below {
        score += 2.0;
    }

    (score * 10.0).round() / 10.0
}

/// Score every line set larger than the body text.
///
/// Levels are assigned from the distinct bucketed sizes of the candidates,
/// largest first, with no upper bound on the number of levels. The result
/// keeps document order.
pub fn score_candidates(samples: &[PageSample], profile: &DocumentProfile) -> Vec<HeadingCandidate> {
    let baseline_key = bucket_key(profile.baseline);
    let gap_threshold = profile.baseline * ISOLATION_FACTOR;
    let mut scored: Vec<(u32, HeadingCandidate)> = Vec::new();

    for sample in samples {
        let runs: Vec<&TextRun> = sample
            .runs
            .iter()
            .filter(|r| !r.text.trim().is_empty())
            .collect();

        for (idx, run) in runs.iter().enumerate() {
            let key = bucket_key(run.font_size);
            if key <= baseline_key {
                continue;
            }

            let above = idx.checked_sub(1).and_then(|i| runs.get(i));
            let below = runs.get(idx + 1);
            let isolated_above = above.map_or(true, |prev| (prev.y - run.y).abs() > gap_threshold);
            let isolated_below = below.map_or(true, |next| (run.y - next.y).abs() > gap_threshold);

            let text = run.text.split_whitespace().collect::<Vec<_>>().join(" ");
            let indicators = indicators_for(&text, run.is_bold, isolated_above, isolated_below);
            let score = score_line(&text, run.font_size, profile.baseline, &indicators);

            scored.push((
                key,
                HeadingCandidate {
                    text,
                    level: 0,
                    score,
                    page: sample.page,
                    font_size: key_size(key),
                    indicators,
                },
            ));
        }
    }

    let mut keys: Vec<u32> = scored.iter().map(|(key, _)| *key).collect();
    keys.sort_unstable_by(|a, b| b.cmp(a));
    keys.dedup();

    scored
        .into_iter()
        .map(|(key, mut candidate)| {
            candidate.level = keys
                .iter()
                .position(|k| *k == key)
                .map_or(0, |pos| pos as u32 + 1);
            candidate
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Keep candidates scoring at least `min_score`, optionally at one level only.
pub fn filter_candidates(
    candidates: &[HeadingCandidate],
    level: Option<u32>,
    min_score: f32,
) -> Vec<HeadingCandidate> {
    candidates
        .iter()
        .filter(|c| c.score >= min_score)
        .filter(|c| level.map_or(true, |lvl| c.level == lvl))
        .cloned()
        .collect()
}

/// Candidates ordered by descending score. Equal scores keep document order.
pub fn rank_by_score(candidates: &[HeadingCandidate]) -> Vec<&HeadingCandidate> {
    let mut ranked: Vec<&HeadingCandidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

pub fn summarize_levels(candidates: &[HeadingCandidate]) -> Vec<LevelSummary> {
    let mut levels: BTreeMap<u32, (f32, usize, f32)> = BTreeMap::new();
    for c in candidates {
        let entry = levels.entry(c.level).or_insert((c.font_size, 0, 0.0));
        entry.1 += 1;
        entry.2 += c.score;
    }

    levels
        .into_iter()
        .map(|(level, (font_size, count, total))| LevelSummary {
            level,
            font_size,
            count,
            avg_score: ((total / count as f32) * 10.0).round() / 10.0,
        })
        .collect()
}

pub fn available_levels(summaries: &[LevelSummary]) -> Vec<u32> {
    summaries.iter().map(|s| s.level).collect()
}

/// The level with the highest average score. Ties go to the larger headings.
pub fn best_level(summaries: &[LevelSummary]) -> Option<u32> {
    summaries
        .iter()
        .fold(None, |best: Option<&LevelSummary>, s| match best {
            Some(b) if b.avg_score >= s.avg_score => Some(b),
            _ => Some(s),
        })
        .map(|s| s.level)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "the quick brown fox jumps over the lazy dog near the river bank today";

    fn run(text: &str, size: f32, y: f32) -> TextRun {
        TextRun {
            text: text.to_string(),
            font_size: size,
            font_name: "Times-Roman".to_string(),
            is_bold: false,
            is_italic: false,
            y,
        }
    }

    fn bold_run(text: &str, size: f32, y: f32) -> TextRun {
        TextRun {
            font_name: "Times-Bold".to_string(),
            is_bold: true,
            ..run(text, size, y)
        }
    }

    fn body_lines(from_y: f32, count: usize) -> Vec<TextRun> {
        (0..count)
            .map(|i| run(BODY, 12.0, from_y - i as f32 * 14.0))
            .collect()
    }

    fn chapter_page() -> PageSample {
        let mut runs = vec![bold_run("Chapter One", 24.0, 750.0)];
        runs.extend(body_lines(700.0, 8));
        runs.push(run("Section Overview", 16.0, 560.0));
        runs.extend(body_lines(530.0, 8));
        PageSample { page: 1, runs }
    }

    fn candidate(text: &str, level: u32, score: f32) -> HeadingCandidate {
        HeadingCandidate {
            text: text.to_string(),
            level,
            score,
            page: 1,
            font_size: 14.0,
            indicators: HeadingIndicators::default(),
        }
    }

    // -- sample_pages ---------------------------------------------------------

    #[test]
    fn test_sample_pages_short_document_reads_everything() {
        assert_eq!(sample_pages(4, 0.3), vec![1, 2, 3, 4]);
        assert!(sample_pages(0, 0.3).is_empty());
    }

    #[test]
    fn test_sample_pages_long_document_is_evenly_spaced() {
        let pages = sample_pages(100, 0.3);
        assert_eq!(pages[0], 1);
        assert_eq!(pages[1], 4);
        assert_eq!(pages.len(), 34);
    }

    #[test]
    fn test_sample_pages_never_below_ten() {
        let pages = sample_pages(25, 0.1);
        assert_eq!(pages.len(), 13);
        assert!(pages.iter().all(|p| (1..=25).contains(p)));
    }

    // -- build_profile --------------------------------------------------------

    #[test]
    fn test_profile_baseline_is_modal_size() {
        let profile = build_profile(&[chapter_page()], 1);
        assert_eq!(profile.baseline, 12.0);
        assert_eq!(profile.max_size, 24.0);
        assert_eq!(profile.min_size, 12.0);
        assert_eq!(profile.pages_with_text, 1);
        assert_eq!(profile.histogram[0].size, 24.0);
    }

    #[test]
    fn test_profile_baseline_ties_go_to_smaller_size() {
        let sample = PageSample {
            page: 1,
            runs: vec![run("abcd", 14.0, 700.0), run("wxyz", 10.0, 680.0)],
        };
        assert_eq!(build_profile(&[sample], 1).baseline, 10.0);
    }

    #[test]
    fn test_profile_empty_sample_falls_back() {
        let sample = PageSample {
            page: 3,
            runs: vec![],
        };
        let profile = build_profile(&[sample], 5);
        assert_eq!(profile.baseline, FALLBACK_BASELINE);
        assert_eq!(profile.pages_sampled, 1);
        assert_eq!(profile.pages_with_text, 0);
        assert_eq!(profile.font_count, 0);
    }

    #[test]
    fn test_profile_primary_fonts_by_characters() {
        let profile = build_profile(&[chapter_page()], 1);
        assert_eq!(profile.font_count, 2);
        assert_eq!(profile.primary_fonts[0].name, "Times-Roman");
    }

    // -- score_candidates -----------------------------------------------------

    #[test]
    fn test_large_bold_line_outranks_smaller_heading() {
        let samples = vec![chapter_page()];
        let profile = build_profile(&samples, 1);
        let candidates = score_candidates(&samples, &profile);

        assert_eq!(candidates.len(), 2, "body text must not produce candidates");
        let chapter = &candidates[0];
        let section = &candidates[1];
        assert_eq!(chapter.text, "Chapter One");
        assert_eq!(chapter.level, 1);
        assert_eq!(section.level, 2);
        assert!(chapter.score > section.score);
        assert!(chapter.indicators.is_bold);
        assert!(chapter.indicators.isolated_above);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let samples = vec![chapter_page(), chapter_page()];
        let profile = build_profile(&samples, 2);
        let first = score_candidates(&samples, &profile);
        let second = score_candidates(&samples, &build_profile(&samples, 2));
        assert_eq!(first, second);
    }

    #[test]
    fn test_levels_are_not_capped() {
        let mut runs = Vec::new();
        for (i, size) in [30.0, 28.0, 26.0, 24.0, 22.0, 20.0, 18.0, 16.0].iter().enumerate() {
            runs.push(run("Heading", *size, 780.0 - i as f32 * 80.0));
            runs.extend(body_lines(760.0 - i as f32 * 80.0, 4));
        }
        let samples = vec![PageSample { page: 1, runs }];
        let candidates = score_candidates(&samples, &build_profile(&samples, 1));
        let levels = summarize_levels(&candidates);
        assert_eq!(levels.len(), 8);
        assert_eq!(levels.last().map(|l| l.font_size), Some(16.0));
    }

    #[test]
    fn test_numbered_and_uppercase_cues() {
        let ind = indicators_for("1.2 Scope of Work", false, false, false);
        assert!(ind.is_numbered);
        let ind = indicators_for("CHAPTER 4", false, false, false);
        assert!(ind.is_numbered);
        assert!(ind.is_upper_case);
        assert!(!ind.is_title_case);
        let ind = indicators_for("Spells of the Arcane Order", false, false, false);
        assert!(ind.is_title_case);
        assert!(!ind.is_numbered);
    }

    #[test]
    fn test_roman_numerals_must_be_upper_case() {
        for numbered in ["Part IV The Underdark", "Chapter XII", "iv. Components", "IX) Rituals"] {
            assert!(
                indicators_for(numbered, false, false, false).is_numbered,
                "{numbered}"
            );
        }
        for plain in ["Chapter Mid Levels", "Part Civil Law", "Section Mix"] {
            assert!(
                !indicators_for(plain, false, false, false).is_numbered,
                "{plain}"
            );
        }
    }

    #[test]
    fn test_long_sentence_is_penalised() {
        let ind = indicators_for(BODY, false, false, false);
        let long = format!("{BODY} again and again.");
        let sentence = score_line(&long, 14.0, 12.0, &ind);
        let title = score_line("Index", 14.0, 12.0, &indicators_for("Index", false, false, false));
        assert!(title > sentence);
    }

    // -- selection ------------------------------------------------------------

    #[test]
    fn test_filter_by_level_and_min_score() {
        let candidates = vec![
            candidate("Fireball", 4, 12.0),
            candidate("Light", 4, 8.0),
            candidate("Evocation", 3, 20.0),
        ];
        let kept = filter_candidates(&candidates, Some(4), 10.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "Fireball");
    }

    #[test]
    fn test_filter_without_level_keeps_all_levels() {
        let candidates = vec![candidate("A", 1, 5.0), candidate("B", 2, 2.0)];
        assert_eq!(filter_candidates(&candidates, None, 3.0).len(), 1);
    }

    #[test]
    fn test_rank_by_score_keeps_document_order_on_ties() {
        let candidates = vec![
            candidate("first", 1, 5.0),
            candidate("second", 1, 9.0),
            candidate("third", 1, 5.0),
        ];
        let ranked: Vec<&str> = rank_by_score(&candidates)
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(ranked, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_summarize_and_best_level() {
        let candidates = vec![
            candidate("a", 1, 10.0),
            candidate("b", 1, 20.0),
            candidate("c", 2, 15.0),
        ];
        let levels = summarize_levels(&candidates);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].count, 2);
        assert_eq!(levels[0].avg_score, 15.0);
        assert_eq!(available_levels(&levels), vec![1, 2]);
        assert_eq!(best_level(&levels), Some(1));
        assert_eq!(best_level(&[]), None);
    }
}
