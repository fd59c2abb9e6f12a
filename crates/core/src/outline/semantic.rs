use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const CHAPTER_INDICATORS: &[&str] = &["chapter", "part", "section", "book", "volume"];

const STRUCTURAL_WORDS: &[&str] = &[
    "overview",
    "introduction",
    "summary",
    "conclusion",
    "description",
];

/// Subject areas recognized from outline titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Financial,
    Legal,
    Reference,
    Governance,
    Operational,
    Technical,
    Gaming,
    Academic,
    Narrative,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 9] = [
        ContentCategory::Financial,
        ContentCategory::Legal,
        ContentCategory::Reference,
        ContentCategory::Governance,
        ContentCategory::Operational,
        ContentCategory::Technical,
        ContentCategory::Gaming,
        ContentCategory::Academic,
        ContentCategory::Narrative,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ContentCategory::Financial => &[
                "financial",
                "revenue",
                "income",
                "earnings",
                "balance",
                "cash",
                "investment",
                "performance",
            ],
            ContentCategory::Legal => &[
                "legal",
                "compliance",
                "regulation",
                "law",
                "policy",
                "procedure",
                "risk",
                "liability",
            ],
            ContentCategory::Reference => &[
                "appendix", "index", "glossary", "reference", "table", "list", "notes", "exhibit",
            ],
            ContentCategory::Governance => &[
                "board",
                "director",
                "management",
                "executive",
                "governance",
                "committee",
                "audit",
            ],
            ContentCategory::Operational => &[
                "business",
                "operations",
                "segment",
                "division",
                "subsidiary",
                "market",
                "customer",
            ],
            ContentCategory::Technical => &[
                "system",
                "technology",
                "process",
                "method",
                "implementation",
                "development",
            ],
            ContentCategory::Gaming => &[
                "class",
                "spell",
                "monster",
                "creature",
                "item",
                "equipment",
                "character",
                "feat",
            ],
            ContentCategory::Academic => &[
                "research",
                "study",
                "analysis",
                "methodology",
                "results",
                "conclusion",
                "literature",
            ],
            ContentCategory::Narrative => {
                &["story", "lore", "background", "history", "setting", "biography"]
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentCategory::Financial => "Financial",
            ContentCategory::Legal => "Legal",
            ContentCategory::Reference => "Reference",
            ContentCategory::Governance => "Governance",
            ContentCategory::Operational => "Operational",
            ContentCategory::Technical => "Technical",
            ContentCategory::Gaming => "Gaming",
            ContentCategory::Academic => "Academic",
            ContentCategory::Narrative => "Narrative",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Categories whose keywords occur in the title, each reported once.
pub fn categories_in(title: &str) -> Vec<ContentCategory> {
    let lower = title.to_lowercase();
    ContentCategory::ALL
        .into_iter()
        .filter(|cat| cat.keywords().iter().any(|word| lower.contains(word)))
        .collect()
}

fn digit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d").unwrap())
}

pub fn has_digit(title: &str) -> bool {
    digit().is_match(title)
}

/// Strict title case: every cased run starts upper-case and continues lower-case.
pub fn is_title_case(title: &str) -> bool {
    let mut previous_cased = false;
    let mut any_cased = false;

    for c in title.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            any_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            any_cased = true;
        } else {
            previous_cased = false;
        }
    }

    any_cased
}

/// How meaningful an outline title looks as a unit of extraction.
///
/// Keyword matches are substring matches on the lower-cased title.
pub fn semantic_score(title: &str) -> u32 {
    let lower = title.to_lowercase();
    let mut score = 0;

    score += 10 * CHAPTER_INDICATORS
        .iter()
        .filter(|word| lower.contains(*word))
        .count() as u32;
    score += 7 * categories_in(title).len() as u32;
    score += 5 * STRUCTURAL_WORDS
        .iter()
        .filter(|word| lower.contains(*word))
        .count() as u32;

    score += match title.split_whitespace().count() {
        2..=6 => 3,
        n if n > 6 => 1,
        _ => 0,
    };

    if is_title_case(title) {
        score += 2;
    }
    if has_digit(title) {
        score += 1;
    }

    score
}
