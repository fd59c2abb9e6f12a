use std::fmt;

use serde::{Deserialize, Serialize};

/// Model verdict on one heading level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    TryLevel,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationStatus::Valid => "VALID",
            ValidationStatus::Invalid => "INVALID",
            ValidationStatus::TryLevel => "TRY_LEVEL",
        };
        write!(f, "{}", s)
    }
}

/// A heading sent to the model as evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleHeading {
    pub text: String,
    pub page: u32,
    pub score: f32,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSummary {
    /// Font size of the level under review.
    pub font_size: f32,
    pub total_fonts: usize,
    pub size_range: (f32, f32),
    pub median_size: f32,
}

/// Everything the model sees about one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub document: String,
    pub total_pages: usize,
    pub level: u32,
    pub fonts: FontSummary,
    pub heading_count: usize,
    pub avg_score: f32,
    pub samples: Vec<SampleHeading>,
    /// Free text from `--context`, never serialized into the data block.
    #[serde(skip)]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    /// 0.0 to 1.0.
    pub confidence: f64,
    pub reason: String,
    /// Set with `TRY_LEVEL`, 1 to 15.
    #[serde(default)]
    pub suggested_level: Option<u32>,
    pub extraction_feasible: bool,
    #[serde(default)]
    pub detected_patterns: Vec<String>,
    #[serde(default)]
    pub sample_headings_analysis: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    FontBased,
    PatternBased,
    Hybrid,
    ManualAssisted,
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Approach::FontBased => "font based",
            Approach::PatternBased => "pattern based",
            Approach::Hybrid => "hybrid",
            Approach::ManualAssisted => "manual assisted",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryStrategy {
    pub approach: Approach,
    pub target_level: u32,
    pub section_naming: String,
    pub grouping_strategy: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge: String,
    pub severity: Severity,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedOutput {
    pub section_count: u32,
    pub output_format: String,
    pub quality_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStrategy {
    pub primary_strategy: PrimaryStrategy,
    #[serde(default)]
    pub potential_challenges: Vec<Challenge>,
    pub expected_output: ExpectedOutput,
}

/// One level tried during `--auto-level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAttempt {
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoLevelOutcome {
    pub optimal_level: Option<u32>,
    pub levels_tested: Vec<LevelAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ExtractionStrategy>,
}
