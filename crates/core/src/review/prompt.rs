use crate::headings::LevelSummary;

use super::types::ValidationRequest;

const VALIDATION_SHAPE: &str = r#"{
  "status": "VALID" | "INVALID" | "TRY_LEVEL",
  "confidence": <number 0.0-1.0>,
  "reason": "<explanation>",
  "suggested_level": <integer 1-15, only with TRY_LEVEL>,
  "extraction_feasible": <true|false>,
  "detected_patterns": ["<pattern>", ...],
  "sample_headings_analysis": "<what the sample headings represent>"
}"#;

const STRATEGY_SHAPE: &str = r#"{
  "primary_strategy": {
    "approach": "font_based" | "pattern_based" | "hybrid" | "manual_assisted",
    "target_level": <integer 1-15>,
    "section_naming": "preserve_original" | "normalize_titles" | "add_prefixes" | "custom_pattern",
    "grouping_strategy": "individual" | "alphabetical_batches" | "thematic_groups" | "page_ranges",
    "confidence": <number 0.0-1.0>
  },
  "potential_challenges": [
    {"challenge": "<text>", "severity": "low" | "medium" | "high", "mitigation": "<text>"}
  ],
  "expected_output": {
    "section_count": <integer>,
    "output_format": "individual_pdfs" | "json_index" | "csv_listing" | "structured_directory",
    "quality_estimate": "high" | "medium" | "low"
  }
}"#;

fn context_or_default(context: &str) -> &str {
    let trimmed = context.trim();
    if trimmed.is_empty() {
        "general document analysis"
    } else {
        trimmed
    }
}

/// Ask whether the headings found at one level are real section boundaries.
pub fn build_validation_prompt(request: &ValidationRequest) -> String {
    let data = serde_json::to_string_pretty(request).unwrap_or_default();
    let context = context_or_default(&request.context);

    format!(
        "Analyze this PDF document structure to validate if the extracted headings \
represent meaningful content sections.\n\n\
Context: {context}\n\
Document analysis:\n{data}\n\n\
Validation criteria:\n\
1. Do the sample headings represent logical document sections?\n\
2. Are they consistent in formatting and purpose?\n\
3. Would extraction at this level produce meaningful, usable content?\n\
4. Is there a better level that should be tried instead?\n\n\
Reply with a single JSON object and nothing else:\n{shape}",
        shape = VALIDATION_SHAPE,
    )
}

/// Ask for an extraction plan once a level has been accepted.
pub fn build_strategy_prompt(request: &ValidationRequest, levels: &[LevelSummary]) -> String {
    let data = serde_json::to_string_pretty(request).unwrap_or_default();
    let context = context_or_default(&request.context);
    let level_lines: Vec<String> = levels
        .iter()
        .map(|l| {
            format!(
                "- Level {}: {:.1}pt, {} headings, avg score {:.1}",
                l.level, l.font_size, l.count, l.avg_score
            )
        })
        .collect();

    format!(
        "Provide an extraction strategy for this validated PDF structure.\n\n\
Document: {}\n\
Validated level: {}\n\
Context: {context}\n\
Level details: font size {:.1}pt, {} headings, avg score {:.1}\n\n\
All detected levels:\n{}\n\n\
Level data:\n{data}\n\n\
Cover the primary approach, likely challenges with mitigations, and the \
expected output. Keep the advice practical for this context.\n\n\
Reply with a single JSON object and nothing else:\n{shape}",
        request.document,
        request.level,
        request.fonts.font_size,
        request.heading_count,
        request.avg_score,
        level_lines.join("\n"),
        shape = STRATEGY_SHAPE,
    )
}
