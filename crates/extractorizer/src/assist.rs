use extractorizer_core::review::{
    auto_level_order, build_strategy_prompt, build_validation_prompt, build_validation_request,
    parse_strategy, parse_validation, AutoLevelOutcome, ExtractionStrategy, LevelAttempt,
    ValidationRequest, ValidationResult, ValidationStatus, MAX_AUTO_LEVELS,
};
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::ollama;

use crate::analyze::Analysis;
use crate::prelude::*;

const SYSTEM_PREAMBLE: &str = "\
You review heading structure detected in PDF documents by font statistics.
You reply with a single JSON object and nothing else.

Rules:
- No markdown fences. No explanations outside the JSON object.
- Use exactly the field names and value formats given in the request.
- Base every judgement on the sample headings you are shown.";

const MODEL_TEMPERATURE: f64 = 0.1;

#[derive(Debug, Clone, Default, clap::Args, serde::Serialize, serde::Deserialize)]
pub struct AiOptions {
    /// Ask a local language model to validate the detected headings
    #[arg(long)]
    pub ask_ai: bool,

    /// Let the model try levels until one is valid (requires --ask-ai)
    #[arg(long, requires = "ask_ai")]
    pub auto_level: bool,

    /// What the document is, to guide the model (e.g. "D&D spell list")
    #[arg(long)]
    pub context: Option<String>,

    /// Ollama base URL
    #[clap(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Model name used for validation
    #[clap(long, env = "EXTRACTORIZER_MODEL", default_value = "llama3.1")]
    pub model: String,
}

/// Something that answers a prompt with text.
pub trait Reviewer {
    async fn review(&self, prompt: &str) -> Result<String>;
}

pub struct OllamaReviewer {
    client: ollama::Client,
    model: String,
}

impl OllamaReviewer {
    pub fn new(options: &AiOptions) -> Result<Self> {
        use rig::client::Nothing;

        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(&options.ollama_url)
            .build()
            .map_err(|e| eyre!("Failed to create Ollama client: {}", e))?;
        log::debug!(
            "reviewing with model {} at {}",
            options.model,
            options.ollama_url
        );

        Ok(Self {
            client,
            model: options.model.clone(),
        })
    }
}

impl Reviewer for OllamaReviewer {
    async fn review(&self, prompt: &str) -> Result<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(SYSTEM_PREAMBLE)
            .temperature(MODEL_TEMPERATURE)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| eyre!("Model request failed: {}", e))
    }
}

/// What the model said, ready for printing or JSON output.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AiReview {
    Validation {
        level: u32,
        result: ValidationResult,
    },
    AutoLevel(AutoLevelOutcome),
    Failed {
        error: String,
    },
}

impl AiReview {
    /// Whether an automatic search settled on a level.
    pub fn found_level(&self) -> bool {
        matches!(
            self,
            AiReview::AutoLevel(AutoLevelOutcome {
                optimal_level: Some(_),
                ..
            })
        )
    }
}

fn request_for(analysis: &Analysis, level: u32, context: &str) -> Result<ValidationRequest> {
    let summary = analysis.level(level).ok_or_else(|| Error::LevelNotFound {
        level,
        available: analysis.levels.iter().map(|s| s.level).collect(),
    })?;
    Ok(build_validation_request(
        &analysis.document,
        &analysis.profile,
        summary,
        &analysis.headings_at(level),
        context,
    ))
}

async fn ask_validation<R: Reviewer>(
    reviewer: &R,
    request: &ValidationRequest,
) -> Result<ValidationResult> {
    let reply = reviewer.review(&build_validation_prompt(request)).await?;
    log::debug!("validation reply for level {}: {}", request.level, reply);
    Ok(parse_validation(&reply)?)
}

async fn ask_strategy<R: Reviewer>(
    reviewer: &R,
    analysis: &Analysis,
    request: &ValidationRequest,
) -> Result<ExtractionStrategy> {
    let prompt = build_strategy_prompt(request, &analysis.levels);
    let reply = reviewer.review(&prompt).await?;
    log::debug!("strategy reply: {}", reply);
    Ok(parse_strategy(&reply)?)
}

/// Ask the model whether `level` holds real section headings.
pub async fn validate_level<R: Reviewer>(
    reviewer: &R,
    analysis: &Analysis,
    level: u32,
    context: &str,
) -> AiReview {
    let result = match request_for(analysis, level, context) {
        Ok(request) => ask_validation(reviewer, &request).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(result) => AiReview::Validation { level, result },
        Err(err) => AiReview::Failed {
            error: f!("Level {} validation failed: {}", level, err),
        },
    }
}

/// Try the most promising levels in turn and stop at the first one the
/// model accepts, then ask for an extraction strategy for it.
pub async fn auto_level<R: Reviewer>(
    reviewer: &R,
    analysis: &Analysis,
    context: &str,
) -> AutoLevelOutcome {
    let mut outcome = AutoLevelOutcome {
        optimal_level: None,
        levels_tested: Vec::new(),
        strategy: None,
    };

    for level in auto_level_order(&analysis.levels, MAX_AUTO_LEVELS) {
        let request = match request_for(analysis, level, context) {
            Ok(request) => request,
            Err(err) => {
                outcome.levels_tested.push(LevelAttempt {
                    level,
                    validation: None,
                    error: Some(err.to_string()),
                });
                continue;
            }
        };

        match ask_validation(reviewer, &request).await {
            Ok(validation) => {
                let valid = validation.status == ValidationStatus::Valid;
                outcome.levels_tested.push(LevelAttempt {
                    level,
                    validation: Some(validation),
                    error: None,
                });
                if valid {
                    outcome.optimal_level = Some(level);
                    match ask_strategy(reviewer, analysis, &request).await {
                        Ok(strategy) => outcome.strategy = Some(strategy),
                        Err(err) => log::warn!("strategy request failed: {}", err),
                    }
                    break;
                }
            }
            Err(err) => {
                log::warn!("level {} validation failed: {}", level, err);
                outcome.levels_tested.push(LevelAttempt {
                    level,
                    validation: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::analyze_samples;
    use extractorizer_core::headings::{PageSample, TextRun};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replies with canned answers in order and records the prompts.
    struct Scripted {
        replies: RefCell<VecDeque<Result<String>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl Reviewer for Scripted {
        async fn review(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(eyre!("no more replies")))
        }
    }

    fn verdict(status: &str) -> Result<String> {
        Ok(format!(
            r#"{{"status": "{}", "confidence": 0.8, "reason": "looks right", "extraction_feasible": true}}"#,
            status
        ))
    }

    const STRATEGY: &str = r#"```json
{
  "primary_strategy": {
    "approach": "font_based",
    "target_level": 2,
    "section_naming": "heading text",
    "grouping_strategy": "one file per heading",
    "confidence": 0.9
  },
  "expected_output": {
    "section_count": 3,
    "output_format": "pdf",
    "quality_estimate": "high"
  }
}
```"#;

    fn analysis() -> Analysis {
        let body = "ordinary sentence text repeated many times across the page body";
        let run = |text: &str, size: f32, bold: bool, y: f32| TextRun {
            text: text.to_string(),
            font_size: size,
            font_name: "Serif".to_string(),
            is_bold: bold,
            is_italic: false,
            y,
        };
        let samples: Vec<PageSample> = (1..=3)
            .map(|page| {
                let mut runs = vec![
                    run("Part", 24.0, true, 760.0),
                    run("Fire Spells", 16.0, true, 720.0),
                ];
                runs.extend((0..20).map(|i| run(body, 10.0, false, 680.0 - i as f32 * 12.0)));
                PageSample { page, runs }
            })
            .collect();
        analyze_samples("spells.pdf".into(), &samples, 3, None, 3.0).unwrap()
    }

    #[tokio::test]
    async fn test_validate_level() {
        let reviewer = Scripted::new(vec![verdict("VALID")]);
        let review = validate_level(&reviewer, &analysis(), 2, "spell book").await;

        match review {
            AiReview::Validation { level, result } => {
                assert_eq!(level, 2);
                assert_eq!(result.status, ValidationStatus::Valid);
            }
            other => panic!("unexpected review: {:?}", other),
        }
        let prompts = reviewer.prompts.borrow();
        assert!(prompts[0].contains("Fire Spells"));
        assert!(prompts[0].contains("spell book"));
    }

    #[tokio::test]
    async fn test_validate_level_reports_failures() {
        let reviewer = Scripted::new(vec![Ok("I cannot help with that".to_string())]);
        let review = validate_level(&reviewer, &analysis(), 1, "").await;
        assert!(matches!(review, AiReview::Failed { .. }));

        let missing = validate_level(&Scripted::new(vec![]), &analysis(), 9, "").await;
        match missing {
            AiReview::Failed { error } => assert!(error.contains("Level 9")),
            other => panic!("unexpected review: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auto_level_stops_at_first_valid() {
        let analysis = analysis();
        let order = auto_level_order(&analysis.levels, MAX_AUTO_LEVELS);
        assert_eq!(order.len(), 2);

        let reviewer = Scripted::new(vec![
            verdict("INVALID"),
            verdict("VALID"),
            Ok(STRATEGY.to_string()),
        ]);
        let outcome = auto_level(&reviewer, &analysis, "").await;

        assert_eq!(outcome.optimal_level, Some(order[1]));
        assert_eq!(outcome.levels_tested.len(), 2);
        assert_eq!(
            outcome.levels_tested[0].validation.as_ref().map(|v| v.status),
            Some(ValidationStatus::Invalid)
        );
        let strategy = outcome.strategy.unwrap();
        assert_eq!(strategy.primary_strategy.target_level, 2);
        assert_eq!(reviewer.prompts.borrow().len(), 3);
        assert!(AiReview::AutoLevel(AutoLevelOutcome {
            optimal_level: Some(1),
            levels_tested: vec![],
            strategy: None,
        })
        .found_level());
    }

    #[tokio::test]
    async fn test_auto_level_records_errors_and_gives_up() {
        let reviewer = Scripted::new(vec![Err(eyre!("connection refused")), verdict("INVALID")]);
        let outcome = auto_level(&reviewer, &analysis(), "").await;

        assert_eq!(outcome.optimal_level, None);
        assert!(outcome.strategy.is_none());
        assert_eq!(outcome.levels_tested.len(), 2);
        assert!(outcome.levels_tested[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("connection refused")));
        assert!(!AiReview::AutoLevel(outcome).found_level());
    }
}
